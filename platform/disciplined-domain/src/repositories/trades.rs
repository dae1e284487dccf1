use crate::value_objects::trade::Trade;

/// Input boundary. Implementations validate records before returning them.
pub trait TradeSource {
    fn describe(&self) -> String;
    fn load_trades(&self) -> Result<Vec<Trade>, String>;
}
