pub mod csv_file;
pub mod mock;

pub use csv_file::CsvTradeSource;
pub use mock::{MockTradeParams, MockTradeSource};
