pub mod artifacts;
pub mod trades;
