pub mod audit;
pub mod color;
pub mod daily;
pub mod pricing;
pub mod validation;
