pub mod config;
pub mod dashboard;
pub mod loading;
pub mod meta;
pub mod reporting;
