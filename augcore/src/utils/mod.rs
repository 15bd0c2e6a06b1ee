pub mod conf;
pub mod error;
