pub mod analyzers;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetchers;
pub mod logging;
pub mod models;
pub mod processors;
pub mod readers;
pub mod utils;
pub mod writers;

pub use config::AppConfig;
pub use error::{ProcessingError, Result};
