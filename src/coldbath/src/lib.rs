#[macro_use]
extern crate log;

mod config;
pub use config::{GarminConfig, OuraConfig};

mod error;
pub use error::{LoadError, SourceError};

pub mod baths_csv;
pub mod report;
pub mod sources;
