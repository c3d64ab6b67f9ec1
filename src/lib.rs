pub mod cli;
pub mod codec;
pub mod config;
pub mod db;
pub mod error;
pub mod extractor;
pub mod knn;
pub mod matcher;
pub mod matrix;
mod metrics;
pub mod server;
pub mod sift;
pub mod utils;
pub mod vitals;

pub use config::Opts;
pub use error::VitalsError;
pub use vitals::{VitalsDB, VitalsDBBuilder};
