pub mod config;
pub mod container;
pub mod error;
pub mod pack;
pub mod resample;

pub use error::{Error, Result};
