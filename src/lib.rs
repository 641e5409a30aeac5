pub mod configuration;
pub mod domain;
pub mod error;
pub mod services;

pub use error::{Error, Result};
