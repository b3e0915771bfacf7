//! # chatrelay config
//!
//! Configuration management for chatrelay: the TOML schema, a loader with
//! `${VAR}` substitution and a validator that separates hard errors from
//! warnings.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
