pub mod config;
pub mod error;
pub mod routes;
pub mod services;

pub use error::{GenericError, NalaBoxError};
