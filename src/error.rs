use thiserror::Error;

pub type GenericError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum NalaBoxError {
    #[error("No geocoding result for the given address.")]
    LocationNotFound(),
    #[error("Environment variable {0} is not set.")]
    MissingConfig(&'static str),
}
