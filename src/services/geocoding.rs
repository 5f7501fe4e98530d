use super::Coordinates;

use crate::{config::Config, GenericError, NalaBoxError};

use async_trait::async_trait;
use google_maps::GoogleMapsClient;
use log::*;
use rust_decimal::prelude::ToPrimitive;

#[async_trait]
pub trait GeocodingService: Send + Sync {
    fn new(config: &Config) -> Result<Self, GenericError>
    where
        Self: Sized;
    async fn geocode(&self, address: &str) -> Result<Coordinates, GenericError>;
}

pub struct GoogleMapsService {
    client: GoogleMapsClient,
}

#[async_trait]
impl GeocodingService for GoogleMapsService {
    fn new(config: &Config) -> Result<Self, GenericError> {
        let token = config
            .google_maps_token
            .as_deref()
            .ok_or(NalaBoxError::MissingConfig("GOOGLE_MAPS_TOKEN"))?;
        Ok(GoogleMapsService {
            client: GoogleMapsClient::new(token),
        })
    }

    async fn geocode(&self, address: &str) -> Result<Coordinates, GenericError> {
        let response = self
            .client
            .geocoding()
            .with_address(address)
            .execute()
            .await?;
        let coordinates = &response
            .results
            .first()
            .ok_or(NalaBoxError::LocationNotFound())?
            .geometry
            .location;
        trace!("Received coordinates from Google Maps geocoding API.");
        Ok(Coordinates {
            lat: coordinates.lat.to_f64(),
            lng: coordinates.lng.to_f64(),
        })
    }
}
