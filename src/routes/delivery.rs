use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use log::*;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    services::{
        delivery::{validate_customer, DeliveryError, FeeQuote},
        Coordinates,
    },
    NalaBoxError,
};

use super::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[serde(default)]
    pub location: Option<Coordinates>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub total_amount: Option<Decimal>,
}

/// `POST /api/delivery/fee` with `{ location: { lat, lng }, totalAmount? }`.
///
/// `address` is an extension of that contract: it is geocoded only when
/// `location` is absent and a geocoder is configured.
pub async fn quote_delivery_fee(
    State(state): State<AppState>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<Json<FeeQuote>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::InvalidInput(rejection.body_text()))?;
    trace!("Received delivery fee request: {:?}", request);

    let location = resolve_location(&state, &request).await?;
    validate_customer(&location)?;

    let centers = state
        .store
        .list_distribution_centers()
        .await
        .map_err(DeliveryError::UpstreamFailure)?;
    let quote = state
        .estimator
        .estimate(&location, request.total_amount, &centers)?;

    info!(
        "Delivery quoted from center {}: {} over {:.2} km.",
        quote.center.id, quote.delivery_fee, quote.distance
    );
    Ok(Json(quote))
}

/// Explicit coordinates win; a free-text address is geocoded only when no
/// location was sent and a geocoder is configured.
async fn resolve_location(state: &AppState, request: &QuoteRequest) -> Result<Coordinates, ApiError> {
    if let Some(location) = request.location {
        return Ok(location);
    }

    let address = request
        .address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| DeliveryError::InvalidInput("location is missing".into()))?;
    let geocoder = state.geocoder.as_ref().ok_or_else(|| {
        DeliveryError::InvalidInput("location is missing and address lookup is disabled".into())
    })?;

    match geocoder.geocode(address).await {
        Ok(coordinates) => Ok(coordinates),
        Err(err) => match err.downcast_ref::<NalaBoxError>() {
            Some(NalaBoxError::LocationNotFound()) => Err(DeliveryError::InvalidInput(format!(
                "address {:?} could not be located",
                address
            ))
            .into()),
            _ => Err(ApiError::Upstream(err)),
        },
    }
}
