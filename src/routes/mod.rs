use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::*;
use serde_json::{json, Value};
use thiserror::Error;
use tower_http::cors::CorsLayer;

use crate::{
    services::{
        database::{Record, StoreService},
        delivery::{DeliveryError, DeliveryFeeEstimator},
        geocoding::GeocodingService,
        DistributionCenter,
    },
    GenericError,
};

pub mod delivery;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StoreService>,
    pub geocoder: Option<Arc<dyn GeocodingService>>,
    pub estimator: DeliveryFeeEstimator,
}

impl AppState {
    pub fn new(store: Arc<dyn StoreService>) -> Self {
        AppState {
            store,
            geocoder: None,
            estimator: DeliveryFeeEstimator::default(),
        }
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn GeocodingService>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    #[error("Server error")]
    Upstream(#[source] GenericError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Delivery(err) => match err {
                DeliveryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                DeliveryError::NoCentersAvailable => StatusCode::NOT_FOUND,
                DeliveryError::NoReachableCenter | DeliveryError::UpstreamFailure(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Upstream(source) | ApiError::Delivery(DeliveryError::UpstreamFailure(source)) => {
                error!("Upstream failure: {}", source);
                json!({ "message": self.to_string(), "details": source.to_string() })
            }
            ApiError::Delivery(DeliveryError::NoReachableCenter) => {
                error!("Distribution centers are stored without usable coordinates.");
                json!({ "message": self.to_string() })
            }
            _ => json!({ "message": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/products", get(list_products))
        .route("/api/products/:id", get(get_product))
        .route("/api/distribution-centers", get(list_distribution_centers))
        .route("/api/delivery/fee", post(delivery::quote_delivery_fee))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the NalaBox API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Record>>, ApiError> {
    let products = state.store.list_products().await.map_err(ApiError::Upstream)?;
    Ok(Json(products))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Record>, ApiError> {
    state
        .store
        .get_product(&id)
        .await
        .map_err(ApiError::Upstream)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))
}

async fn list_distribution_centers(
    State(state): State<AppState>,
) -> Result<Json<Vec<DistributionCenter>>, ApiError> {
    let centers = state
        .store
        .list_distribution_centers()
        .await
        .map_err(ApiError::Upstream)?;
    Ok(Json(centers))
}
