use log::*;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::GenericError;

use super::{Coordinates, DistributionCenter, GeoPoint};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Slack allowed above a whole kilometre before the next one is billed.
pub const DEFAULT_KM_TOLERANCE: f64 = 1e-9;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Invalid delivery location: {0}")]
    InvalidInput(String),
    #[error("No distribution center is available to quote this delivery.")]
    NoCentersAvailable,
    #[error("No distribution center has a usable location.")]
    NoReachableCenter,
    #[error("Failed to fetch distribution centers: {0}")]
    UpstreamFailure(#[source] GenericError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeQuote {
    pub delivery_fee: Decimal,
    pub has_free_delivery: bool,
    pub distance: f64,
    pub center: DistributionCenter,
}

/// Great-circle distance in kilometres between two points.
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    EARTH_RADIUS_KM * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryFeeEstimator {
    km_tolerance: f64,
}

impl Default for DeliveryFeeEstimator {
    fn default() -> Self {
        DeliveryFeeEstimator {
            km_tolerance: DEFAULT_KM_TOLERANCE,
        }
    }
}

impl DeliveryFeeEstimator {
    pub fn with_tolerance(km_tolerance: f64) -> Self {
        DeliveryFeeEstimator {
            km_tolerance: km_tolerance.abs(),
        }
    }

    /// Whole kilometres billed for a distance: partial kilometres round up,
    /// except when the overshoot is within the tolerance.
    pub fn billable_km(&self, distance: f64) -> u64 {
        let floor = distance.floor();
        if distance - floor <= self.km_tolerance {
            floor as u64
        } else {
            distance.ceil() as u64
        }
    }

    /// Saturates at `Decimal::MAX` rather than overflowing on extreme stored fees.
    pub fn fee_for(&self, center: &DistributionCenter, distance: f64) -> Decimal {
        let base = center.base_delivery_fee.max(Decimal::ZERO);
        let per_km = center.per_km_fee.max(Decimal::ZERO);
        let distance_fee = Decimal::from(self.billable_km(distance)).saturating_mul(per_km);
        base.saturating_add(distance_fee)
    }

    /// Quote delivery from the nearest center with a usable location.
    ///
    /// Centers are scanned in the order given and only a strictly smaller
    /// distance replaces the current pick, so equidistant centers resolve to
    /// the earliest one.
    pub fn estimate(
        &self,
        customer: &Coordinates,
        order_total: Option<Decimal>,
        centers: &[DistributionCenter],
    ) -> Result<FeeQuote, DeliveryError> {
        let origin = validate_customer(customer)?;

        if centers.is_empty() {
            return Err(DeliveryError::NoCentersAvailable);
        }

        let mut nearest: Option<(&DistributionCenter, f64)> = None;
        for center in centers {
            let Some(position) = center.position() else {
                debug!("Skipping center {} without a usable location.", center.id);
                continue;
            };
            let distance = haversine_km(origin, position);
            match nearest {
                Some((_, best)) if distance >= best => {}
                _ => nearest = Some((center, distance)),
            }
        }
        let (center, distance) = nearest.ok_or(DeliveryError::NoReachableCenter)?;

        let has_free_delivery =
            order_total.map_or(false, |total| total >= center.free_delivery_threshold());
        let delivery_fee = if has_free_delivery {
            Decimal::ZERO
        } else {
            self.fee_for(center, distance)
        };
        trace!(
            "Quoted center {} at {:.3} km: fee {}, free delivery {}.",
            center.id,
            distance,
            delivery_fee,
            has_free_delivery
        );

        Ok(FeeQuote {
            delivery_fee,
            has_free_delivery,
            distance,
            center: center.clone(),
        })
    }
}

pub fn validate_customer(customer: &Coordinates) -> Result<GeoPoint, DeliveryError> {
    let lat = customer
        .lat
        .ok_or_else(|| DeliveryError::InvalidInput("latitude is missing".into()))?;
    let lng = customer
        .lng
        .ok_or_else(|| DeliveryError::InvalidInput("longitude is missing".into()))?;
    customer.resolve().ok_or_else(|| {
        DeliveryError::InvalidInput(format!("({}, {}) is not a valid coordinate", lat, lng))
    })
}
