use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod database;
pub mod delivery;
pub mod geocoding;

/// A latitude/longitude pair as it arrives over the wire. Either half may be
/// missing; use [`Coordinates::resolve`] before doing any geometry with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

/// A coordinate known to be finite and within the valid degree ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Coordinates {
            lat: Some(lat),
            lng: Some(lng),
        }
    }

    pub fn resolve(&self) -> Option<GeoPoint> {
        let lat = self.lat.filter(|v| v.is_finite() && (-90.0..=90.0).contains(v))?;
        let lng = self.lng.filter(|v| v.is_finite() && (-180.0..=180.0).contains(v))?;
        Some(GeoPoint { lat, lng })
    }
}

/// Identifier of a stored row. Supabase tables here use either serial
/// integers or uuid/text keys, so both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    #[display(fmt = "{}", _0)]
    Int(i64),
    #[display(fmt = "{}", _0)]
    Text(String),
}

/// A row of the `distribution_centers` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionCenter {
    pub id: RecordId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<Coordinates>,
    pub base_delivery_fee: Decimal,
    pub per_km_fee: Decimal,
    #[serde(default)]
    pub free_delivery_threshold: Option<Decimal>,
}

impl DistributionCenter {
    pub fn position(&self) -> Option<GeoPoint> {
        self.location.as_ref().and_then(Coordinates::resolve)
    }

    pub fn free_delivery_threshold(&self) -> Decimal {
        self.free_delivery_threshold.unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolve_requires_both_components() {
        let partial = Coordinates {
            lat: Some(12.0),
            lng: None,
        };
        assert_eq!(partial.resolve(), None);
        assert_eq!(
            Coordinates::new(12.5, -1.5).resolve(),
            Some(GeoPoint { lat: 12.5, lng: -1.5 })
        );
    }

    #[test]
    fn resolve_rejects_out_of_range_and_non_finite() {
        assert_eq!(Coordinates::new(91.0, 0.0).resolve(), None);
        assert_eq!(Coordinates::new(0.0, -180.5).resolve(), None);
        assert_eq!(Coordinates::new(f64::NAN, 0.0).resolve(), None);
        assert_eq!(Coordinates::new(0.0, f64::INFINITY).resolve(), None);
    }

    #[test]
    fn center_row_deserializes_with_nulls() {
        let row = json!({
            "id": 7,
            "name": "Ouaga Nord",
            "location": null,
            "base_delivery_fee": 1000,
            "per_km_fee": "200",
            "free_delivery_threshold": null
        });
        let center: DistributionCenter = serde_json::from_value(row).unwrap();
        assert_eq!(center.id, RecordId::Int(7));
        assert_eq!(center.position(), None);
        assert_eq!(center.per_km_fee, Decimal::from(200));
        assert_eq!(center.free_delivery_threshold(), Decimal::ZERO);
    }

    #[test]
    fn record_id_accepts_text_keys() {
        let id: RecordId = serde_json::from_value(json!("c-01")).unwrap();
        assert_eq!(id.to_string(), "c-01");
        assert_eq!(RecordId::Int(3).to_string(), "3");
    }
}
