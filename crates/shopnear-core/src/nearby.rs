use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::format::{format_address, format_distance};
use crate::geo::{Position, Radius};

/// Which entity collection a nearby search targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Shops,
    Products,
}

impl ResultKind {
    pub const ALL: [ResultKind; 2] = [ResultKind::Shops, ResultKind::Products];

    /// Path segment used by the Nearby Search API (`/shops/nearby`).
    #[must_use]
    pub fn path_segment(self) -> &'static str {
        match self {
            ResultKind::Shops => "shops",
            ResultKind::Products => "products",
        }
    }
}

impl std::fmt::Display for ResultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for ResultKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shops" | "shop" => Ok(ResultKind::Shops),
            "products" | "product" => Ok(ResultKind::Products),
            other => Err(CoreError::UnknownResultKind(other.to_string())),
        }
    }
}

/// Structured postal address attached to a shop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
}

/// A single nearby-search query. Built fresh on every position, radius or
/// kind change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityQuery {
    pub position: Position,
    pub radius: Radius,
    pub kind: ResultKind,
}

/// One entity returned by the Nearby Search API.
///
/// `position` is `None` when upstream data was missing or failed coordinate
/// validation; such entries stay in list views but never reach the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyResult {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub distance_meters: Option<f64>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl NearbyResult {
    #[must_use]
    pub fn distance_label(&self) -> String {
        format_distance(self.distance_meters)
    }

    #[must_use]
    pub fn address_label(&self) -> String {
        format_address(self.address.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_kind_parses_and_displays() {
        assert_eq!("shops".parse::<ResultKind>().unwrap(), ResultKind::Shops);
        assert_eq!(
            " Products ".parse::<ResultKind>().unwrap(),
            ResultKind::Products
        );
        assert!("stores".parse::<ResultKind>().is_err());
        assert_eq!(ResultKind::Products.to_string(), "products");
    }

    #[test]
    fn labels_fall_back_when_data_is_missing() {
        let result = NearbyResult {
            id: "7".to_string(),
            name: "Corner Store".to_string(),
            position: None,
            distance_meters: None,
            address: None,
            attributes: serde_json::Map::new(),
        };
        assert_eq!(result.distance_label(), "Unknown distance");
        assert_eq!(result.address_label(), "Address not available");
    }
}
