//! Tolerant conversion of Nearby Search API items into [`NearbyResult`].
//!
//! The backend has shipped several field spellings over time (`shop_id` vs
//! `id`, coordinates at the top level or inside `address`). Every item that
//! is a JSON object yields a result; a bad or missing coordinate only clears
//! `position`, it never drops the entity.

use serde_json::{Map, Value};
use shopnear_core::{Address, Coordinates, NearbyResult, Position, ResultKind};

const ID_KEYS: [&str; 3] = ["id", "shop_id", "product_id"];
const NAME_KEYS: [&str; 3] = ["name", "shop_name", "product_name"];
const DISTANCE_KEYS: [&str; 2] = ["distanceMeters", "distance_meters"];
/// Older shop endpoints report the distance in kilometers.
const DISTANCE_KM_KEY: &str = "distance";

const UNNAMED: &str = "Unnamed";

/// Normalizes a decoded response array, skipping non-object entries.
#[must_use]
pub fn normalize_results(kind: ResultKind, items: Vec<Value>) -> Vec<NearbyResult> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| normalize_item(kind, index, item))
        .collect()
}

/// Normalizes one response item. Returns `None` only when `item` is not a
/// JSON object.
#[must_use]
pub fn normalize_item(kind: ResultKind, index: usize, item: Value) -> Option<NearbyResult> {
    let Value::Object(mut obj) = item else {
        tracing::warn!(%kind, index, "skipping non-object nearby item");
        return None;
    };

    let id = take_first(&mut obj, &ID_KEYS)
        .and_then(|v| scalar_to_string(&v))
        .unwrap_or_else(|| format!("{kind}-{index}"));

    let name = take_first(&mut obj, &NAME_KEYS)
        .and_then(|v| v.as_str().map(str::to_string))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| UNNAMED.to_string());

    let meters = take_first(&mut obj, &DISTANCE_KEYS);
    let km = take_first(&mut obj, &[DISTANCE_KM_KEY]);
    let distance_meters = match meters {
        Some(meters) => number(&meters),
        None => km.as_ref().and_then(number).map(|value| value * 1000.0),
    };

    let address_value = obj.remove("address");
    let coordinates = extract_coordinates(&mut obj, address_value.as_ref());
    let position = coordinates.and_then(|coords| validate_position(&id, coords));
    let address = address_value.as_ref().and_then(parse_address);

    Some(NearbyResult {
        id,
        name,
        position,
        distance_meters,
        address,
        attributes: obj,
    })
}

/// Removes every alias in `keys` and returns the first non-null value.
fn take_first(obj: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    let mut found = None;
    for key in keys {
        if let Some(value) = obj.remove(*key) {
            if found.is_none() && !value.is_null() {
                found = Some(value);
            }
        }
    }
    found
}

/// Coordinates come from `position`, then top-level `latitude`/`longitude`,
/// then `address.latitude`/`address.longitude`. `None` means the item had
/// no coordinate fields at all.
fn extract_coordinates(obj: &mut Map<String, Value>, address: Option<&Value>) -> Option<Coordinates> {
    if let Some(position) = obj.remove("position") {
        if !position.is_null() {
            return Some(coordinates_in(&position));
        }
        return None;
    }

    let top_lat = obj.remove("latitude");
    let top_lng = obj.remove("longitude");
    if top_lat.is_some() || top_lng.is_some() {
        return Some(Coordinates::new(
            top_lat.as_ref().and_then(number),
            top_lng.as_ref().and_then(number),
        ));
    }

    address
        .filter(|a| a.get("latitude").is_some() || a.get("longitude").is_some())
        .map(coordinates_in)
}

fn coordinates_in(value: &Value) -> Coordinates {
    Coordinates::new(
        value.get("latitude").and_then(number),
        value.get("longitude").and_then(number),
    )
}

fn validate_position(id: &str, coordinates: Coordinates) -> Option<Position> {
    match coordinates.validate() {
        Ok(position) => Some(position),
        Err(e) => {
            tracing::warn!(id, error = %e, "excluding invalid coordinate from nearby item");
            None
        }
    }
}

fn parse_address(value: &Value) -> Option<Address> {
    let obj = value.as_object()?;
    let field = |key: &str| {
        obj.get(key)
            .and_then(scalar_to_string)
            .filter(|s| !s.trim().is_empty())
    };
    Some(Address {
        area: field("area"),
        city: field("city"),
        pincode: field("pincode"),
    })
}

/// Numbers and numeric strings (some backends serialize decimals as text).
fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_canonical_shape() {
        let item = json!({
            "id": "s-1",
            "name": "Green Grocer",
            "position": {"latitude": 19.08, "longitude": 72.88},
            "distanceMeters": 850.5,
            "rating": 4.5
        });
        let result = normalize_item(ResultKind::Shops, 0, item).unwrap();
        assert_eq!(result.id, "s-1");
        assert_eq!(result.name, "Green Grocer");
        assert_eq!(result.position, Some(Position::new(19.08, 72.88).unwrap()));
        assert_eq!(result.distance_meters, Some(850.5));
        assert_eq!(result.attributes.get("rating"), Some(&json!(4.5)));
        assert!(!result.attributes.contains_key("distanceMeters"));
    }

    #[test]
    fn reads_legacy_shop_shape_with_address_coordinates() {
        let item = json!({
            "shop_id": 12,
            "shop_name": "Bandra Bakes",
            "is_open": true,
            "distance": 2.35,
            "address": {
                "area": "Bandra",
                "city": "Mumbai",
                "pincode": 400_050,
                "latitude": 19.0596,
                "longitude": 72.8295
            }
        });
        let result = normalize_item(ResultKind::Shops, 0, item).unwrap();
        assert_eq!(result.id, "12");
        assert_eq!(result.name, "Bandra Bakes");
        assert_eq!(
            result.position,
            Some(Position::new(19.0596, 72.8295).unwrap())
        );
        assert_eq!(result.address_label(), "Bandra, Mumbai, 400050");
        assert!((result.distance_meters.unwrap() - 2350.0).abs() < 1e-9);
        assert_eq!(result.distance_label(), "2.4 km");
        assert!(!result.attributes.contains_key("distance"));
        assert_eq!(result.attributes.get("is_open"), Some(&json!(true)));
    }

    #[test]
    fn meters_win_over_kilometer_distance() {
        let item = json!({"id": 1, "name": "Both", "distance_meters": 400, "distance": "7.5"});
        let result = normalize_item(ResultKind::Shops, 0, item).unwrap();
        assert_eq!(result.distance_meters, Some(400.0));
        assert!(!result.attributes.contains_key("distance"));

        let item = json!({"id": 2, "name": "Text Km", "distance": "0.25"});
        let result = normalize_item(ResultKind::Shops, 0, item).unwrap();
        assert_eq!(result.distance_label(), "250 m");
    }

    #[test]
    fn null_or_invalid_position_keeps_the_entity() {
        let items = vec![
            json!({"id": 1, "name": "No Fix", "position": null}),
            json!({"id": 2, "name": "Bad Fix", "latitude": 123.0, "longitude": 10.0}),
            json!({"id": 3, "name": "Half Fix", "latitude": "19.1"}),
        ];
        let results = normalize_results(ResultKind::Products, items);
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.position.is_none()));
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let item = json!({"id": 9, "name": "Text Coords", "latitude": "18.52", "longitude": "73.85"});
        let result = normalize_item(ResultKind::Shops, 0, item).unwrap();
        assert_eq!(result.position, Some(Position::new(18.52, 73.85).unwrap()));
    }

    #[test]
    fn missing_id_and_name_get_fallbacks() {
        let result = normalize_item(ResultKind::Products, 4, json!({})).unwrap();
        assert_eq!(result.id, "products-4");
        assert_eq!(result.name, "Unnamed");
    }

    #[test]
    fn non_objects_are_skipped() {
        let results = normalize_results(
            ResultKind::Shops,
            vec![json!(1), json!("x"), json!({"id": 1, "name": "Real"})],
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Real");
    }
}
