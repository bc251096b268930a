pub mod app_config;
pub mod config;
pub mod error;
pub mod format;
pub mod geo;
pub mod nearby;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, CoreError};
pub use format::{
    format_address, format_date, format_distance, format_price, format_radius_km,
    ADDRESS_NOT_AVAILABLE, NOT_AVAILABLE, UNKNOWN_DISTANCE,
};
pub use geo::{Coordinates, MapMarker, Position, Radius};
pub use nearby::{Address, NearbyResult, ProximityQuery, ResultKind};
