pub mod cache;
pub mod clock;
pub mod error;
pub mod geolocation;
pub mod provider;
pub mod storage;

pub use cache::{CachedLocation, LocationCache, DEFAULT_LOCATION_TTL, LOCATION_STORAGE_KEY};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{LocationError, StorageError};
pub use geolocation::{FixedSource, GeolocationSource, PositionOptions, UnsupportedSource};
pub use provider::{LocationProvider, LocationStatus};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
