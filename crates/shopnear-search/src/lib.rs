pub mod client;
pub mod coordinator;
pub mod error;
pub mod normalize;
pub mod subscription;

pub use client::NearbyClient;
pub use coordinator::{
    KindSnapshot, NearbySearch, ProximityQueryCoordinator, QueryStatus, SearchOutcome,
};
pub use error::{CoordinatorError, SearchError};
pub use normalize::{normalize_item, normalize_results};
pub use subscription::{spawn_subscription, SubscriptionConfig};
