pub mod error;
pub mod model;
pub mod service;

pub use error::DeliveryServiceError;
pub use model::{DeliveryRequest, DeliveryResponse, FeedItem, FeedResponse, ResolvedDelivery};
pub use service::{DeliveryService, DeliveryServiceApi};
