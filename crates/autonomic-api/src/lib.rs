//! Async client for the Autonomic MAS multi-room audio controller.
//!
//! The controller exposes a small REST surface with no push channel:
//!
//! - **Zone listing**: `GET {base}/api/mrad.browsezones`, with `GET {base}/api/`
//!   as a second endpoint serving the same list. Either endpoint may answer
//!   with one of two JSON envelope shapes (see [`models`]).
//! - **Power commands**: `POST {base}/Script/mrad.SetZone {zone}/mrad.power {On|Off}/setinstance main/`.
//!
//! [`ZoneClient`] is stateless: no caching, no retries. Staleness and retry
//! policy belong to the consumer (`autonomic-core`).

pub mod client;
pub mod error;
pub mod models;
pub mod transport;
mod zones;

pub use client::ZoneClient;
pub use error::Error;
pub use models::{PowerCommand, SourceMetaData, ZoneRecord};
pub use transport::TransportConfig;
