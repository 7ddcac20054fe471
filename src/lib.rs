//! Library crate for the `sensorhub` environmental sensor service.
//!
//! The binary (`main.rs`) wires these modules together; they are exposed as a
//! library so integration tests can drive the router and service in-process.
//! Module boundaries follow the Explicit Module Boundary Pattern (EMBP):
//! `routes` is the only HTTP surface, `service` the only storage surface, and
//! `relay` the only messaging surface.

pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod relay;
pub mod routes;
pub mod schema;
pub mod seed;
pub mod service;

pub use config::Config;
pub use error::Error;
pub use models::{ReadingBody, SensorRecord, SensorType};
pub use service::SensorService;
