use axum::Router;

use crate::service::SensorService;

mod health;
mod sensors;

// ---

pub fn router(service: SensorService) -> Router {
    // ---
    Router::new()
        .merge(sensors::router())
        .merge(health::router())
        .with_state(service)
}
