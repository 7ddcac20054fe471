//! CRUD and query endpoints for the sensor tables.
//!
//! The sensor type is a path segment restricted to the fixed set; it is
//! validated on every endpoint before any storage call. All endpoints answer
//! 404 for an unknown type except `/count`, which answers 400 — an oddity
//! inherited from the original API contract that clients depend on.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, ErrorBody};
use crate::models::{ReadingBody, SensorRecord, SensorType};
use crate::query::{parse_end_bound, parse_start_bound, ListQuery, OrderBy};
use crate::service::SensorService;

// ---

pub fn router() -> Router<SensorService> {
    // ---
    Router::new()
        .route("/api/{sensor_type}", get(list).post(insert))
        // Static segment, takes precedence over the `{id}` capture below.
        .route("/api/{sensor_type}/count", get(count))
        .route(
            "/api/{sensor_type}/{id}",
            get(get_one).put(update).delete(delete_one),
        )
}

/// Query parameters for the list endpoint.
#[derive(Debug, Deserialize)]
struct ListParams {
    // ---
    #[serde(rename = "order-by")]
    order_by: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

#[derive(Serialize)]
struct InsertResponse {
    id: i64,
}

#[derive(Serialize)]
struct CountResponse {
    count: i64,
}

/// Success marker returned by update and delete.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    message: &'static str,
}

fn parse_type(segment: &str) -> Result<SensorType, Error> {
    SensorType::parse(segment).ok_or(Error::InvalidSensorType)
}

// ---

async fn list(
    Path(sensor_type): Path<String>,
    Query(params): Query<ListParams>,
    State(service): State<SensorService>,
) -> Result<Json<Vec<SensorRecord>>, Error> {
    // ---
    let sensor_type = parse_type(&sensor_type)?;
    info!("GET /api/{} {:?}", sensor_type.table(), params);

    // Unparseable bounds get the same treatment as unknown order-by values:
    // ignored, not rejected.
    let query = ListQuery {
        sensor_type,
        start: params.start_date.as_deref().and_then(parse_start_bound),
        end: params.end_date.as_deref().and_then(parse_end_bound),
        order_by: params.order_by.as_deref().and_then(OrderBy::parse),
    };
    Ok(Json(service.list(&query).await?))
}

async fn insert(
    Path(sensor_type): Path<String>,
    State(service): State<SensorService>,
    Json(body): Json<ReadingBody>,
) -> Result<Json<InsertResponse>, Error> {
    // ---
    let sensor_type = parse_type(&sensor_type)?;
    let id = service.insert(sensor_type, &body).await?;
    info!("POST /api/{} -> id {}", sensor_type.table(), id);
    Ok(Json(InsertResponse { id }))
}

async fn get_one(
    Path((sensor_type, id)): Path<(String, i64)>,
    State(service): State<SensorService>,
) -> Result<Json<SensorRecord>, Error> {
    // ---
    let sensor_type = parse_type(&sensor_type)?;
    Ok(Json(service.get(sensor_type, id).await?))
}

async fn update(
    Path((sensor_type, id)): Path<(String, i64)>,
    State(service): State<SensorService>,
    Json(body): Json<ReadingBody>,
) -> Result<Json<StatusResponse>, Error> {
    // ---
    let sensor_type = parse_type(&sensor_type)?;
    service.update(sensor_type, id, &body).await?;
    info!("PUT /api/{}/{}", sensor_type.table(), id);
    Ok(Json(StatusResponse {
        status: "success",
        message: "Record updated successfully",
    }))
}

async fn delete_one(
    Path((sensor_type, id)): Path<(String, i64)>,
    State(service): State<SensorService>,
) -> Result<Json<StatusResponse>, Error> {
    // ---
    let sensor_type = parse_type(&sensor_type)?;
    service.delete(sensor_type, id).await?;
    info!("DELETE /api/{}/{}", sensor_type.table(), id);
    Ok(Json(StatusResponse {
        status: "success",
        message: "Record deleted successfully",
    }))
}

/// Unlike every other endpoint, an unknown sensor type here answers 400.
async fn count(
    Path(sensor_type): Path<String>,
    State(service): State<SensorService>,
) -> Response {
    // ---
    let Some(sensor_type) = SensorType::parse(&sensor_type) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Invalid sensor type")),
        )
            .into_response();
    };
    match service.count(sensor_type).await {
        Ok(count) => Json(CountResponse { count }).into_response(),
        Err(e) => e.into_response(),
    }
}
