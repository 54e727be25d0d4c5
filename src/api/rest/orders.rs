use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::rest::{id_refs, BatchRequest, IdRef};
use crate::engine::{assignment, registry};
use crate::error::AppError;
use crate::models::courier::CourierId;
use crate::models::order::{Order, OrderId};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_orders))
        .route("/orders/assign", post(assign_orders))
        .route("/orders/complete", post(complete_order))
        .route("/orders/:id", get(get_order))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssignRequest {
    pub courier_id: CourierId,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompleteRequest {
    pub courier_id: CourierId,
    pub order_id: OrderId,
    pub complete_time: String,
}

#[derive(Serialize)]
pub struct CreatedOrders {
    pub orders: Vec<IdRef>,
}

#[derive(Serialize)]
pub struct AssignResponse {
    pub orders: Vec<IdRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assign_time: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct CompleteResponse {
    pub order_id: OrderId,
}

async fn create_orders(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedOrders>), AppError> {
    let Json(payload) = payload?;

    let _guard = state.write_lock.lock().await;
    let ids = registry::add_orders(&state, &payload.data)?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedOrders {
            orders: id_refs(ids),
        }),
    ))
}

async fn assign_orders(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AssignRequest>, JsonRejection>,
) -> Result<Json<AssignResponse>, AppError> {
    let Json(payload) = payload?;

    let _guard = state.write_lock.lock().await;
    let outcome = assignment::orders_for_courier(&state, payload.courier_id, Utc::now())?;

    Ok(Json(AssignResponse {
        orders: id_refs(outcome.order_ids),
        assign_time: outcome.assign_time,
    }))
}

async fn complete_order(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CompleteRequest>, JsonRejection>,
) -> Result<Json<CompleteResponse>, AppError> {
    let Json(payload) = payload?;

    let _guard = state.write_lock.lock().await;
    let order_id = assignment::complete_order(
        &state,
        payload.order_id,
        payload.courier_id,
        &payload.complete_time,
    )?;

    Ok(Json(CompleteResponse { order_id }))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    path: Result<Path<OrderId>, PathRejection>,
) -> Result<Json<Order>, AppError> {
    let Path(id) = path?;

    let _guard = state.write_lock.lock().await;
    Ok(Json(registry::get_order(&state, id)?))
}
