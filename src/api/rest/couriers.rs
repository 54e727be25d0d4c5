use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Serialize;

use crate::api::rest::{id_refs, BatchRequest, IdRef};
use crate::engine::registry::{self, CourierInfo};
use crate::error::AppError;
use crate::models::courier::{Courier, CourierId, CourierPatch};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/couriers", post(create_couriers))
        .route("/couriers/:id", get(get_courier).patch(update_courier))
}

#[derive(Serialize)]
pub struct CreatedCouriers {
    pub couriers: Vec<IdRef>,
}

async fn create_couriers(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedCouriers>), AppError> {
    let Json(payload) = payload?;

    let _guard = state.write_lock.lock().await;
    let ids = registry::add_couriers(&state, &payload.data)?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedCouriers {
            couriers: id_refs(ids),
        }),
    ))
}

async fn update_courier(
    State(state): State<Arc<AppState>>,
    path: Result<Path<CourierId>, PathRejection>,
    payload: Result<Json<CourierPatch>, JsonRejection>,
) -> Result<Json<Courier>, AppError> {
    let Path(id) = path?;
    let Json(patch) = payload?;

    let _guard = state.write_lock.lock().await;
    let courier = registry::update_courier(&state, id, &patch)?;

    Ok(Json(courier))
}

async fn get_courier(
    State(state): State<Arc<AppState>>,
    path: Result<Path<CourierId>, PathRejection>,
) -> Result<Json<CourierInfo>, AppError> {
    let Path(id) = path?;

    let _guard = state.write_lock.lock().await;
    Ok(Json(registry::courier_info(&state, id)?))
}
