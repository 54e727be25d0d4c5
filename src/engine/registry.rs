use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::engine::intake::{parse_batch, raw_ids, BatchItem};
use crate::engine::rating::{earnings, rating};
use crate::engine::reassignment::orders_to_release;
use crate::error::AppError;
use crate::models::courier::{Courier, CourierId, CourierPatch};
use crate::models::order::{NewOrder, Order, OrderId};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct CourierInfo {
    #[serde(flatten)]
    pub courier: Courier,
    pub earnings: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

fn check_batch<T: BatchItem>(
    state: &AppState,
    items: &[Value],
    exists: impl Fn(i64) -> bool,
) -> Result<Vec<T>, AppError> {
    let kind = T::KIND.as_str();

    let existing: Vec<i64> = raw_ids::<T>(items)
        .into_iter()
        .filter(|id| exists(*id))
        .collect();
    if !existing.is_empty() {
        state.metrics.batch_rejections_total.with_label_values(&[kind]).inc();
        warn!(kind, ids = ?existing, "batch collides with stored ids");
        return Err(AppError::DuplicateId {
            kind: T::KIND,
            ids: existing,
        });
    }

    parse_batch::<T>(items).inspect_err(|err| {
        state.metrics.batch_rejections_total.with_label_values(&[kind]).inc();
        warn!(kind, error = %err, "batch failed validation");
    })
}

pub fn add_couriers(state: &AppState, items: &[Value]) -> Result<Vec<CourierId>, AppError> {
    let couriers: Vec<Courier> = check_batch(state, items, |id| state.couriers.contains_key(&id))?;

    let ids: Vec<CourierId> = couriers.iter().map(|courier| courier.courier_id).collect();
    for courier in couriers {
        state.couriers.insert(courier.courier_id, courier);
    }

    info!(count = ids.len(), "couriers registered");
    Ok(ids)
}

pub fn add_orders(state: &AppState, items: &[Value]) -> Result<Vec<OrderId>, AppError> {
    let orders: Vec<NewOrder> = check_batch(state, items, |id| state.ledger.contains(id))?;

    let ids: Vec<OrderId> = orders.iter().map(|order| order.order_id).collect();
    state
        .ledger
        .insert_all(orders.into_iter().map(Order::from).collect());

    info!(count = ids.len(), "orders registered");
    Ok(ids)
}

pub fn update_courier(
    state: &AppState,
    courier_id: CourierId,
    patch: &CourierPatch,
) -> Result<Courier, AppError> {
    if patch.is_empty() {
        return Err(AppError::Validation("no updatable fields given".to_string()));
    }

    let current = state
        .courier(courier_id)
        .ok_or_else(|| AppError::NotFound(format!("courier {courier_id} not found")))?;
    let updated = current.patched(patch);
    state.couriers.insert(courier_id, updated.clone());

    let active = state.ledger.active_for(courier_id);
    let to_release = orders_to_release(patch, &active);
    let released = state.ledger.cancel(&to_release);
    state.metrics.orders_released_total.inc_by(released as u64);

    info!(courier_id, released, "courier updated");
    Ok(updated)
}

pub fn courier_info(state: &AppState, courier_id: CourierId) -> Result<CourierInfo, AppError> {
    let courier = state
        .courier(courier_id)
        .ok_or_else(|| AppError::NotFound(format!("courier {courier_id} not found")))?;

    let completed: Vec<_> = state
        .ledger
        .completed_for(courier_id)
        .iter()
        .filter_map(Order::as_completed)
        .collect();

    Ok(CourierInfo {
        courier,
        earnings: earnings(&completed),
        rating: rating(&completed),
    })
}

pub fn get_order(state: &AppState, order_id: OrderId) -> Result<Order, AppError> {
    state
        .ledger
        .get(order_id)
        .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))
}
