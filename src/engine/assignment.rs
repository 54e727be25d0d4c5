use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::engine::matching::match_orders;
use crate::error::AppError;
use crate::models::courier::CourierId;
use crate::models::order::OrderId;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentOutcome {
    pub order_ids: Vec<OrderId>,
    pub assign_time: Option<DateTime<Utc>>,
}

pub fn orders_for_courier(
    state: &AppState,
    courier_id: CourierId,
    now: DateTime<Utc>,
) -> Result<AssignmentOutcome, AppError> {
    let start = Instant::now();

    let courier = state
        .courier(courier_id)
        .ok_or_else(|| AppError::Validation(format!("courier {courier_id} does not exist")))?;

    let candidates = state.ledger.unassigned();
    let order_ids = match_orders(&courier.capability(), &candidates);

    let outcome = if order_ids.is_empty() {
        AssignmentOutcome {
            order_ids,
            assign_time: None,
        }
    } else {
        let assign_time = state
            .ledger
            .assign(courier_id, courier.courier_type, &order_ids, now)?;
        AssignmentOutcome {
            order_ids,
            assign_time: Some(assign_time),
        }
    };

    let label = if outcome.order_ids.is_empty() { "empty" } else { "matched" };
    state
        .metrics
        .assign_requests_total
        .with_label_values(&[label])
        .inc();
    state
        .metrics
        .orders_assigned_total
        .inc_by(outcome.order_ids.len() as u64);
    state
        .metrics
        .assignment_latency_seconds
        .observe(start.elapsed().as_secs_f64());

    info!(
        courier_id,
        candidates = candidates.len(),
        assigned = outcome.order_ids.len(),
        "orders assigned"
    );

    Ok(outcome)
}

pub fn complete_order(
    state: &AppState,
    order_id: OrderId,
    courier_id: CourierId,
    complete_time: &str,
) -> Result<OrderId, AppError> {
    let was_complete = state
        .ledger
        .get(order_id)
        .is_some_and(|order| order.complete());

    state.ledger.complete(order_id, courier_id, complete_time)?;

    if !was_complete {
        state.metrics.orders_completed_total.inc();
        info!(order_id, courier_id, "order completed");
    }

    Ok(order_id)
}
