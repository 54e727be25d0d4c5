use chrono::{DateTime, NaiveDateTime, Utc};
use dashmap::DashMap;

use crate::error::AppError;
use crate::models::courier::{CourierId, CourierType};
use crate::models::order::{Order, OrderAssignment, OrderId};

#[derive(Default)]
pub struct AssignmentLedger {
    orders: DashMap<OrderId, Order>,
}

const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
    "%Y%m%dT%H%M%S%.f%#z",
    "%Y%m%dT%H%M%#z",
];

// Zone-less inputs are read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, AppError> {
    let raw = raw.trim();

    let zoned = || {
        DateTime::parse_from_rfc3339(raw).ok().or_else(|| {
            ZONED_FORMATS
                .iter()
                .find_map(|format| DateTime::parse_from_str(raw, format).ok())
        })
    };
    let naive = || {
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    };

    zoned()
        .map(|parsed| parsed.with_timezone(&Utc))
        .or_else(|| naive().map(|parsed| parsed.and_utc()))
        .ok_or_else(|| AppError::MalformedTimestamp(format!("{raw:?} is not an ISO 8601 instant")))
}

impl AssignmentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn contains(&self, order_id: OrderId) -> bool {
        self.orders.contains_key(&order_id)
    }

    pub fn get(&self, order_id: OrderId) -> Option<Order> {
        self.orders.get(&order_id).map(|entry| entry.value().clone())
    }

    pub fn insert_all(&self, orders: Vec<Order>) {
        for order in orders {
            self.orders.insert(order.order_id, order);
        }
    }

    fn collect_sorted(&self, keep: impl Fn(&Order) -> bool) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by_key(|order| order.order_id);
        orders
    }

    pub fn unassigned(&self) -> Vec<Order> {
        self.collect_sorted(Order::is_unassigned)
    }

    pub fn active_for(&self, courier_id: CourierId) -> Vec<Order> {
        self.collect_sorted(|order| order.is_active_for(courier_id))
    }

    pub fn completed_for(&self, courier_id: CourierId) -> Vec<Order> {
        self.collect_sorted(|order| order.courier_id() == Some(courier_id) && order.complete())
    }

    pub fn assign(
        &self,
        courier_id: CourierId,
        courier_type: CourierType,
        order_ids: &[OrderId],
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, AppError> {
        if let Some(missing) = order_ids.iter().find(|id| !self.contains(**id)) {
            return Err(AppError::NotFound(format!("order {missing} not found")));
        }

        let pay_coefficient = courier_type.pay_coefficient();
        for order_id in order_ids {
            if let Some(mut order) = self.orders.get_mut(order_id) {
                order.assignment = Some(OrderAssignment {
                    courier_id,
                    assigned_at: now,
                    pay_coefficient,
                    completed_at: None,
                });
            }
        }

        Ok(now)
    }

    // Completed orders keep their assignment.
    pub fn cancel(&self, order_ids: &[OrderId]) -> usize {
        let mut released = 0;
        for order_id in order_ids {
            if let Some(mut order) = self.orders.get_mut(order_id) {
                if order.assignment.is_some() && !order.complete() {
                    order.assignment = None;
                    released += 1;
                }
            }
        }
        released
    }

    pub fn complete(
        &self,
        order_id: OrderId,
        courier_id: CourierId,
        completion_time: &str,
    ) -> Result<Order, AppError> {
        let not_assigned = || AppError::NotAssigned {
            order_id,
            courier_id,
        };

        let mut order = self.orders.get_mut(&order_id).ok_or_else(not_assigned)?;
        let completed_at = parse_timestamp(completion_time)?;

        {
            let assignment = order
                .assignment
                .as_mut()
                .filter(|assignment| assignment.courier_id == courier_id)
                .ok_or_else(not_assigned)?;

            if assignment.completed_at.is_none() {
                if completed_at < assignment.assigned_at {
                    return Err(AppError::Validation(format!(
                        "complete_time {completion_time} precedes assignment of order {order_id}"
                    )));
                }
                assignment.completed_at = Some(completed_at);
            }
        }

        Ok(order.clone())
    }
}
