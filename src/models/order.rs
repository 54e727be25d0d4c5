use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::courier::{CourierId, Region};
use crate::models::time_window::TimeWindow;

pub type OrderId = i64;

pub const MIN_WEIGHT: f64 = 0.01;
pub const MAX_WEIGHT: f64 = 50.0;

pub fn is_valid_weight(weight: f64) -> bool {
    (MIN_WEIGHT..=MAX_WEIGHT).contains(&weight)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderAssignment {
    pub courier_id: CourierId,
    pub assigned_at: DateTime<Utc>,
    /// Coefficient of the courier's type when the order was handed out.
    pub pay_coefficient: u32,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub order_id: OrderId,
    pub weight: f64,
    pub region: Region,
    pub delivery_hours: Vec<TimeWindow>,
    pub assignment: Option<OrderAssignment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub weight: f64,
    pub region: Region,
    pub delivery_hours: Vec<TimeWindow>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletedDelivery {
    pub order_id: OrderId,
    pub region: Region,
    pub pay_coefficient: u32,
    pub assigned_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl From<NewOrder> for Order {
    fn from(new: NewOrder) -> Self {
        Self {
            order_id: new.order_id,
            weight: new.weight,
            region: new.region,
            delivery_hours: new.delivery_hours,
            assignment: None,
        }
    }
}

impl Order {
    pub fn courier_id(&self) -> Option<CourierId> {
        self.assignment.as_ref().map(|a| a.courier_id)
    }

    pub fn complete(&self) -> bool {
        self.assignment
            .as_ref()
            .is_some_and(|a| a.completed_at.is_some())
    }

    pub fn pay_coefficient(&self) -> u32 {
        self.assignment.as_ref().map_or(0, |a| a.pay_coefficient)
    }

    pub fn is_unassigned(&self) -> bool {
        self.assignment.is_none()
    }

    pub fn is_active_for(&self, courier_id: CourierId) -> bool {
        self.assignment
            .as_ref()
            .is_some_and(|a| a.courier_id == courier_id && a.completed_at.is_none())
    }

    pub fn as_completed(&self) -> Option<CompletedDelivery> {
        let assignment = self.assignment.as_ref()?;
        let completed_at = assignment.completed_at?;

        Some(CompletedDelivery {
            order_id: self.order_id,
            region: self.region,
            pay_coefficient: assignment.pay_coefficient,
            assigned_at: assignment.assigned_at,
            completed_at,
        })
    }
}
