use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, BatchKind};
use crate::models::courier::Courier;
use crate::models::order::{is_valid_weight, NewOrder};

pub trait BatchItem: DeserializeOwned {
    const KIND: BatchKind;
    const ID_FIELD: &'static str;

    fn id(&self) -> i64;

    fn check(&self) -> bool {
        true
    }
}

impl BatchItem for Courier {
    const KIND: BatchKind = BatchKind::Couriers;
    const ID_FIELD: &'static str = "courier_id";

    fn id(&self) -> i64 {
        self.courier_id
    }
}

impl BatchItem for NewOrder {
    const KIND: BatchKind = BatchKind::Orders;
    const ID_FIELD: &'static str = "order_id";

    fn id(&self) -> i64 {
        self.order_id
    }

    fn check(&self) -> bool {
        is_valid_weight(self.weight)
    }
}

fn raw_id<T: BatchItem>(item: &Value) -> Option<i64> {
    item.get(T::ID_FIELD).and_then(Value::as_i64)
}

pub fn raw_ids<T: BatchItem>(items: &[Value]) -> Vec<i64> {
    items.iter().filter_map(raw_id::<T>).collect()
}

pub fn parse_batch<T: BatchItem>(items: &[Value]) -> Result<Vec<T>, AppError> {
    let mut parsed = Vec::with_capacity(items.len());
    let mut offending = Vec::new();
    let mut seen = HashSet::new();

    for item in items {
        match serde_json::from_value::<T>(item.clone()) {
            Ok(record) if record.check() && seen.insert(record.id()) => parsed.push(record),
            _ => offending.push(raw_id::<T>(item)),
        }
    }

    if offending.is_empty() {
        Ok(parsed)
    } else {
        Err(AppError::InvalidBatch {
            kind: T::KIND,
            ids: offending,
        })
    }
}
