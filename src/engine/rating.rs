use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::models::courier::Region;
use crate::models::order::CompletedDelivery;

pub const PAY_PER_ORDER: u64 = 500;
pub const MAX_RATING: f64 = 5.0;
const ONE_HOUR_SECS: i64 = 60 * 60;

pub fn earnings(completed: &[CompletedDelivery]) -> u64 {
    completed
        .iter()
        .map(|delivery| u64::from(delivery.pay_coefficient) * PAY_PER_ORDER)
        .sum()
}

// Back-to-back deliveries count from the previous drop-off when that is
// shorter than the time since assignment.
fn delivery_seconds(completed: &[CompletedDelivery]) -> Vec<(Region, i64)> {
    let mut ordered = completed.to_vec();
    ordered.sort_by_key(|delivery| delivery.completed_at);

    let mut previous: Option<DateTime<Utc>> = None;
    ordered
        .iter()
        .map(|delivery| {
            let since_assigned = (delivery.completed_at - delivery.assigned_at).num_seconds();
            let seconds = match previous {
                Some(prev) => since_assigned.min((delivery.completed_at - prev).num_seconds()),
                None => since_assigned,
            };
            previous = Some(delivery.completed_at);
            (delivery.region, seconds)
        })
        .collect()
}

pub fn rating(completed: &[CompletedDelivery]) -> Option<f64> {
    let mut fastest_by_region: BTreeMap<Region, i64> = BTreeMap::new();
    for (region, seconds) in delivery_seconds(completed) {
        fastest_by_region
            .entry(region)
            .and_modify(|fastest| *fastest = (*fastest).min(seconds))
            .or_insert(seconds);
    }

    let fastest = fastest_by_region.into_values().min()?;
    let capped = fastest.clamp(0, ONE_HOUR_SECS);

    Some(MAX_RATING * (ONE_HOUR_SECS - capped) as f64 / ONE_HOUR_SECS as f64)
}
