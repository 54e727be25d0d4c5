use crate::models::courier::CourierPatch;
use crate::models::order::{Order, OrderId};
use crate::models::time_window::any_overlap;

pub fn orders_to_release(patch: &CourierPatch, active: &[Order]) -> Vec<OrderId> {
    active
        .iter()
        .filter(|order| {
            let too_heavy = patch
                .courier_type
                .is_some_and(|courier_type| order.weight > courier_type.max_weight());
            let outside_regions = patch
                .regions
                .as_ref()
                .is_some_and(|regions| !regions.contains(&order.region));
            let off_hours = patch
                .working_hours
                .as_ref()
                .is_some_and(|hours| !any_overlap(hours, &order.delivery_hours));

            too_heavy || outside_regions || off_hours
        })
        .map(|order| order.order_id)
        .collect()
}
