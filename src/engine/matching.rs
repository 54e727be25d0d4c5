use crate::models::courier::CapabilityProfile;
use crate::models::order::{Order, OrderId};
use crate::models::time_window::any_overlap;

pub fn fits_weight(profile: &CapabilityProfile, order: &Order) -> bool {
    order.weight <= profile.max_weight
}

pub fn serves_region(profile: &CapabilityProfile, order: &Order) -> bool {
    profile.regions.contains(&order.region)
}

pub fn hours_overlap(profile: &CapabilityProfile, order: &Order) -> bool {
    any_overlap(&profile.working_hours, &order.delivery_hours)
}

pub fn is_compatible(profile: &CapabilityProfile, order: &Order) -> bool {
    fits_weight(profile, order) && serves_region(profile, order) && hours_overlap(profile, order)
}

pub fn match_orders<'a, I>(profile: &CapabilityProfile, candidates: I) -> Vec<OrderId>
where
    I: IntoIterator<Item = &'a Order>,
{
    candidates
        .into_iter()
        .filter(|order| is_compatible(profile, order))
        .map(|order| order.order_id)
        .collect()
}
