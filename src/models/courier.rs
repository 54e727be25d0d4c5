use serde::{Deserialize, Serialize};

use crate::models::time_window::TimeWindow;

pub type CourierId = i64;
pub type Region = i64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CourierType {
    Foot,
    Bike,
    Car,
}

impl CourierType {
    pub const fn max_weight(self) -> f64 {
        match self {
            CourierType::Foot => 10.0,
            CourierType::Bike => 15.0,
            CourierType::Car => 50.0,
        }
    }

    pub const fn pay_coefficient(self) -> u32 {
        match self {
            CourierType::Foot => 2,
            CourierType::Bike => 5,
            CourierType::Car => 9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Courier {
    pub courier_id: CourierId,
    pub courier_type: CourierType,
    pub regions: Vec<Region>,
    pub working_hours: Vec<TimeWindow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityProfile {
    pub max_weight: f64,
    pub regions: Vec<Region>,
    pub working_hours: Vec<TimeWindow>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CourierPatch {
    pub courier_type: Option<CourierType>,
    pub regions: Option<Vec<Region>>,
    pub working_hours: Option<Vec<TimeWindow>>,
}

impl CourierPatch {
    pub fn is_empty(&self) -> bool {
        self.courier_type.is_none() && self.regions.is_none() && self.working_hours.is_none()
    }
}

impl Courier {
    pub fn capability(&self) -> CapabilityProfile {
        CapabilityProfile {
            max_weight: self.courier_type.max_weight(),
            regions: self.regions.clone(),
            working_hours: self.working_hours.clone(),
        }
    }

    pub fn patched(&self, patch: &CourierPatch) -> Courier {
        Courier {
            courier_id: self.courier_id,
            courier_type: patch.courier_type.unwrap_or(self.courier_type),
            regions: patch.regions.clone().unwrap_or_else(|| self.regions.clone()),
            working_hours: patch
                .working_hours
                .clone()
                .unwrap_or_else(|| self.working_hours.clone()),
        }
    }
}
