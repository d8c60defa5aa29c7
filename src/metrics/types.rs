use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderClass {
    OnTime,
    Late,
}

/// Order-completion counts for one picker.
///
/// `completed_late` is total minus on-time, so orders with an unusable
/// completion time land in the late bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerMetrics {
    pub completed_on_time: u64,
    pub completed_late: u64,
    pub completed_orders_count: u64,
}

/// Metrics plus how many orders the classifier had to skip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aggregation {
    pub metrics: PickerMetrics,
    pub malformed_orders: u64,
}
