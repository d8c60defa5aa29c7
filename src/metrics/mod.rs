mod classify;
mod types;

pub use classify::{classify, parse_leading_minutes, ON_TIME_THRESHOLD_MINUTES};
pub use types::{Aggregation, OrderClass, PickerMetrics};

use crate::db::models::OrderRecord;

const ENABLE_LOGS: bool = true;

/// Reduce an order history to on-time/late counts.
pub fn aggregate(orders: &[OrderRecord]) -> PickerMetrics {
    aggregate_with_diagnostics(orders).metrics
}

/// Like [`aggregate`], also reporting how many orders were unclassifiable.
pub fn aggregate_with_diagnostics(orders: &[OrderRecord]) -> Aggregation {
    let mut on_time = 0u64;
    let mut malformed = 0u64;

    for order in orders {
        match classify(order) {
            Ok(OrderClass::OnTime) => on_time += 1,
            Ok(OrderClass::Late) => {}
            Err(err) => {
                malformed += 1;
                crate::log_warn!("Skipping order during aggregation: {err}");
            }
        }
    }

    let total = orders.len() as u64;
    Aggregation {
        metrics: PickerMetrics {
            completed_on_time: on_time,
            // Total minus on-time: skipped orders count as late.
            completed_late: total - on_time,
            completed_orders_count: total,
        },
        malformed_orders: malformed,
    }
}
