//! Vendor performance metrics derived from purchase order history.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{purchase_order, vendor};

/// The four aggregates stored on a vendor after each recomputation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PerformanceMetrics {
    /// Percentage of completed orders delivered on or before the promised date
    pub on_time_delivery_rate: f64,
    /// Mean quality rating over rated completed orders
    pub quality_rating_avg: f64,
    /// Mean minutes between issue and acknowledgment over acknowledged completed orders
    pub average_response_time: f64,
    /// Percentage of completed orders that have been acknowledged
    pub fulfillment_rate: f64,
}

impl From<&vendor::Model> for PerformanceMetrics {
    fn from(vendor: &vendor::Model) -> Self {
        Self {
            on_time_delivery_rate: vendor.on_time_delivery_rate,
            quality_rating_avg: vendor.quality_rating_avg,
            average_response_time: vendor.average_response_time,
            fulfillment_rate: vendor.fulfillment_rate,
        }
    }
}

/// An order is on time when it has arrived and arrived no later than promised.
pub fn is_on_time(order: &purchase_order::Model) -> bool {
    order
        .actual_delivery_date
        .map(|actual| actual <= order.delivery_date)
        .unwrap_or(false)
}

/// Minutes from issue to acknowledgment, `None` for unacknowledged orders.
///
/// Microsecond precision; spans too large for that fall back to milliseconds.
pub fn response_minutes(order: &purchase_order::Model) -> Option<f64> {
    order.acknowledgment_date.map(|ack| {
        let span = ack - order.issue_date;
        match span.num_microseconds() {
            Some(micros) => micros as f64 / 60_000_000.0,
            None => span.num_milliseconds() as f64 / 60_000.0,
        }
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Computes the metrics over the `Completed` orders in `orders`; other statuses are ignored.
///
/// Every metric is `0.0` when its denominator is empty.
pub fn compute(orders: &[purchase_order::Model]) -> PerformanceMetrics {
    let completed: Vec<&purchase_order::Model> =
        orders.iter().filter(|order| order.is_completed()).collect();
    let total = completed.len();

    let on_time = completed.iter().filter(|order| is_on_time(order)).count();

    let ratings: Vec<f64> = completed
        .iter()
        .filter_map(|order| order.quality_rating)
        .collect();

    let response_times: Vec<f64> = completed
        .iter()
        .filter_map(|order| response_minutes(order))
        .collect();

    PerformanceMetrics {
        on_time_delivery_rate: percentage(on_time, total),
        quality_rating_avg: mean(&ratings),
        average_response_time: mean(&response_times),
        fulfillment_rate: percentage(response_times.len(), total),
    }
}
