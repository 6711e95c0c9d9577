//! # Analytics
//!
//! Aggregates recorded widget requests into the dashboard's chart series.
//!
//! ```text
//! SizeExchangeRequested { M → L }     ──► size_changes["M -> L"] += 1
//!                                     ──► most_searched_sizes["L"] += 1
//! ProductExchangeRequested { A → B }  ──► product_changes["A -> B"] += 1
//! AssistanceRequested                 ──► assistance_requests += 1
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::widget::WidgetEvent;

/// A widget request as kept in the request log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RecordedRequest {
    pub id: String,
    pub merchant_id: String,
    pub event: WidgetEvent,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// One bar or slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChartPoint {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsData {
    pub size_changes: Vec<ChartPoint>,
    pub product_changes: Vec<ChartPoint>,
    pub most_searched_sizes: Vec<ChartPoint>,
    pub assistance_requests: u64,
}

/// Counts events into chart series.
///
/// Each series is sorted by descending count, ties by name, so the output
/// is stable for identical input.
pub fn summarize<'a, I>(events: I) -> AnalyticsData
where
    I: IntoIterator<Item = &'a WidgetEvent>,
{
    let mut size_changes: HashMap<String, u64> = HashMap::new();
    let mut product_changes: HashMap<String, u64> = HashMap::new();
    let mut searched: HashMap<String, u64> = HashMap::new();
    let mut assistance_requests = 0;

    for event in events {
        match event {
            WidgetEvent::AssistanceRequested { .. } => assistance_requests += 1,
            WidgetEvent::SizeExchangeRequested {
                current_size,
                needed_size,
                ..
            } => {
                *size_changes
                    .entry(format!("{current_size} -> {needed_size}"))
                    .or_default() += 1;
                *searched.entry(needed_size.clone()).or_default() += 1;
            }
            WidgetEvent::ProductExchangeRequested {
                current_product,
                needed_product,
                ..
            } => {
                let name = if current_product.is_empty() {
                    needed_product.clone()
                } else {
                    format!("{current_product} -> {needed_product}")
                };
                *product_changes.entry(name).or_default() += 1;
            }
        }
    }

    AnalyticsData {
        size_changes: ranked(size_changes),
        product_changes: ranked(product_changes),
        most_searched_sizes: ranked(searched),
        assistance_requests,
    }
}

fn ranked(counts: HashMap<String, u64>) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = counts
        .into_iter()
        .map(|(name, value)| ChartPoint { name, value })
        .collect();
    points.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    points
}
