//! Aggregation Engine
//!
//! Folds normalized [`Event`]s into two independent group-by accumulators:
//!
//! - **campaigns**: `campaign_id -> (total_price, count)`
//! - **devices**: `device_type -> (total_duration, count)`
//!
//! The [`Aggregator`] owns both maps for the lifetime of one batch. Nothing is
//! visible until [`Aggregator::finish`] turns it into an immutable
//! [`SummaryResult`]; the per-device average is derived there, once, from the
//! final totals.
//!
//! Sums and counts are commutative, so two partial aggregators can be combined
//! with [`Aggregator::merge`] regardless of which lines each one saw.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::event::{Dimension, Event};

/// Spend statistics for one campaign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CampaignStat {
    pub total_price: f64,
    pub count: u64,
}

/// Watch-duration statistics for one device type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceStat {
    pub total_duration: f64,
    pub count: u64,
    pub avg_duration: f64,
}

/// Final, immutable aggregation snapshot.
///
/// Keys are rendered dimensions (undefined becomes `"undefined"`) and are
/// kept in lexicographic order so encoded output is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub campaigns_stats: BTreeMap<String, CampaignStat>,
    pub device_stats_avg: BTreeMap<String, DeviceStat>,
}

impl SummaryResult {
    pub fn is_empty(&self) -> bool {
        self.campaigns_stats.is_empty() && self.device_stats_avg.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    sum: f64,
    count: u64,
}

impl Totals {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn absorb(&mut self, other: Totals) {
        self.sum += other.sum;
        self.count += other.count;
    }
}

/// Streaming group-by accumulator for one batch.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    campaigns: HashMap<Dimension, Totals>,
    devices: HashMap<Dimension, Totals>,
    folded: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a single event into both accumulators.
    pub fn fold(&mut self, event: &Event) {
        self.campaigns
            .entry(event.campaign_id.clone())
            .or_default()
            .add(event.client_price_amount);
        self.devices
            .entry(event.device_type.clone())
            .or_default()
            .add(event.duration);
        self.folded += 1;
    }

    /// Number of events folded so far.
    pub fn folded(&self) -> u64 {
        self.folded
    }

    /// Combine another partial aggregation into this one.
    pub fn merge(&mut self, other: Aggregator) {
        for (key, totals) in other.campaigns {
            self.campaigns.entry(key).or_default().absorb(totals);
        }
        for (key, totals) in other.devices {
            self.devices.entry(key).or_default().absorb(totals);
        }
        self.folded += other.folded;
    }

    /// Materialize the summary. Consumes the accumulator.
    pub fn finish(self) -> SummaryResult {
        let campaigns_stats = self
            .campaigns
            .into_iter()
            .map(|(key, t)| {
                (
                    key.to_string(),
                    CampaignStat {
                        total_price: t.sum,
                        count: t.count,
                    },
                )
            })
            .collect();

        // Keys only exist after at least one fold, so count is never zero.
        let device_stats_avg = self
            .devices
            .into_iter()
            .map(|(key, t)| {
                (
                    key.to_string(),
                    DeviceStat {
                        total_duration: t.sum,
                        count: t.count,
                        avg_duration: t.sum / t.count as f64,
                    },
                )
            })
            .collect();

        SummaryResult {
            campaigns_stats,
            device_stats_avg,
        }
    }
}

impl<'a> Extend<&'a Event> for Aggregator {
    fn extend<I: IntoIterator<Item = &'a Event>>(&mut self, events: I) {
        for event in events {
            self.fold(event);
        }
    }
}

impl<'a> FromIterator<&'a Event> for Aggregator {
    fn from_iter<I: IntoIterator<Item = &'a Event>>(events: I) -> Self {
        let mut aggregator = Aggregator::new();
        aggregator.extend(events);
        aggregator
    }
}
