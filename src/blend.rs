//! Time-weighted blend
//!
//! Maps dimension averages onto time-map categories and blends them into a
//! single weekly quality:
//! - Work ← Autonomy, Commute ← Peace, Health ← Vitality,
//!   Relationships ← Connection, Leisure ← Fulfillment
//! - unlogged awake time ("Other") ← overall average
//! - sleep quality is derived from how the waking hours went
//!
//! Unallocated awake hours never cause an error; they are absorbed by the
//! synthetic Other bucket.

use crate::adjustment::ri_to_internal;
use crate::config::CrossLiftConfig;
use crate::types::{Dimension, DimensionAverages, TimeCategory, TimeRow, NEUTRAL_RI, WEEK_HOURS};

/// Hours and RI for one time category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub hours: f64,
    pub ri: f64,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            hours: 0.0,
            ri: NEUTRAL_RI,
        }
    }
}

/// The week's time map reduced to the categories the blend reads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAllocation {
    pub sleep: Slot,
    pub work: Slot,
    pub commute: Slot,
    pub health: Slot,
    pub relationships: Slot,
    pub leisure: Slot,
    /// RI applied to the synthetic Other bucket
    pub other_ri: f64,
    pub awake_hours: f64,
    pub allocated_awake: f64,
    pub other_awake: f64,
}

impl TimeAllocation {
    /// Build an allocation from time rows; the first row per category wins
    pub fn from_rows(rows: &[TimeRow]) -> Self {
        let mut slots: [Option<Slot>; 9] = [None; 9];
        for row in rows {
            let idx = category_index(row.category);
            if slots[idx].is_none() {
                slots[idx] = Some(Slot {
                    hours: clean_hours(row.hours),
                    ri: clean_ri(row.ri),
                });
            }
        }
        let slot = |c: TimeCategory| slots[category_index(c)].unwrap_or_default();

        let sleep = slot(TimeCategory::Sleep);

        let work = slot(TimeCategory::Work);
        let commute = slot(TimeCategory::Commute);
        let health = slot(TimeCategory::Health);
        let relationships = slot(TimeCategory::Relationships);
        let leisure = slot(TimeCategory::Leisure);

        let awake_hours = (WEEK_HOURS - sleep.hours).max(0.0);
        let allocated_awake =
            work.hours + commute.hours + health.hours + relationships.hours + leisure.hours;
        let other_awake = (awake_hours - allocated_awake).max(0.0);

        let catch_all: Vec<Slot> = TimeCategory::ALL
            .into_iter()
            .filter(TimeCategory::is_catch_all)
            .filter_map(|c| slots[category_index(c)])
            .collect();

        Self {
            sleep,
            work,
            commute,
            health,
            relationships,
            leisure,
            other_ri: catch_all_ri(&catch_all, slots[category_index(TimeCategory::Other)]),
            awake_hours,
            allocated_awake,
            other_awake,
        }
    }

    /// Logged waking categories, in blend order
    pub fn awake_slots(&self) -> [Slot; 5] {
        [
            self.work,
            self.commute,
            self.health,
            self.relationships,
            self.leisure,
        ]
    }

    /// Waking hours the blend divides by; exceeds `awake_hours` only when the
    /// logged awake time overflows the week
    pub fn awake_span(&self) -> f64 {
        (self.allocated_awake + self.other_awake).max(self.awake_hours)
    }

    /// Weekly denominator; 168 unless the logged hours overflow the week
    pub fn week_span(&self) -> f64 {
        (self.sleep.hours + self.awake_span()).max(WEEK_HOURS)
    }
}

fn category_index(category: TimeCategory) -> usize {
    match category {
        TimeCategory::Sleep => 0,
        TimeCategory::Work => 1,
        TimeCategory::Commute => 2,
        TimeCategory::Relationships => 3,
        TimeCategory::Leisure => 4,
        TimeCategory::Health => 5,
        TimeCategory::Chores => 6,
        TimeCategory::Growth => 7,
        TimeCategory::Other => 8,
    }
}

/// Hours for one row, limited to a single week
fn clean_hours(hours: f64) -> f64 {
    if hours.is_finite() {
        hours.clamp(0.0, WEEK_HOURS)
    } else {
        0.0
    }
}

fn clean_ri(ri: f64) -> f64 {
    if ri.is_finite() {
        ri.clamp(1.0, 10.0)
    } else {
        NEUTRAL_RI
    }
}

/// Hours-weighted RI of the catch-all rows that logged time, else the Other
/// row's RI, else neutral
fn catch_all_ri(catch_all: &[Slot], other: Option<Slot>) -> f64 {
    let hours: f64 = catch_all.iter().map(|s| s.hours).sum();
    if hours > 0.0 {
        catch_all.iter().map(|s| s.hours * s.ri).sum::<f64>() / hours
    } else {
        other.map(|s| s.ri).unwrap_or(NEUTRAL_RI)
    }
}

/// Quality (0-10) assigned to each category's hours
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryQualities {
    pub work: f64,
    pub commute: f64,
    pub health: f64,
    pub relationships: f64,
    pub leisure: f64,
    pub other: f64,
}

impl CategoryQualities {
    /// Map dimension averages onto categories, falling back to the overall
    /// average and then to 0
    pub fn from_dimensions(averages: &DimensionAverages, overall: Option<f64>) -> Self {
        let base = overall.unwrap_or(0.0);
        let or_base = |d: Dimension| averages.get(d).unwrap_or(base);

        Self {
            work: or_base(Dimension::Autonomy),
            commute: or_base(Dimension::Peace),
            health: or_base(Dimension::Vitality),
            relationships: or_base(Dimension::Connection),
            leisure: or_base(Dimension::Fulfillment),
            other: base,
        }
    }
}

/// Work quality uplift from uplifting Relationships, Health and Leisure time.
///
/// Only positive RI spills over, scaled by each category's share of waking
/// hours and damped by `(10 - work) / 10`.
pub fn cross_lift_uplift(allocation: &TimeAllocation, work_quality: f64, alpha: f64) -> f64 {
    let awake = allocation.awake_span();
    if awake <= 0.0 {
        return 0.0;
    }

    let spill: f64 = [
        allocation.relationships,
        allocation.health,
        allocation.leisure,
    ]
    .iter()
    .map(|slot| (slot.hours / awake) * ri_to_internal(slot.ri).max(0.0))
    .sum();

    alpha * spill * ((10.0 - work_quality) / 10.0)
}

/// Output of the blend stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendResult {
    pub raw_lms: f64,
    /// Hours-weighted quality of waking time
    pub awake_quality: f64,
    pub sleep_quality: f64,
    /// Work quality after cross-lift
    pub work_quality: f64,
    pub cross_lift_uplift: f64,
}

/// Blender for one week of time and qualities
pub struct TimeBlender;

impl TimeBlender {
    pub fn blend(
        allocation: &TimeAllocation,
        qualities: &CategoryQualities,
        cross_lift: &CrossLiftConfig,
    ) -> BlendResult {
        let (work_quality, uplift) = if cross_lift.enabled {
            let uplift = cross_lift_uplift(allocation, qualities.work, cross_lift.alpha);
            ((qualities.work + uplift).clamp(1.0, 10.0), uplift)
        } else {
            (qualities.work, 0.0)
        };

        let awake_weighted = allocation.work.hours * work_quality
            + allocation.commute.hours * qualities.commute
            + allocation.health.hours * qualities.health
            + allocation.relationships.hours * qualities.relationships
            + allocation.leisure.hours * qualities.leisure
            + allocation.other_awake * qualities.other;

        let awake_span = allocation.awake_span();
        let awake_quality = if awake_span > 0.0 {
            awake_weighted / awake_span
        } else {
            0.0
        };

        // Sleep is restorative by default but pulled down by the day
        let sleep_quality = (10.0 + awake_quality) / 2.0;

        let raw_lms =
            (awake_weighted + allocation.sleep.hours * sleep_quality) / allocation.week_span();

        BlendResult {
            raw_lms,
            awake_quality,
            sleep_quality,
            work_quality,
            cross_lift_uplift: uplift,
        }
    }
}
