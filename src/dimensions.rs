//! Dimension aggregation
//!
//! Groups the 24 calibrated answers into the five life dimensions and
//! averages each group. Unanswered questions are ignored; a dimension with no
//! answers at all reports `None` rather than zero.

use crate::types::{Dimension, DimensionAverages};

/// Aggregated dimension view of a calibrated answer sheet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionSummary {
    pub averages: DimensionAverages,
    /// Average across every answered question
    pub overall: Option<f64>,
}

/// Aggregator for calibrated answers
pub struct DimensionAggregator;

impl DimensionAggregator {
    pub fn aggregate(calibrated: &[Option<f64>]) -> DimensionSummary {
        let mut averages = DimensionAverages::default();
        for dimension in Dimension::ALL {
            let range = dimension.indices();
            let end = range.end.min(calibrated.len());
            let start = range.start.min(end);
            averages.set(dimension, average(&calibrated[start..end]));
        }

        DimensionSummary {
            averages,
            overall: average(calibrated),
        }
    }
}

/// Mean of the present values, `None` when there are none
pub fn average(values: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
