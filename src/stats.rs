use crate::models::ObservationRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary statistics for one series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub series_code: String,
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Compute summary statistics grouped by series code.
pub fn grouped_summary(rows: &[ObservationRow]) -> Vec<Summary> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut missing: BTreeMap<String, usize> = BTreeMap::new();
    for row in rows {
        match row.value {
            Some(v) => groups.entry(row.series_code.clone()).or_default().push(v),
            None => *missing.entry(row.series_code.clone()).or_default() += 1,
        }
    }

    // Series with only missing values still get a summary row.
    for code in missing.keys() {
        groups.entry(code.clone()).or_default();
    }

    let mut out = Vec::new();
    for (series_code, mut vals) in groups {
        vals.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let count = vals.len();
        let min = vals.first().cloned();
        let max = vals.last().cloned();
        let mean = if count > 0 {
            Some(vals.iter().copied().sum::<f64>() / count as f64)
        } else {
            None
        };
        let median = if count == 0 {
            None
        } else if count % 2 == 1 {
            Some(vals[count / 2])
        } else {
            Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
        };
        let miss = missing.get(&series_code).cloned().unwrap_or(0);
        out.push(Summary {
            series_code,
            count,
            missing: miss,
            min,
            max,
            mean,
            median,
        });
    }
    out
}
