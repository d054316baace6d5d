use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_STATS_PRECISION, ModelError};

/// Aggregate statistics computed by a unit over its partition.
///
/// Wire format (one line): `sum:<f> mean:<f> max:<f> min:<f> std:<f>`,
/// where `std` is the population standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartitionStats {
    pub sum: f64,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    pub std: f64,
}

impl PartitionStats {
    /// Compute statistics over a slice of values; `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let sum: f64 = values.iter().sum();
        let mean = sum / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        Some(Self {
            sum,
            mean,
            max,
            min,
            std: variance.sqrt(),
        })
    }
}

impl fmt::Display for PartitionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = DEFAULT_STATS_PRECISION;
        write!(
            f,
            "sum:{} mean:{:.p$} max:{} min:{} std:{:.p$}",
            self.sum, self.mean, self.max, self.min, self.std
        )
    }
}

impl FromStr for PartitionStats {
    type Err = ModelError;

    /// Parse the one-line wire format. Unknown `key:value` tokens are ignored,
    /// all five known keys are required.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mut sum, mut mean, mut max, mut min, mut std) = (None, None, None, None, None);

        for token in s.split_whitespace() {
            let Some((key, raw)) = token.split_once(':') else {
                continue;
            };
            let slot = match key {
                "sum" => &mut sum,
                "mean" => &mut mean,
                "max" => &mut max,
                "min" => &mut min,
                "std" => &mut std,
                _ => continue,
            };
            let value: f64 = raw
                .parse()
                .map_err(|_| ModelError::MalformedStats(format!("{key} is not a number: {raw}")))?;
            *slot = Some(value);
        }

        let missing = |name: &str| ModelError::MalformedStats(format!("missing '{name}' in: {s}"));
        Ok(Self {
            sum: sum.ok_or_else(|| missing("sum"))?,
            mean: mean.ok_or_else(|| missing("mean"))?,
            max: max.ok_or_else(|| missing("max"))?,
            min: min.ok_or_else(|| missing("min"))?,
            std: std.ok_or_else(|| missing("std"))?,
        })
    }
}
