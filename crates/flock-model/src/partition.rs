use std::{fmt, ops::Range, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// How a dataset that does not divide evenly is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// Refuse the request before anything is provisioned.
    #[default]
    Reject,
    /// Equal partitions; the last one also takes the remainder.
    LastAbsorbs,
}

impl FromStr for RemainderPolicy {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "reject" => Ok(Self::Reject),
            "last_absorbs" => Ok(Self::LastAbsorbs),
            _ => Err(ModelError::UnknownRemainderPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for RemainderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RemainderPolicy::Reject => "reject",
            RemainderPolicy::LastAbsorbs => "last_absorbs",
        })
    }
}

/// One contiguous slice `[offset, offset + len)` of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition {
    /// 0-based partition index.
    pub index: usize,
    pub offset: u64,
    pub len: u64,
}

impl Partition {
    /// Exclusive end offset.
    #[inline]
    pub fn end(&self) -> u64 {
        self.offset + self.len
    }

    #[inline]
    pub fn range(&self) -> Range<u64> {
        self.offset..self.end()
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} [{}, {})", self.index, self.offset, self.end())
    }
}

/// Split of a dataset into contiguous, non-overlapping partitions.
///
/// Invariant: partitions are ordered by index, start at 0, each one starts where
/// the previous ends, and their lengths sum to `dataset_size`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionPlan {
    dataset_size: u64,
    partitions: Vec<Partition>,
}

impl PartitionPlan {
    /// Build a plan of `count` partitions over `dataset_size` elements.
    ///
    /// Rules:
    /// - `count >= 1` and `dataset_size >= count` (no empty partitions);
    /// - with [`RemainderPolicy::Reject`], `dataset_size % count` must be zero.
    pub fn new(
        dataset_size: u64,
        count: usize,
        policy: RemainderPolicy,
    ) -> Result<Self, ModelError> {
        if count == 0 {
            return Err(ModelError::InvalidPartitioning(
                "partition count must be at least 1".into(),
            ));
        }
        let parts = count as u64;
        if dataset_size < parts {
            return Err(ModelError::InvalidPartitioning(format!(
                "dataset size {dataset_size} is smaller than partition count {count}"
            )));
        }

        let base = dataset_size / parts;
        let remainder = dataset_size % parts;
        if remainder != 0 && policy == RemainderPolicy::Reject {
            return Err(ModelError::InvalidPartitioning(format!(
                "dataset size {dataset_size} is not divisible by partition count {count}"
            )));
        }

        let partitions = (0..count)
            .map(|index| {
                let offset = base * index as u64;
                let len = if index + 1 == count { base + remainder } else { base };
                Partition { index, offset, len }
            })
            .collect();

        Ok(Self {
            dataset_size,
            partitions,
        })
    }

    #[inline]
    pub fn dataset_size(&self) -> u64 {
        self.dataset_size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Partition> {
        self.partitions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Partition> {
        self.partitions.iter()
    }
}

impl<'a> IntoIterator for &'a PartitionPlan {
    type Item = &'a Partition;
    type IntoIter = std::slice::Iter<'a, Partition>;

    fn into_iter(self) -> Self::IntoIter {
        self.partitions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers(plan: &PartitionPlan) {
        let mut cursor = 0;
        for (i, p) in plan.iter().enumerate() {
            assert_eq!(p.index, i);
            assert_eq!(p.offset, cursor, "partition {i} is not contiguous");
            assert!(p.len > 0);
            cursor = p.end();
        }
        assert_eq!(cursor, plan.dataset_size());
        assert_eq!(plan.iter().map(|p| p.len).sum::<u64>(), plan.dataset_size());
    }

    #[test]
    fn hundred_thousand_into_four() {
        let plan = PartitionPlan::new(100_000, 4, RemainderPolicy::Reject).unwrap();
        let ranges: Vec<_> = plan.iter().map(Partition::range).collect();
        assert_eq!(
            ranges,
            vec![0..25_000, 25_000..50_000, 50_000..75_000, 75_000..100_000]
        );
        assert_covers(&plan);
    }

    #[test]
    fn divisible_sizes_always_cover_the_dataset() {
        for count in 1..=16usize {
            for per in [1u64, 2, 7, 1_000] {
                let size = per * count as u64;
                let plan = PartitionPlan::new(size, count, RemainderPolicy::Reject).unwrap();
                assert_eq!(plan.len(), count);
                assert!(plan.iter().all(|p| p.len == per));
                assert_covers(&plan);
            }
        }
    }

    #[test]
    fn reject_policy_refuses_remainder() {
        let err = PartitionPlan::new(10, 3, RemainderPolicy::Reject).unwrap_err();
        assert!(matches!(err, ModelError::InvalidPartitioning(msg) if msg.contains("not divisible")));
    }

    #[test]
    fn last_partition_absorbs_remainder() {
        let plan = PartitionPlan::new(10, 3, RemainderPolicy::LastAbsorbs).unwrap();
        let lens: Vec<_> = plan.iter().map(|p| p.len).collect();
        assert_eq!(lens, vec![3, 3, 4]);
        assert_covers(&plan);
    }

    #[test]
    fn zero_count_and_tiny_datasets_are_invalid() {
        assert!(PartitionPlan::new(100, 0, RemainderPolicy::Reject).is_err());
        assert!(PartitionPlan::new(0, 1, RemainderPolicy::LastAbsorbs).is_err());
        assert!(PartitionPlan::new(2, 3, RemainderPolicy::LastAbsorbs).is_err());
    }

    #[test]
    fn remainder_policy_parses_loosely() {
        assert_eq!("reject".parse::<RemainderPolicy>().unwrap(), RemainderPolicy::Reject);
        assert_eq!(
            "Last-Absorbs".parse::<RemainderPolicy>().unwrap(),
            RemainderPolicy::LastAbsorbs
        );
        assert!("spread".parse::<RemainderPolicy>().is_err());
        assert_eq!(RemainderPolicy::LastAbsorbs.to_string(), "last_absorbs");
    }
}
