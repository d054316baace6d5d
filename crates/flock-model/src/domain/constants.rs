//! Well-known limits shared by the model layer.

/// Longest unit name accepted by [`crate::UnitName`].
///
/// Container runtimes reject much longer names anyway; keeping the bound here
/// lets the API reject them before a runtime round-trip.
pub const MAX_UNIT_NAME_LEN: usize = 128;

/// Number of fractional digits used when rendering [`crate::PartitionStats`].
pub const DEFAULT_STATS_PRECISION: usize = 4;
