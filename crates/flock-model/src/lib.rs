mod domain;
pub use domain::{DEFAULT_STATS_PRECISION, ImageRef, MAX_UNIT_NAME_LEN, UnitName};

mod error;
pub use error::{ModelError, ModelResult};

mod unit;
pub use unit::{ListScope, Unit, UnitStatus};

mod exec;
pub use exec::{ExecOutput, normalize_output};

mod partition;
pub use partition::{Partition, PartitionPlan, RemainderPolicy};

mod stats;
pub use stats::PartitionStats;
