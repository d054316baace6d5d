mod logger;
pub use logger::*;

#[cfg(feature = "activity")]
mod activity;

#[cfg(feature = "activity")]
pub use activity::{DEFAULT_ACTIVITY_LOG, FileActivityLog};
