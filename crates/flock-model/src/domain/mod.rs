mod name;
pub use name::UnitName;

mod image;
pub use image::ImageRef;

mod constants;
pub use constants::{DEFAULT_STATS_PRECISION, MAX_UNIT_NAME_LEN};
