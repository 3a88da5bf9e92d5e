pub mod reading;
pub mod summary;

pub use reading::{CanonicalReading, DeviceStatus, StalenessRecord};
pub use summary::{RunSummary, SourceReport};
