pub use entity::{claims, estimate_status, estimates, vin, Id};

pub mod error;
pub mod estimate;
pub mod in_memory;

pub use estimate::EstimateStore;
pub use in_memory::InMemoryEstimateStore;

#[cfg(any(test, feature = "mock"))]
pub use estimate::MockEstimateStore;
