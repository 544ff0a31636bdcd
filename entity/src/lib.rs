use uuid::Uuid;

// Inbound insurance data
pub mod claims;
pub mod vin;

// Body-shop estimates
pub mod estimate_status;
pub mod estimates;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
