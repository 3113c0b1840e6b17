mod client;
mod orders;
mod products;
mod sims;

pub use client::{ApiClient, ApiError, Query};
pub use orders::NewOrder;
pub use sims::{SimFilter, SimStatus, SimUpdate, DATE_FORMAT};
