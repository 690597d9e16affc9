//! Load generator for an HTTP elevation service.
//!
//! Workers post batches of random coordinates to `<host>/v1/elevations` and
//! report each outcome to a single aggregator, which ends the run when the
//! target location count is reached or on the first failure.

pub mod aggregator;
pub mod driver;
pub mod error;
pub mod geo;
pub mod model;
pub mod report;
pub mod worker;

pub use driver::LoadDriver;
pub use error::{Result, StressError};
pub use model::{Outcome, RunConfig};
pub use report::Summary;
