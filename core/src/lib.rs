//! Position prediction and gradient encoding core for the machine telemetry dashboard.
//!
//! Both engines are pure functions of their inputs: the surrounding
//! application owns the tracks and configuration and calls in on every
//! refresh, getting back geometry and colors ready to draw.

pub mod gradient;
pub mod math;
pub mod prediction;
pub mod prelude;
pub mod telemetry;
pub mod track;

pub use prelude::{LatLng, TrackError, TrackResult};
