pub mod point;

pub use point::{
    parse_timestamp, sorted_by_time, usable_points, GpsStatus, GradientField, TelemetryPoint,
    TimeOrder,
};
