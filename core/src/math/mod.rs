pub mod color;
pub mod geodesy;
pub mod stats;

pub use color::Rgb;
pub use stats::StatsHelper;
