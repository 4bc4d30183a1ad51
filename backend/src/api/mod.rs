pub mod outliers;

pub use outliers::*;
