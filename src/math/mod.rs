//! Mathematical utilities: elimination solver and polynomial helpers.

pub mod gauss;
pub mod poly;

pub use gauss::*;
pub use poly::*;
