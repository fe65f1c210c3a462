//! Time-based progress with a curve-driven velocity.
//!
//! - `clock`: time sources (wall clock, manual clock for tests/simulation)
//! - `controller`: the play/pause/restart state machine
//! - `driver`: samples the curve and feeds the speed factor back

pub mod clock;
pub mod controller;
pub mod driver;

pub use clock::*;
pub use controller::*;
pub use driver::*;
