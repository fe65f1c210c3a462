//! Domain types used throughout the editor.
//!
//! This module defines:
//!
//! - control points and the baseline seed (`ControlPoint`, `BASELINE_POINTS`)
//! - fit outputs (`Coefficients`, `CurveSnapshot`) and the `Curve` trait
//! - configuration (`PaceConfig`, `SocketStrategy`, `DragModel`)
//! - the progress lifecycle (`Phase`)

pub mod types;

pub use types::*;
