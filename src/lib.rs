//! `curve-pace` library crate.
//!
//! The binary (`pace`) is a thin wrapper around this library so that:
//!
//! - the fitter, point store and progress controller are testable without a terminal
//! - headless front-ends (`fit`, `simulate`) share code with the interactive editor
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod math;
pub mod plot;
pub mod progress;
pub mod report;
pub mod store;
pub mod tui;
