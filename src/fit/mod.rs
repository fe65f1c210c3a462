//! Polynomial fitting.
//!
//! Responsibilities:
//!
//! - parse point lists given on the command line
//! - reject degenerate point sets (too few points, duplicate x)
//! - solve the interpolation system and normalize the coefficients

pub mod fitter;

pub use fitter::*;
