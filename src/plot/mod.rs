//! Terminal plotting (fixed-grid ASCII).

pub mod ascii;

pub use ascii::*;
