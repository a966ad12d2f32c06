//! co2calc CLI library.
//!
//! Output formatting for estimates, distances, and the factor table.

pub mod output;
