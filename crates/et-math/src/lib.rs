//! Eurostat tables math utilities.

pub mod math;

pub use math::radix::*;
