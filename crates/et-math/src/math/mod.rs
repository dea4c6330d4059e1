//! Core math modules.

pub mod radix;
