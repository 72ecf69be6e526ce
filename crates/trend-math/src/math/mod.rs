//! Core math modules.

pub mod decay;
pub mod divergence;
