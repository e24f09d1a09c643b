//! # Library Crate Root
//!
//! Client library for the TDX stock-quote protocol family: a typed facade
//! over the standard and extended market endpoints, server pool probing,
//! and an on-disk frame cache. The `cli` feature adds the `mootdx` binary
//! surface on top.

pub mod core;
pub mod utils;

#[cfg(feature = "cli")]
pub mod cli;
