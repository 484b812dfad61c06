#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub use gale_core::*;

pub use gale_macros::Shaped;
