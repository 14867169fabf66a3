//! Core types for tweetvec
//!
//! Tweet records and their wire formats, dataset parsing, agent personalities and the
//! process configuration shared by every other crate.

mod config;
pub mod constants;
mod dataset;
mod env_config;
mod error;
mod json_utils;
mod personality;
mod tweet;

pub use config::*;
pub use constants::*;
pub use dataset::*;
pub use error::*;
pub use json_utils::strip_code_fence;
pub use personality::*;
pub use tweet::*;
