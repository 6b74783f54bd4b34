//! Infrastructure layer.
//!
//! Technical concerns that support the engine without containing scoring
//! or badge rules.
//!
//! # Submodules
//!
//! - [`config`] - Configuration loading, validation and logging setup
pub mod config;
