//! core
//!
//! Ambient services shared by the CLI and git layers.
//!
//! # Modules
//!
//! - [`config`] - Configuration schema and loading
//! - [`env`] - Environment access, injectable for tests
//! - [`text`] - Message lookup table

pub mod config;
pub mod env;
pub mod text;
