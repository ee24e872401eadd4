//! Shared types and utilities for the sellhub client and its tooling.

pub mod currency;
pub mod error;
pub mod models;

pub use error::*;
pub use models::*;
