//! Core domain types and utilities for the keyhole authentication gateway.
//!
//! This crate provides the foundational types and error handling shared by
//! the token, access and server crates.

pub mod error;
pub mod provider;

pub use error::Result;
pub use provider::{ParseProviderError, Provider};
