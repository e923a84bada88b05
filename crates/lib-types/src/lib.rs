//! # lib-types
//!
//! Core type definitions shared by the IBIS/IBIS-AMI parsers and their
//! consumers.
//!
//! This crate provides:
//! - AMI parameter values and the flattened parameter mapping handed to
//!   `AMI_Init`
//! - Per-call initialization data, merged from defaults and overrides
//! - Physical units with compile-time safety

pub mod units;
pub mod ami;
pub mod init;

pub use units::*;
pub use ami::*;
pub use init::*;
