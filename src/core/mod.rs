//! core
//!
//! Core domain types and configuration for metaconform.
//!
//! # Modules
//!
//! - [`types`] - Strong types: FixtureName, Fingerprint
//! - [`naming`] - Identifier casing for locations
//! - [`exemption`] - Storage locations and exemption matching
//! - [`check`] - The input of one fixture run
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Centralized path routing for fixture storage
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - Nothing here reads process state except config loading

pub mod check;
pub mod config;
pub mod exemption;
pub mod naming;
pub mod paths;
pub mod types;
