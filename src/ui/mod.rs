//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All console output goes through this module so verbosity is handled
//! in one place. Library code that needs to surface warnings takes a
//! [`output::Verbosity`] rather than printing directly.

pub mod output;
