//! metaconform - conformance harness for versioned binary metadata
//!
//! A blockchain runtime publishes its API as one compact binary blob whose
//! layout changed across many schema versions. metaconform proves that a
//! codec for that blob is lossless and complete, against golden fixtures
//! captured from real networks.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to the harness)
//! - [`harness`] - The four conformance components and their reports
//! - [`codec`] - Reference codec: wire format, legacy and latest shapes, conversion
//! - [`fixtures`] - Golden fixture storage and suite manifests
//! - [`core`] - Domain types, exemptions, configuration, paths
//! - [`ui`] - Output utilities
//!
//! # Correctness Invariants
//!
//! 1. Decode then re-encode reproduces the input byte for byte
//! 2. Each fixture runs on its own registry; no schema leaks between runs
//! 3. Golden fixtures are only written in reconcile mode
//! 4. Every non-exempt storage default decodes under strict validation

pub mod cli;
pub mod codec;
pub mod core;
pub mod fixtures;
pub mod harness;
pub mod ui;
