//! Domain types shared by every coursecraft crate.
//!
//! Nothing in here performs I/O: form validation, generated-material
//! sections, the generation job record and its state machine, and
//! subscription tiers.

pub mod course;
pub mod error;
pub mod job;
pub mod materials;
pub mod roles;
pub mod tier;
pub mod types;
