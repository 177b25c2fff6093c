//! # slidehub-automation
//!
//! Adapters for the external document automation host. The
//! [`DocumentAutomation`](slidehub_core::traits::DocumentAutomation)
//! trait is defined in `slidehub-core`; this crate provides the
//! child-process adapter used in production and a scripted in-memory
//! fake used by tests.

pub mod fake;
pub mod process;

pub use fake::{FakeAutomation, FakeSlide};
pub use process::ProcessAutomation;
