//! Trait definitions implemented by other SlideHub crates.

pub mod automation;

pub use automation::{
    BoundingBox, DocumentAutomation, DocumentHandle, ShapeInfo, SlideRef, SlideText,
};
