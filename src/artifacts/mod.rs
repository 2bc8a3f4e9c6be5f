//! Artifacts module - persistence of the fitted pipeline

mod store;

pub use store::*;
