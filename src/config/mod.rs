//! Config module - resolves the YAML training configuration into settings

mod settings;

pub use settings::*;
