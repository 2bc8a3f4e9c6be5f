//! Pipeline module - data loading, preprocessing stages and the classifier

pub mod assembly;
pub mod bundled;
pub mod dataset;
pub mod loader;
pub mod model;
pub mod preprocessing;
pub mod split;

pub use assembly::*;
pub use bundled::*;
pub use dataset::*;
pub use loader::*;
pub use model::*;
pub use preprocessing::*;
pub use split::*;
