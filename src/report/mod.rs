//! Report module - metrics, JSON exports, confusion plot and terminal summaries

pub mod confusion_plot;
pub mod export;
pub mod metrics;
pub mod summary;

pub use confusion_plot::*;
pub use export::*;
pub use metrics::*;
pub use summary::*;
