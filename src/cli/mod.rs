//! CLI module - argument parsing and the train/evaluate entry points

mod args;
pub mod evaluate;
pub mod train;

pub use args::Cli;
pub use evaluate::{run_evaluate, EvaluateOutcome};
pub use train::{run_train, TrainOutcome};

use crate::pipeline::DataSource;
use crate::utils::{print_info, print_warning};

/// Announce where the dataset came from, warning when a configured file was missing
fn print_data_source(source: &DataSource) {
    match source {
        DataSource::File(path) => print_info(&format!("Loading data from {}", path.display())),
        DataSource::Bundled { requested } => {
            if let Some(path) = requested {
                print_warning(&format!(
                    "Data file {} not found, falling back to the bundled dataset",
                    path.display()
                ));
            }
            print_info("Loading bundled Iris dataset");
        }
    }
}
