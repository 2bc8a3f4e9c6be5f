//! Terminal styling utilities for step-by-step progress output

use console::{style, Emoji};
use std::path::Path;

use crate::config::Settings;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static GEAR: Emoji<'_, '_> = Emoji("⚙️  ", "");

/// Print the application banner for a given entry point
pub fn print_banner(command: &str, version: &str) {
    println!();
    println!(
        "    {} {}",
        style("pipefit").cyan().bold(),
        style(command).magenta().bold()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
}

/// Print configuration card
pub fn print_config(config_path: &Path, settings: &Settings) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    let data = settings
        .paths
        .data_path
        .as_ref()
        .map(|p| truncate_path(p, 36))
        .unwrap_or_else(|| "(bundled)".to_string());

    println!();
    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Config:    {:<36}│",
        GEAR,
        truncate_path(config_path, 36)
    );
    println!("    │  {} Data:      {:<36}│", FOLDER, data);
    println!(
        "    │  {} Artifacts: {:<36}│",
        SAVE,
        truncate_path(&settings.paths.artifacts_path, 36)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  Test size:      {:<36}│",
        style(format!("{:.2}", settings.data.test_size)).yellow()
    );
    println!(
        "    │  Random state:   {:<36}│",
        style(settings.data.random_state).yellow()
    );
    println!(
        "    │  Clip outliers:  {:<36}│",
        style(settings.preprocessing.clip_outliers).yellow()
    );
    println!(
        "    │  Max iter:       {:<36}│",
        style(settings.model.max_iter).yellow()
    );
    println!("    └{}┘", line);
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("    {} {}", WARN, style(message).yellow());
}

/// Print a labelled value on its own indented line
pub fn print_value(label: &str, value: impl std::fmt::Display) {
    println!("      {}: {}", label, style(value).yellow().bold());
}

/// Print the final completion message
pub fn print_completion(message: &str) {
    println!();
    println!("    {} {}", ROCKET, style(message).green().bold());
    println!();
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let tail: String = s
            .chars()
            .rev()
            .take(max_len - 3)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_strings() {
        assert_eq!(truncate_string("artifacts/", 36), "artifacts/");
    }

    #[test]
    fn test_truncate_keeps_tail() {
        let truncated = truncate_string("a/very/long/path/to/model.bin", 12);
        assert_eq!(truncated.chars().count(), 12);
        assert!(truncated.starts_with("..."));
        assert!(truncated.ends_with("model.bin"));
    }
}
