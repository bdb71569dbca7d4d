use crate::error::Result;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

pub struct OutputManager {
    format: OutputFormat,
    colored: bool,
    quiet: bool,
    term: Term,
}

impl OutputManager {
    pub fn new(format: OutputFormat, colored: bool) -> Self {
        Self {
            format,
            colored,
            quiet: false,
            term: Term::stdout(),
        }
    }

    /// Suppress informational lines; warnings, errors and JSON still print
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Human-readable lines are skipped in JSON mode so stdout stays parseable
    fn human(&self) -> bool {
        !self.is_json() && !self.quiet
    }

    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    pub fn print_header(&self, title: &str) -> Result<()> {
        if !self.human() {
            return Ok(());
        }
        println!();
        if self.colored {
            println!("{}", style(title).bold().underlined());
        } else {
            println!("{}", title);
            println!("{}", "-".repeat(title.chars().count()));
        }
        Ok(())
    }

    pub fn print_key_value(&self, key: &str, value: &str) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let mut map = BTreeMap::new();
                map.insert(key, value);
                println!("{}", serde_json::to_string_pretty(&map)?);
            }
            OutputFormat::Table => {
                if self.quiet {
                    return Ok(());
                }
                if self.colored {
                    println!("{}: {}", style(key).bold().blue(), style(value).green());
                } else {
                    println!("{}: {}", key, value);
                }
            }
        }
        Ok(())
    }

    pub fn print_list_item(&self, item: &str) -> Result<()> {
        if self.human() {
            println!("  • {}", item);
        }
        Ok(())
    }

    pub fn print_hint(&self, hint: &str) -> Result<()> {
        if !self.human() {
            return Ok(());
        }
        if self.colored {
            println!("     {}", style(hint).dim());
        } else {
            println!("     {}", hint);
        }
        Ok(())
    }

    pub fn print_success(&self, message: &str) -> Result<()> {
        if !self.human() {
            return Ok(());
        }
        if self.colored {
            println!("{} {}", style("✓").green().bold(), message);
        } else {
            println!("✓ {}", message);
        }
        Ok(())
    }

    pub fn print_warning(&self, message: &str) -> Result<()> {
        if self.is_json() {
            return Ok(());
        }
        if self.colored {
            println!("{} {}", style("⚠").yellow().bold(), message);
        } else {
            println!("⚠ {}", message);
        }
        Ok(())
    }

    /// Failed check line, printed to stdout alongside the passing ones
    pub fn print_failure(&self, message: &str) -> Result<()> {
        if self.is_json() {
            return Ok(());
        }
        if self.colored {
            println!("{} {}", style("✗").red().bold(), message);
        } else {
            println!("✗ {}", message);
        }
        Ok(())
    }

    pub fn print_info(&self, message: &str) -> Result<()> {
        if !self.human() {
            return Ok(());
        }
        if self.colored {
            println!("{} {}", style("ℹ").blue().bold(), message);
        } else {
            println!("ℹ {}", message);
        }
        Ok(())
    }

    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        if !self.human() || !self.term.is_term() {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.green} {msg}")
        {
            pb.set_style(spinner_style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_json_mode_detection() {
        assert!(OutputManager::new(OutputFormat::Json, false).is_json());
        assert!(!OutputManager::new(OutputFormat::Table, true).is_json());
    }
}
