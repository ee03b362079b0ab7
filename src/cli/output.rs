//! Output formatting for CLI commands

use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints structured data; text mode falls back to pretty JSON
    pub fn data<T: Serialize>(&self, data: &T) {
        let json = match self.format {
            OutputFormat::Text => serde_json::to_string_pretty(data),
            OutputFormat::Json => serde_json::to_string(data),
        };
        if let Ok(json) = json {
            println!("{}", json);
        }
    }

    /// Prints one line of a listing (text only)
    pub fn line(&self, text: &str) {
        if self.is_text() {
            println!("{}", text);
        }
    }

    /// Prints a table row (text only)
    pub fn row(&self, columns: &[&str]) {
        if self.is_text() {
            println!("{}", columns.join("\t"));
        }
    }

    /// Prints the header of a workflow step, preceded by a blank line
    pub fn step(&self, header: &str) {
        if self.is_text() {
            println!();
            println!("{}", header);
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    pub fn is_text(&self) -> bool {
        self.format == OutputFormat::Text
    }
}
