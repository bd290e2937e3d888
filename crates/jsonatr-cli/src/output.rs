//! Output formatting and writing utilities
//!
//! Results (transformed documents, listings) go to the output stream;
//! status messages go to the status stream so piping stdout into another
//! tool never picks them up.
//!
//! Copyright (c) 2025 Jsonatr Team
//! Licensed under the Apache-2.0 license

use crate::error::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};
use tracing::trace;

/// JSON layout for written documents
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JsonStyle {
    Pretty,
    Compact,
}

impl JsonStyle {
    /// Pick the style from the config default and a `--compact` flag
    pub fn from_flags(pretty_by_default: bool, compact: bool) -> Self {
        if compact || !pretty_by_default {
            JsonStyle::Compact
        } else {
            JsonStyle::Pretty
        }
    }

    /// Serialize `value` in this style
    pub fn render<T: Serialize>(self, value: &T) -> Result<String> {
        Ok(match self {
            JsonStyle::Pretty => serde_json::to_string_pretty(value)?,
            JsonStyle::Compact => serde_json::to_string(value)?,
        })
    }
}

/// Output writer that separates results from status messages
pub struct OutputWriter {
    use_color: bool,
    quiet: bool,
    verbose: u8,
    out: Box<dyn Write>,
    status: Box<dyn Write>,
}

impl OutputWriter {
    /// Results on stdout, status on stderr
    pub fn new(use_color: bool, quiet: bool, verbose: u8) -> Self {
        Self::with_writers(
            use_color,
            quiet,
            verbose,
            Box::new(io::stdout()),
            Box::new(io::stderr()),
        )
    }

    /// Create an output writer with custom streams
    pub fn with_writers(
        use_color: bool,
        quiet: bool,
        verbose: u8,
        out: Box<dyn Write>,
        status: Box<dyn Write>,
    ) -> Self {
        Self {
            use_color,
            quiet,
            verbose,
            out,
            status,
        }
    }

    /// Write a line to the output stream
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.out, "{}", content)?;
        self.out.flush()?;
        Ok(())
    }

    /// Write pre-rendered bytes to the output stream unchanged
    pub fn write_all(&mut self, content: &[u8]) -> Result<()> {
        self.out.write_all(content)?;
        self.out.flush()?;
        Ok(())
    }

    /// Write a serializable value as JSON to the output stream
    pub fn json<T: Serialize>(&mut self, value: &T, style: JsonStyle) -> Result<()> {
        let rendered = style.render(value)?;
        trace!(bytes = rendered.len(), "Writing JSON output");
        self.writeln(&rendered)
    }

    fn status_line(&mut self, content: &str) -> Result<()> {
        writeln!(self.status, "{}", content)?;
        self.status.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.verbose == 0 {
            return Ok(());
        }

        if self.use_color {
            self.status_line(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.status_line(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_color {
            self.status_line(&message.green().to_string())
        } else {
            self.status_line(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.use_color {
            self.status_line(&message.yellow().to_string())
        } else {
            self.status_line(&format!("WARNING: {}", message))
        }
    }

    /// Write a section header to the output stream
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write a table to the output stream
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        // Calculate column widths
        let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let header_row = pad_row(headers.iter().map(|h| h.to_string()), &widths);
        if self.use_color {
            self.writeln(&header_row.bold().to_string())?;
        } else {
            self.writeln(&header_row)?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let line = pad_row(row.into_iter(), &widths);
            self.writeln(&line)?;
        }

        Ok(())
    }
}

fn pad_row(cells: impl Iterator<Item = String>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .enumerate()
        .map(|(i, cell)| match widths.get(i) {
            Some(&width) => format!("{:width$}", cell, width = width),
            None => cell,
        })
        .collect();
    padded.join(" │ ").trim_end().to_string()
}

#[cfg(test)]
mod tests;
