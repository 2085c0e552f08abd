//! Terminal rendering of a tagging session
//!
//! [`TerminalSink`] is the [`RenderSink`] used by the CLI. It prints what a
//! graphical client would draw and can mirror the current image to a file
//! so an external viewer can display it.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use colored::Colorize;
use image::ImageReader;

use crate::render::{ImageRef, Notice, RenderSink, Tone};
use crate::session::SessionState;
use crate::stats::StatsSummary;

/// Prints session output to stdout
#[derive(Debug, Default)]
pub struct TerminalSink {
    preview_path: Option<PathBuf>,
}

impl TerminalSink {
    /// Create a sink; `preview_path` receives the raw bytes of each image
    pub fn new(preview_path: Option<PathBuf>) -> Self {
        Self { preview_path }
    }

    fn write_preview(&self, path: &Path, image: &ImageRef) {
        if let Err(e) = std::fs::write(path, image.bytes()) {
            tracing::warn!("Failed to write preview to {}: {}", path.display(), e);
        }
    }
}

impl RenderSink for TerminalSink {
    fn show_image(&self, image: &ImageRef) {
        println!("\n{}", describe_image(image).bold());
        if let Some(path) = &self.preview_path {
            self.write_preview(path, image);
        }
    }

    fn show_stats(&self, summary: &StatsSummary) {
        for line in stats_lines(summary) {
            println!("{}", line);
        }
    }

    fn show_predicted(&self, category: Option<&str>) {
        if let Some(category) = category {
            println!("Predicted: {}", category.cyan());
        }
    }

    fn set_busy(&self, busy: bool) {
        tracing::debug!(busy, "Busy indicator");
    }

    fn notify(&self, notice: &Notice) {
        match notice.tone {
            Tone::Info => println!("{}", notice.message.green()),
            Tone::Warning => println!("{}", notice.message.yellow()),
            Tone::Error => eprintln!("{}", notice.message.red()),
        }
    }

    fn clear_image(&self) {
        if let Some(path) = &self.preview_path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("Failed to clear preview {}: {}", path.display(), e),
            }
        }
    }

    fn state_changed(&self, state: SessionState) {
        tracing::debug!(%state, "Session state changed");
    }
}

/// One-line description of an image: filename, MIME type and, when the
/// header can be read, pixel dimensions
///
/// Only the image header is parsed; pixel data is never decoded.
pub fn describe_image(image: &ImageRef) -> String {
    match image_dimensions(image.bytes()) {
        Ok((width, height)) => {
            format!(
                "{} ({}, {}x{})",
                image.filename(),
                image.content_type(),
                width,
                height
            )
        }
        Err(e) => {
            tracing::debug!("Could not read dimensions of {}: {}", image.filename(), e);
            format!("{} ({})", image.filename(), image.content_type())
        }
    }
}

fn image_dimensions(bytes: &[u8]) -> image::ImageResult<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?
        .into_dimensions()
}

/// Headline plus one `category: amount` line per labeled row
///
/// An empty summary renders as nothing.
pub fn stats_lines(summary: &StatsSummary) -> Vec<String> {
    if summary.is_empty() {
        return Vec::new();
    }
    let mut lines = Vec::with_capacity(summary.rows.len() + 1);
    lines.push(summary.headline());
    lines.extend(
        summary
            .rows
            .iter()
            .map(|row| format!("  {}: {}", row.category, row.amount)),
    );
    lines
}
