//! Output path resolution and image persistence.
//!
//! A caller-supplied `output_path` is either a file path used as-is, or a
//! directory into which a file name derived from the prompt is placed.

use chrono::{DateTime, Utc};
use dalle_mcp_common::error::Error;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix of synthesized file names.
pub const FILENAME_PREFIX: &str = "dalle3";

/// Extension of synthesized file names.
pub const FILENAME_EXTENSION: &str = "png";

/// Maximum length of the prompt slug in synthesized file names.
pub const MAX_SLUG_LENGTH: usize = 50;

/// Derive a filesystem-safe slug from a prompt.
///
/// Lowercases the prompt, collapses every run of characters outside
/// `[a-z0-9]` into a single `-`, trims leading and trailing `-`, then
/// truncates to [`MAX_SLUG_LENGTH`] characters.
pub fn prompt_slug(prompt: &str) -> String {
    let mut slug = String::with_capacity(prompt.len());
    let mut pending_separator = false;

    for c in prompt.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }

    // Only ASCII remains, so byte truncation is char truncation.
    slug.truncate(MAX_SLUG_LENGTH);
    slug
}

/// Format a timestamp for file names: ISO-8601 UTC with `:` and `.` as `-`.
///
/// `2026-10-16T09:41:07.123Z` becomes `2026-10-16T09-41-07-123Z`.
pub fn filename_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string()
}

/// Build the synthesized file name for a prompt at a given instant.
pub fn output_filename(prompt: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}-{}-{}.{}",
        FILENAME_PREFIX,
        prompt_slug(prompt),
        filename_timestamp(now),
        FILENAME_EXTENSION
    )
}

/// Whether `output_path` should be treated as a directory.
///
/// True if it names an existing directory or ends with a path separator.
pub async fn is_directory_target(output_path: &str) -> bool {
    if output_path.ends_with('/') || output_path.ends_with('\\') {
        return true;
    }

    tokio::fs::metadata(output_path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

/// Resolve the final file path for a generated image.
pub async fn resolve_output_path(output_path: &str, prompt: &str, now: DateTime<Utc>) -> PathBuf {
    if is_directory_target(output_path).await {
        let path = Path::new(output_path).join(output_filename(prompt, now));
        debug!(path = %path.display(), "Synthesized file name for directory target");
        path
    } else {
        PathBuf::from(output_path)
    }
}

/// Write image bytes to `path`, creating missing parent directories.
///
/// Any existing file at `path` is overwritten.
pub async fn save_image(path: &Path, data: &[u8]) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    tokio::fs::write(path, data).await?;
    debug!(path = %path.display(), bytes = data.len(), "Wrote image file");
    Ok(())
}

/// Size in kilobytes, rounded to the nearest whole number.
pub fn size_in_kb(bytes: usize) -> u64 {
    (bytes as f64 / 1024.0).round() as u64
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Slugs only ever contain `[a-z0-9-]` and respect the length cap.
        #[test]
        fn slug_charset_and_length(prompt in "\\PC{0,200}") {
            let slug = prompt_slug(&prompt);
            prop_assert!(slug.len() <= MAX_SLUG_LENGTH);
            prop_assert!(
                slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "Unexpected character in slug '{}'",
                slug
            );
        }

        /// Separators never lead and never repeat.
        #[test]
        fn slug_separators_collapsed(prompt in "[A-Za-z0-9 ,.!?_-]{0,120}") {
            let slug = prompt_slug(&prompt);
            prop_assert!(!slug.starts_with('-'), "Leading separator in '{}'", slug);
            prop_assert!(!slug.contains("--"), "Doubled separator in '{}'", slug);
        }

        /// Short prompts never end with a separator since nothing is truncated.
        #[test]
        fn slug_untruncated_has_no_trailing_separator(prompt in "[A-Za-z0-9 ]{0,40}") {
            let slug = prompt_slug(&prompt);
            prop_assert!(!slug.ends_with('-'), "Trailing separator in '{}'", slug);
        }
    }
}
