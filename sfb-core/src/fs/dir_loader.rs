//! src/fs/dir_loader.rs
//! ============================================================================
//! # Directory Loader: Asynchronous Lazy Child Enumeration
//!
//! Pulls a directory capability's entry stream and produces the canonical
//! sibling order used everywhere in the tree: directories before files,
//! case-insensitive alphabetical within each kind.
//!
//! Entries are appended to the caller's destination vector as the host
//! yields them, not into a separate buffer, so a mid-stream failure leaves
//! the partial, unsorted prefix in place for the caller to keep. Sorting
//! happens only after the stream finishes cleanly.

use crate::error::AppError;
use crate::fs::capability::{DirectoryHandle, EntryStream, RawEntry};
use std::cmp::Ordering;
use tracing::{debug, trace};

/// Enumerates the immediate children of `dir` into `dest`.
///
/// On success `dest` holds the complete child list in canonical order. On
/// failure `dest` holds whatever entries arrived before the error, in host
/// order, and the returned [`AppError::Io`] is tagged with the directory
/// name.
pub async fn enumerate(
    dir: &dyn DirectoryHandle,
    show_hidden: bool,
    dest: &mut Vec<RawEntry>,
) -> Result<(), AppError> {
    let mut stream: Box<dyn EntryStream> = dir
        .begin_enumerate()
        .await
        .map_err(|e: std::io::Error| AppError::enumerate_failed(dir.name(), e))?;

    loop {
        match stream.next_entry().await {
            Ok(Some(entry)) => {
                if !show_hidden && entry.name.starts_with('.') {
                    trace!("Skipping hidden entry: {}", entry.name);
                    continue;
                }

                dest.push(entry);
            }

            Ok(None) => break,

            Err(e) => {
                debug!(
                    "Enumeration of \"{}\" failed after {} entries: {}",
                    dir.name(),
                    dest.len(),
                    e
                );

                return Err(AppError::enumerate_failed(dir.name(), e));
            }
        }
    }

    sort_entries(dest);

    trace!("Enumerated {} entries in \"{}\"", dest.len(), dir.name());

    Ok(())
}

/// Sorts siblings in place: directories first, then alphabetically by name.
pub fn sort_entries(entries: &mut [RawEntry]) {
    entries.sort_by(compare_entries);
}

/// Canonical sibling order.
#[must_use]
pub fn compare_entries(a: &RawEntry, b: &RawEntry) -> Ordering {
    if a.is_dir() && !b.is_dir() {
        Ordering::Less
    } else if !a.is_dir() && b.is_dir() {
        Ordering::Greater
    } else {
        compare_names(&a.name, &b.name)
    }
}

// Case-insensitive comparison with a stable raw tiebreak; the portable
// stand-in for the host's locale-aware collation.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
