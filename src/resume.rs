//! Picks the index new files start numbering from, so that downloading into
//! a directory a second time never overwrites what is already there.
//!
//! The index is nothing more than the number of entries in the destination
//! directory. Deleting or renaming files between runs, or putting unrelated
//! files in the directory, shifts it.

use std::path::Path;

use fs_err as fs;
use log::{debug, trace};

/// Makes sure `destination` exists and returns the number of entries already
/// in it.
///
/// A directory that exists but cannot be listed counts as empty. Failing to
/// create a missing directory is an error.
pub fn prepare(destination: &Path) -> std::io::Result<usize> {
    if destination.exists() {
        let start_index = match fs::read_dir(destination) {
            Ok(entries) => entries.filter(|entry| entry.is_ok()).count(),
            Err(err) => {
                debug!("could not list {}, starting from 0: {}", destination.display(), err);
                0
            }
        };

        trace!(
            "{} already holds {} entries",
            destination.display(),
            start_index
        );

        Ok(start_index)
    } else {
        debug!("creating {}", destination.display());
        fs::create_dir_all(destination)?;

        Ok(0)
    }
}
