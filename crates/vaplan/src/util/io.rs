//! I/O utility functions

use std::fs;
use std::io;
use std::path::Path;

/// Write a report atomically using the write-then-rename pattern, so a
/// reader never sees a half-written file.
pub fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}
