//! File formats for command input and output
//!
//! Every file the CLI reads or writes is CSV:
//! - Stale-device export (written by `export-stale`, read back by `remove`)
//! - Device list for key export (read by `export-keys --input`)
//! - Recovery-key export (written by `export-keys`)

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{CliError, CliResult};

pub mod csv;

/// Opens an input file, failing with a precondition error if it is absent.
pub fn open_input(path: &Path) -> CliResult<BufReader<File>> {
    if !path.is_file() {
        return Err(CliError::InputNotFound(path.to_path_buf()));
    }
    Ok(BufReader::new(File::open(path)?))
}

/// Creates (or truncates) an output file behind a buffer.
///
/// The caller flushes by dropping the writer after the last row.
pub fn create_output(path: &Path) -> CliResult<BufWriter<File>> {
    let file = File::create(path)
        .map_err(|e| CliError::Io(format!("Cannot create '{}': {}", path.display(), e)))?;
    Ok(BufWriter::new(file))
}

/// Writes `bytes` to `path` in one go.
pub fn write_output(path: &Path, bytes: &[u8]) -> CliResult<()> {
    let mut out = create_output(path)?;
    out.write_all(bytes)?;
    out.flush()?;
    Ok(())
}
