use atomic_write_file::AtomicWriteFile;
use polars::prelude::*;
use std::path::Path;

use super::error::{PreprocessError, Result};

/// Load a headered CSV file into a frame.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(PreprocessError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("input file not found: {}", path.display()),
        )));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    tracing::debug!(path = %path.display(), rows = df.height(), columns = df.width(), "Loaded CSV");
    Ok(df)
}

/// Write a frame as CSV. The target is replaced atomically, so a failed
/// write never leaves a truncated file behind.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    file.commit()?;

    tracing::debug!(path = %path.display(), rows = df.height(), "Wrote CSV");
    Ok(())
}
