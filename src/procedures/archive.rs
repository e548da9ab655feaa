//! Any→ZIP: a single-entry archive holding the untouched input bytes.

use crate::error::ConvertError;
use std::io::{Cursor, Write};
use std::path::Path;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archive `input` under `entry_name`.
pub fn zip_original(input: &Path, entry_name: &str) -> Result<Vec<u8>, ConvertError> {
    let data = std::fs::read(input).map_err(|e| ConvertError::io(input, e))?;

    let mut buf = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buf));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(data.len() as u64 >= u32::MAX as u64);
        zip.start_file(entry_name, options)?;
        zip.write_all(&data)
            .map_err(|e| ConvertError::io(input, e))?;
        zip.finish()?;
    }

    debug!(
        "Archived {} bytes as '{}' → {} bytes",
        data.len(),
        entry_name,
        buf.len()
    );
    Ok(buf)
}
