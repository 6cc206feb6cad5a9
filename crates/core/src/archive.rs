//! In-memory zip packaging of downloaded result assets.
//!
//! Entries are numbered sequentially over the assets actually passed in,
//! so a batch with a failed download still produces `output_file_1.png ..
//! output_file_k.png` with no gaps. Nothing is written to disk.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::CoreError;
use crate::status::ResultAsset;

/// File name offered to the browser for the archive download.
pub const ARCHIVE_FILE_NAME: &str = "output_files.zip";
/// MIME type of the archive download.
pub const ARCHIVE_CONTENT_TYPE: &str = "application/zip";

/// Name of the `position`-th entry (1-based).
pub fn entry_name(position: usize) -> String {
    format!("output_file_{position}.png")
}

/// One file inside a [`ResultArchive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub source_url: String,
    pub size_bytes: usize,
}

/// A finished zip bundle plus a listing of what went into it.
#[derive(Debug, Clone)]
pub struct ResultArchive {
    entries: Vec<ArchiveEntry>,
    bytes: Vec<u8>,
}

impl ResultArchive {
    /// Package `assets` in order. An empty slice yields a valid, empty zip.
    pub fn from_assets(assets: &[ResultAsset]) -> Result<Self, CoreError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        let mut entries = Vec::with_capacity(assets.len());

        for (index, asset) in assets.iter().enumerate() {
            let name = entry_name(index + 1);
            writer.start_file(name.as_str(), options)?;
            writer
                .write_all(&asset.bytes)
                .map_err(|e| CoreError::Archive(format!("Failed to write {name}: {e}")))?;
            entries.push(ArchiveEntry {
                name,
                source_url: asset.url.clone(),
                size_bytes: asset.bytes.len(),
            });
        }

        let bytes = writer.finish()?.into_inner();
        Ok(Self { entries, bytes })
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw zip bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
