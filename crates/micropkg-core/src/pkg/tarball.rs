//! Tarball download and decoding.

use super::assemble::{ArchiveDecoder, ArchiveEvent, EntryId, EntryKind};
use super::error::AnalyzeError;
use bytes::Bytes;
use flate2::read::GzDecoder;
use reqwest::Client;
use std::io::{self, Read};
use tar::{Archive, EntryType};

/// Maximum tarball size (200 MB).
pub const MAX_TARBALL_SIZE: u64 = 200 * 1024 * 1024;

/// Size of the data chunks emitted per file entry.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Download a tarball from a URL.
///
/// # Errors
/// Returns a retrieval error if the download fails or exceeds the size limit.
pub async fn download_tarball(
    client: &Client,
    url: &str,
    max_bytes: u64,
) -> Result<Bytes, AnalyzeError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AnalyzeError::retrieval(format!("Failed to download '{url}': {e}")))?;

    if !response.status().is_success() {
        return Err(AnalyzeError::retrieval(format!(
            "Download failed with status {} for '{url}'",
            response.status()
        )));
    }

    if let Some(len) = response.content_length() {
        if len > max_bytes {
            return Err(AnalyzeError::retrieval(format!(
                "Tarball too large: {len} bytes (max: {max_bytes})"
            )));
        }
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AnalyzeError::retrieval(format!("Failed to read response body: {e}")))?;

    if bytes.len() as u64 > max_bytes {
        return Err(AnalyzeError::retrieval(format!(
            "Tarball too large: {} bytes (max: {max_bytes})",
            bytes.len()
        )));
    }

    Ok(bytes)
}

/// Decoder for gzip-compressed tar archives (`.tgz`).
///
/// Entry ids are assigned in archive order; file data is emitted in chunks of
/// at most [`CHUNK_SIZE`] bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarGzDecoder;

impl ArchiveDecoder for TarGzDecoder {
    fn decode(
        &self,
        archive: &[u8],
        on_event: &mut dyn FnMut(ArchiveEvent) -> Result<(), AnalyzeError>,
    ) -> Result<(), AnalyzeError> {
        let gz = GzDecoder::new(archive);
        let mut archive = Archive::new(gz);
        let mut buf = vec![0u8; CHUNK_SIZE];

        let entries = archive
            .entries()
            .map_err(|e| AnalyzeError::extraction(format!("Failed to read tarball entries: {e}")))?;

        for (index, entry) in (0u64..).zip(entries) {
            let mut entry = entry
                .map_err(|e| AnalyzeError::extraction(format!("Failed to read tarball entry: {e}")))?;

            let id = EntryId(index);
            let path = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
            let kind = entry_kind(entry.header().entry_type());

            on_event(ArchiveEvent::EntryStart {
                id,
                path: path.clone(),
                kind,
            })?;

            if kind == EntryKind::File {
                loop {
                    let n = entry.read(&mut buf).map_err(|e| {
                        AnalyzeError::extraction(format!("Failed to read '{path}': {e}"))
                    })?;
                    if n == 0 {
                        break;
                    }
                    on_event(ArchiveEvent::Chunk {
                        id,
                        data: Bytes::copy_from_slice(&buf[..n]),
                    })?;
                }
            }

            on_event(ArchiveEvent::EntryEnd { id })?;
        }

        // The tar reader stops at the end-of-archive blocks; drain the rest
        // so the gzip trailer (CRC32 and length) is verified.
        io::copy(&mut archive.into_inner(), &mut io::sink())
            .map_err(|e| AnalyzeError::extraction(format!("Truncated or corrupt tarball: {e}")))?;

        Ok(())
    }
}

fn entry_kind(ty: EntryType) -> EntryKind {
    if ty.is_file() {
        EntryKind::File
    } else if ty.is_dir() {
        EntryKind::Directory
    } else if ty.is_symlink() || ty.is_hard_link() {
        EntryKind::Symlink
    } else {
        EntryKind::Other
    }
}
