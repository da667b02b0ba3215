//! Chunked ingest: stream a request body to scratch storage while hashing it.

use super::types::IngestedFile;
use audiovault_core::constants::SIZE_LIMIT_MESSAGE;
use audiovault_core::AppError;
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

/// Copy `reader` into a new scratch file under `scratch_dir` in `chunk_size` pieces.
///
/// Every chunk is written and fed to a SHA-256 accumulator. As soon as the running total
/// passes `max_size` the partial file is removed and `PayloadTooLarge` is returned.
#[tracing::instrument(skip(reader), fields(upload.bytes = tracing::field::Empty))]
pub async fn ingest<R>(
    mut reader: R,
    scratch_dir: &Path,
    filename: &str,
    max_size: u64,
    chunk_size: usize,
) -> Result<IngestedFile, AppError>
where
    R: AsyncRead + Unpin,
{
    let prefix = format!("{}_", Uuid::new_v4());
    let scratch = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(filename)
        .rand_bytes(0)
        .tempfile_in(scratch_dir)
        .map_err(|e| AppError::Internal(format!("Failed to create scratch file: {}", e)))?;
    let (file, path) = scratch.into_parts();
    let mut file = tokio::fs::File::from_std(file);

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut total: u64 = 0;

    loop {
        let read = fill_chunk(&mut reader, &mut buffer).await.map_err(|e| {
            AppError::BadRequest(format!("Failed to read upload stream: {}", e))
        })?;
        if read == 0 {
            break;
        }

        total += read as u64;
        if total > max_size {
            drop(file);
            let path_display = path.display().to_string();
            if let Err(e) = path.close() {
                tracing::warn!(path = %path_display, error = %e, "Failed to remove partial upload");
            }
            tracing::info!(max_size, "Upload exceeded size cap, partial data discarded");
            return Err(AppError::PayloadTooLarge(SIZE_LIMIT_MESSAGE.to_string()));
        }

        hasher.update(&buffer[..read]);
        file.write_all(&buffer[..read])
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write scratch file: {}", e)))?;
    }

    file.flush()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to flush scratch file: {}", e)))?;

    tracing::Span::current().record("upload.bytes", total);

    Ok(IngestedFile {
        path,
        digest: hex::encode(hasher.finalize()),
        size: total,
    })
}

/// Read until `buffer` is full or the stream ends. Returns the number of bytes read.
async fn fill_chunk<R>(reader: &mut R, buffer: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buffer.len() {
        let n = reader.read(&mut buffer[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
