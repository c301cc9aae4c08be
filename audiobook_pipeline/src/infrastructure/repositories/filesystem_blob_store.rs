// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Filesystem adapter for the `BlobStore` contract (spec §4.2): every path
//! is a relative key rooted under one directory, written atomically via a
//! temp-file-then-rename so a reader never observes a half-written blob.

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt, SeekFrom};

use audiobook_pipeline_domain::{BlobStat, BlobStore, ByteChunk, DomainError};

/// Bytes read per chunk when streaming a range (spec §4.2: "streams without
/// buffering the whole blob").
const RANGE_READ_CHUNK_SIZE: usize = 64 * 1024;

pub struct FilesystemBlobStore {
    root: PathBuf,
}

impl FilesystemBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves a blob key to an absolute path, rejecting anything that
    /// would escape `root` (keys are server-generated but this is cheap
    /// insurance matching the bootstrap CLI's own path validation).
    fn resolve(&self, path: &str) -> Result<PathBuf, DomainError> {
        if path.contains("..") {
            return Err(DomainError::Validation(format!("blob path must not contain '..': {path}")));
        }
        Ok(self.root.join(path))
    }

    async fn ensure_parent_dir(path: &Path) -> Result<(), DomainError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Transient(format!("blob store: creating directory: {e}")))?;
        }
        Ok(())
    }
}

fn map_io_err(path: &str, err: std::io::Error) -> DomainError {
    if err.kind() == std::io::ErrorKind::NotFound {
        DomainError::NotFound(format!("blob not found: {path}"))
    } else {
        DomainError::Transient(format!("blob store io error on {path}: {err}"))
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<(), DomainError> {
        let dest = self.resolve(path)?;
        Self::ensure_parent_dir(&dest).await?;

        let tmp_path = dest.with_extension(format!(
            "tmp-{}",
            ulid::Ulid::new()
        ));
        {
            let mut file = tokio::fs::File::create(&tmp_path)
                .await
                .map_err(|e| map_io_err(path, e))?;
            file.write_all(&bytes).await.map_err(|e| map_io_err(path, e))?;
            file.sync_all().await.map_err(|e| map_io_err(path, e))?;
        }
        tokio::fs::rename(&tmp_path, &dest).await.map_err(|e| map_io_err(path, e))?;
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, DomainError> {
        let full = self.resolve(path)?;
        tokio::fs::read(&full).await.map_err(|e| map_io_err(path, e))
    }

    async fn open_range(&self, path: &str, offset: u64, length: u64) -> Result<BoxStream<'static, ByteChunk>, DomainError> {
        let full = self.resolve(path)?;
        let mut file = tokio::fs::File::open(&full).await.map_err(|e| map_io_err(path, e))?;
        file.seek(SeekFrom::Start(offset)).await.map_err(|e| map_io_err(path, e))?;

        let path_for_errors = path.to_string();
        let stream = stream::unfold((file, length), move |(mut file, remaining)| {
            let path_for_errors = path_for_errors.clone();
            async move {
                if remaining == 0 {
                    return None;
                }
                let to_read = remaining.min(RANGE_READ_CHUNK_SIZE as u64) as usize;
                let mut buf = vec![0u8; to_read];
                match file.read(&mut buf).await {
                    Ok(0) => None,
                    Ok(n) => {
                        buf.truncate(n);
                        let remaining = remaining.saturating_sub(n as u64);
                        Some((Ok(bytes::Bytes::from(buf)), (file, remaining)))
                    }
                    Err(e) => Some((Err(map_io_err(&path_for_errors, e)), (file, 0))),
                }
            }
        });
        Ok(stream.boxed())
    }

    async fn delete(&self, prefix: &str) -> Result<(), DomainError> {
        let full = self.resolve(prefix)?;
        match tokio::fs::metadata(&full).await {
            Ok(meta) if meta.is_dir() => {
                tokio::fs::remove_dir_all(&full).await.map_err(|e| map_io_err(prefix, e))?;
            }
            Ok(_) => {
                tokio::fs::remove_file(&full).await.map_err(|e| map_io_err(prefix, e))?;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(map_io_err(prefix, e)),
        }
        Ok(())
    }

    async fn stat(&self, path: &str) -> Result<BlobStat, DomainError> {
        let full = self.resolve(path)?;
        let meta = tokio::fs::metadata(&full).await.map_err(|e| map_io_err(path, e))?;
        let modified = meta
            .modified()
            .map_err(|e| map_io_err(path, e))?;
        Ok(BlobStat {
            size: meta.len(),
            modified: chrono::DateTime::<chrono::Utc>::from(modified),
        })
    }
}
