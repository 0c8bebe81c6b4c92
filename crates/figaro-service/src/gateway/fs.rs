//! Filesystem access confined to one gateway root.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use figaro_rfc::rfc::dav::core::Depth;

use super::error::{FsError, FsResult};
use super::path::DavPath;

/// Metadata of one visible entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub path: DavPath,
    pub is_dir: bool,
    pub len: u64,
    pub modified: DateTime<Utc>,
    pub created: DateTime<Utc>,
}

impl EntryInfo {
    fn from_metadata(path: DavPath, metadata: &std::fs::Metadata) -> Self {
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let created = metadata.created().unwrap_or(modified);
        Self {
            path,
            is_dir: metadata.is_dir(),
            len: if metadata.is_dir() { 0 } else { metadata.len() },
            modified: modified.into(),
            created: created.into(),
        }
    }

    /// `"<mtime nanos hex>-<size hex>"`, quotes included.
    #[must_use]
    pub fn etag(&self) -> String {
        let nanos = self.modified.timestamp_nanos_opt().unwrap_or_default();
        format!("\"{nanos:x}-{:x}\"", self.len)
    }

    #[must_use]
    pub fn content_type(&self) -> String {
        if self.is_dir {
            return "httpd/unix-directory".to_string();
        }
        self.path.name().map_or_else(
            || "application/octet-stream".to_string(),
            |name| mime_guess::from_path(name).first_or_octet_stream().to_string(),
        )
    }
}

/// Filesystem view of a root in which every dot-entry, and everything
/// beneath one, does not exist.
#[derive(Debug, Clone)]
pub struct HiddenFilteringFs {
    root: PathBuf,
}

impl HiddenFilteringFs {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &DavPath) -> FsResult<PathBuf> {
        if path.is_hidden() {
            return Err(FsError::NotFound);
        }
        Ok(path.to_fs_path(&self.root))
    }

    /// ## Summary
    /// Metadata of a visible entry.
    ///
    /// ## Errors
    /// Returns `NotFound` for hidden or missing entries.
    pub async fn stat(&self, path: &DavPath) -> FsResult<EntryInfo> {
        let metadata = tokio::fs::metadata(self.resolve(path)?).await?;
        Ok(EntryInfo::from_metadata(path.clone(), &metadata))
    }

    /// ## Summary
    /// Whether a visible entry exists.
    ///
    /// ## Errors
    /// Returns an error for failures other than absence.
    pub async fn exists(&self, path: &DavPath) -> FsResult<bool> {
        match self.stat(path).await {
            Ok(_) => Ok(true),
            Err(FsError::NotFound) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// ## Summary
    /// Visible children of a collection, sorted by name.
    ///
    /// ## Errors
    /// Returns `NotFound` if the collection is hidden or missing.
    pub async fn list(&self, path: &DavPath) -> FsResult<Vec<EntryInfo>> {
        let mut reader = tokio::fs::read_dir(self.resolve(path)?).await?;
        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            // Entries can vanish between readdir and stat.
            match entry.metadata().await {
                Ok(metadata) => entries.push(EntryInfo::from_metadata(path.join(&name), &metadata)),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        entries.sort_by(|a, b| a.path.name().cmp(&b.path.name()));
        Ok(entries)
    }

    /// ## Summary
    /// The entry at `path` followed by its visible descendants up to `depth`.
    ///
    /// ## Errors
    /// Returns `NotFound` if the entry is hidden or missing.
    pub async fn walk(&self, path: &DavPath, depth: Depth) -> FsResult<Vec<EntryInfo>> {
        let start = self.stat(path).await?;
        let mut out = vec![start.clone()];
        if !depth.descends() || !start.is_dir {
            return Ok(out);
        }

        let mut pending = vec![start.path];
        while let Some(dir) = pending.pop() {
            for child in self.list(&dir).await? {
                if child.is_dir && depth == Depth::Infinity {
                    pending.push(child.path.clone());
                }
                out.push(child);
            }
        }
        Ok(out)
    }

    /// ## Summary
    /// Opens a file for reading, so callers can stream it.
    ///
    /// ## Errors
    /// Returns `NotFound` for hidden or missing files.
    pub async fn open(&self, path: &DavPath) -> FsResult<tokio::fs::File> {
        Ok(tokio::fs::File::open(self.resolve(path)?).await?)
    }

    async fn ensure_parent(&self, path: &DavPath) -> FsResult<()> {
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        match self.stat(&parent).await {
            Ok(info) if info.is_dir => Ok(()),
            Ok(_) | Err(FsError::NotFound) => Err(FsError::MissingParent),
            Err(err) => Err(err),
        }
    }

    /// ## Summary
    /// Writes a file, creating or replacing it. Returns whether it was created.
    ///
    /// ## Errors
    /// Returns `MissingParent` without a parent collection and `IsCollection`
    /// when the target is one.
    pub async fn write(&self, path: &DavPath, body: &[u8]) -> FsResult<bool> {
        if path.is_root() {
            return Err(FsError::IsCollection);
        }
        let target = self.resolve(path)?;
        self.ensure_parent(path).await?;

        let created = match self.stat(path).await {
            Ok(info) if info.is_dir => return Err(FsError::IsCollection),
            Ok(_) => false,
            Err(FsError::NotFound) => true,
            Err(err) => return Err(err),
        };

        tokio::fs::write(target, body).await?;
        Ok(created)
    }

    /// ## Summary
    /// Creates one collection.
    ///
    /// ## Errors
    /// Returns `AlreadyExists` if the target exists and `MissingParent`
    /// without a parent collection.
    pub async fn create_dir(&self, path: &DavPath) -> FsResult<()> {
        let target = self.resolve(path)?;
        if self.exists(path).await? {
            return Err(FsError::AlreadyExists);
        }
        self.ensure_parent(path).await?;
        tokio::fs::create_dir(target).await?;
        Ok(())
    }

    /// ## Summary
    /// Removes a file or a collection with everything in it.
    ///
    /// ## Errors
    /// Returns `Forbidden` for the root and `NotFound` for hidden or missing
    /// entries.
    pub async fn remove(&self, path: &DavPath) -> FsResult<()> {
        if path.is_root() {
            return Err(FsError::Forbidden);
        }
        let target = self.resolve(path)?;
        if self.stat(path).await?.is_dir {
            tokio::fs::remove_dir_all(target).await?;
        } else {
            tokio::fs::remove_file(target).await?;
        }
        Ok(())
    }

    /// ## Summary
    /// Copies an entry. Collections are copied with their visible
    /// descendants when `recursive`, otherwise as an empty collection.
    /// The destination must not exist.
    ///
    /// ## Errors
    /// Returns `NotFound` for a hidden or missing source and `MissingParent`
    /// when the destination has no parent collection.
    pub async fn copy(&self, from: &DavPath, to: &DavPath, recursive: bool) -> FsResult<()> {
        let source = self.stat(from).await?;
        self.resolve(to)?;
        self.ensure_parent(to).await?;

        if !source.is_dir {
            tokio::fs::copy(self.resolve(from)?, self.resolve(to)?).await?;
            return Ok(());
        }

        tokio::fs::create_dir(self.resolve(to)?).await?;
        if !recursive {
            return Ok(());
        }

        let mut pending = vec![(from.clone(), to.clone())];
        while let Some((src_dir, dst_dir)) = pending.pop() {
            for child in self.list(&src_dir).await? {
                let Some(name) = child.path.name() else {
                    continue;
                };
                let dst = dst_dir.join(name);
                if child.is_dir {
                    tokio::fs::create_dir(self.resolve(&dst)?).await?;
                    pending.push((child.path.clone(), dst));
                } else {
                    tokio::fs::copy(self.resolve(&child.path)?, self.resolve(&dst)?).await?;
                }
            }
        }
        Ok(())
    }

    /// ## Summary
    /// Moves an entry. The destination must not exist.
    ///
    /// ## Errors
    /// Returns `NotFound` for a hidden or missing source and `MissingParent`
    /// when the destination has no parent collection.
    pub async fn rename(&self, from: &DavPath, to: &DavPath) -> FsResult<()> {
        if from.is_root() {
            return Err(FsError::Forbidden);
        }
        self.stat(from).await?;
        let target = self.resolve(to)?;
        self.ensure_parent(to).await?;
        tokio::fs::rename(self.resolve(from)?, target).await?;
        Ok(())
    }
}
