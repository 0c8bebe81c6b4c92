//! Resolution of mounts to physical roots.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use figaro_core::constants::{PERSONAL_MOUNT_PREFIX, PERSONAL_STORAGE_DIR, SHARED_MOUNT_PREFIX};
use figaro_db::db::enums::FolderType;
use figaro_db::store::SharedFolderStore;

use super::error::FsError;
use super::fs::HiddenFilteringFs;
use super::lock::{LockRegistry, LockTable};
use crate::error::{ServiceError, ServiceResult};
use crate::util::clock::Clock;

/// A resolved mount: where its files live and how its hrefs are spelled.
#[derive(Debug, Clone)]
pub struct MountedRoot {
    pub fs: HiddenFilteringFs,
    pub locks: Arc<LockTable>,
    /// Href of the mount root, without trailing slash.
    pub href_base: String,
}

pub struct Gateway {
    data_dir: PathBuf,
    folders: Arc<dyn SharedFolderStore>,
    locks: LockRegistry,
    clock: Arc<dyn Clock>,
    max_upload_size: u64,
}

impl Gateway {
    #[must_use]
    pub fn new(
        data_dir: PathBuf,
        folders: Arc<dyn SharedFolderStore>,
        clock: Arc<dyn Clock>,
        max_upload_size: u64,
    ) -> Self {
        Self {
            data_dir,
            folders,
            locks: LockRegistry::new(),
            clock,
            max_upload_size,
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    #[must_use]
    pub fn max_upload_size(&self) -> u64 {
        self.max_upload_size
    }

    async fn mount(&self, root: PathBuf, href_base: String) -> ServiceResult<MountedRoot> {
        tokio::fs::create_dir_all(&root).await.map_err(|err| {
            tracing::error!(error = %err, "Failed to create mount root");
            ServiceError::FsError(FsError::from(err))
        })?;
        let root = tokio::fs::canonicalize(&root)
            .await
            .map_err(|err| ServiceError::FsError(FsError::from(err)))?;

        Ok(MountedRoot {
            locks: self.locks.table_for(&root),
            fs: HiddenFilteringFs::new(root),
            href_base,
        })
    }

    /// ## Summary
    /// Mounts `<data_dir>/ArchivosPersonales/<user_id>`, creating it on first
    /// access.
    ///
    /// ## Errors
    /// Returns an error if the directory cannot be created.
    #[tracing::instrument(skip(self))]
    pub async fn personal_mount(&self, user_id: i32) -> ServiceResult<MountedRoot> {
        let root = self
            .data_dir
            .join(PERSONAL_STORAGE_DIR)
            .join(user_id.to_string());
        self.mount(root, PERSONAL_MOUNT_PREFIX.to_string()).await
    }

    /// ## Summary
    /// Mounts the shared folder called `name` as seen from `center_id`.
    ///
    /// ## Errors
    /// Returns `FolderNotAccessible` when the folder is missing, inactive,
    /// cloud-backed or has an unusable local path.
    #[tracing::instrument(skip(self))]
    pub async fn shared_mount(&self, name: &str, center_id: Option<i32>) -> ServiceResult<MountedRoot> {
        let folder = self
            .folders
            .find_visible_folder(name, center_id)
            .await?
            .ok_or(ServiceError::FolderNotAccessible)?;

        if folder.folder_type == FolderType::Cloud {
            tracing::debug!(folder_id = %folder.id, "Cloud folders are not mountable");
            return Err(ServiceError::FolderNotAccessible);
        }

        let local_path = folder
            .local_path
            .as_deref()
            .filter(|p| is_confined(Path::new(p)))
            .ok_or_else(|| {
                tracing::warn!(folder_id = %folder.id, "Shared folder has no usable local path");
                ServiceError::FolderNotAccessible
            })?;

        let href_base = format!("{SHARED_MOUNT_PREFIX}/{}", urlencoding::encode(name));
        self.mount(self.data_dir.join(local_path), href_base).await
    }
}

/// A relative path made only of normal components.
fn is_confined(path: &Path) -> bool {
    path.components().next().is_some()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}
