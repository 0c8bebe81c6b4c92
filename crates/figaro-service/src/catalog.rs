//! Shared folder administration.

use std::path::PathBuf;
use std::sync::Arc;

use figaro_core::constants::{SHARED_LOCAL_PREFIX, SHARED_STORAGE_DIR};
use figaro_db::db::enums::FolderType;
use figaro_db::model::shared_folder::{SharedFolder, SharedFolderDraft, SharedFolderWithCenter};
use figaro_db::store::{SharedFolderStore, UserStore};

use crate::auth::identity::Identity;
use crate::error::{ServiceError, ServiceResult};
use crate::gateway::FsError;
use crate::util::clock::Clock;

/// A validated-on-create folder request.
#[derive(Debug, Clone, Default)]
pub struct NewFolderRequest {
    pub name: String,
    pub description: String,
    /// `local` or `cloud`.
    pub folder_type: String,
    pub cloud_url: Option<String>,
    pub center_id: Option<i32>,
    pub is_global: bool,
}

pub struct Catalog {
    folders: Arc<dyn SharedFolderStore>,
    users: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
    data_dir: PathBuf,
}

impl Catalog {
    #[must_use]
    pub fn new(
        folders: Arc<dyn SharedFolderStore>,
        users: Arc<dyn UserStore>,
        clock: Arc<dyn Clock>,
        data_dir: PathBuf,
    ) -> Self {
        Self {
            folders,
            users,
            clock,
            data_dir,
        }
    }

    /// ## Summary
    /// Folders visible to the identity's center, global first.
    ///
    /// ## Errors
    /// Returns an error if the store query fails.
    pub async fn list_for(&self, identity: &Identity) -> ServiceResult<Vec<SharedFolderWithCenter>> {
        Ok(self.folders.list_visible_folders(identity.center_id()).await?)
    }

    /// ## Summary
    /// Creates a shared folder. Local folders get a directory under the data
    /// directory named after their scope and name, see [`local_folder_path`].
    ///
    /// ## Side Effects
    /// - Creates the local directory before inserting the row
    ///
    /// ## Errors
    /// Returns `Validation` for a bad name, type, missing cloud URL, unknown
    /// center or a local path already held by an active folder.
    #[tracing::instrument(skip(self, creator, request), fields(name = %request.name))]
    pub async fn create(
        &self,
        creator: &Identity,
        request: NewFolderRequest,
    ) -> ServiceResult<SharedFolder> {
        let name = request.name.trim().to_string();
        validate_folder_name(&name)?;

        let folder_type = FolderType::parse(request.folder_type.trim())
            .ok_or_else(|| ServiceError::Validation("Tipo de carpeta no válido".into()))?;

        let center_id = if request.is_global {
            None
        } else {
            let center_id = request
                .center_id
                .or(creator.center_id())
                .ok_or_else(|| ServiceError::Validation("Debe indicar un centro".into()))?;
            if self.users.find_center(center_id).await?.is_none() {
                return Err(ServiceError::Validation("El centro no existe".into()));
            }
            Some(center_id)
        };

        let (local_path, cloud_url) = match folder_type {
            FolderType::Local => {
                let relative = local_folder_path(center_id, &name);
                if self.folders.local_path_in_use(&relative).await? {
                    return Err(ServiceError::Validation(
                        "Ya existe una carpeta con ese nombre".into(),
                    ));
                }
                tokio::fs::create_dir_all(self.data_dir.join(&relative))
                    .await
                    .map_err(|err| {
                        tracing::error!(error = %err, "Failed to create shared folder directory");
                        ServiceError::FsError(FsError::from(err))
                    })?;
                (Some(relative), None)
            }
            FolderType::Cloud => {
                let url = request
                    .cloud_url
                    .map(|url| url.trim().to_string())
                    .filter(|url| !url.is_empty())
                    .ok_or_else(|| {
                        ServiceError::Validation("Las carpetas en la nube requieren una URL".into())
                    })?;
                (None, Some(url))
            }
        };

        let folder = self
            .folders
            .create_folder(&SharedFolderDraft {
                center_id,
                name,
                description: request.description.trim().to_string(),
                folder_type,
                local_path,
                cloud_url,
            })
            .await?;

        tracing::info!(folder_id = %folder.id, folder_type = %folder.folder_type, "Shared folder created");
        Ok(folder)
    }

    /// ## Summary
    /// Soft-deletes a folder. Files on disk are kept.
    ///
    /// ## Errors
    /// Returns `FolderNotAccessible` if the folder does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        if self.folders.find_folder(id).await?.is_none() {
            return Err(ServiceError::FolderNotAccessible);
        }
        self.folders.deactivate_folder(id, self.clock.now()).await?;
        Ok(())
    }
}

/// Directory of a local folder relative to the data directory. The scope
/// segment keeps same-name folders of different centers apart.
#[must_use]
pub fn local_folder_path(center_id: Option<i32>, name: &str) -> String {
    match center_id {
        Some(center_id) => format!("{SHARED_STORAGE_DIR}/{SHARED_LOCAL_PREFIX}c{center_id}_{name}"),
        None => format!("{SHARED_STORAGE_DIR}/{SHARED_LOCAL_PREFIX}global_{name}"),
    }
}

/// Names route the shared mount, so they must be a single visible segment.
fn validate_folder_name(name: &str) -> ServiceResult<()> {
    if name.is_empty() {
        return Err(ServiceError::Validation("El nombre es obligatorio".into()));
    }
    if name.starts_with('.') || name.contains(['/', '\\', '\0']) {
        return Err(ServiceError::Validation("Nombre de carpeta no válido".into()));
    }
    Ok(())
}
