use diesel::{pg::Pg, prelude::*};

use crate::db::{enums::FolderType, schema};

/// A shared folder, global when `center_id` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, serde::Serialize)]
#[diesel(table_name = schema::shared_folders)]
#[diesel(check_for_backend(Pg))]
pub struct SharedFolder {
    pub id: i32,
    pub center_id: Option<i32>,
    pub name: String,
    pub description: String,
    pub folder_type: FolderType,
    /// Relative to the storage data dir.
    pub local_path: Option<String>,
    pub cloud_url: Option<String>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl SharedFolder {
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.center_id.is_none()
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::shared_folders)]
pub struct NewSharedFolder<'a> {
    pub center_id: Option<i32>,
    pub name: &'a str,
    pub description: &'a str,
    pub folder_type: FolderType,
    pub local_path: Option<&'a str>,
    pub cloud_url: Option<&'a str>,
}

/// Owned form of [`NewSharedFolder`] accepted by the stores.
#[derive(Debug, Clone)]
pub struct SharedFolderDraft {
    pub center_id: Option<i32>,
    pub name: String,
    pub description: String,
    pub folder_type: FolderType,
    pub local_path: Option<String>,
    pub cloud_url: Option<String>,
}

impl SharedFolderDraft {
    #[must_use]
    pub fn as_insertable(&self) -> NewSharedFolder<'_> {
        NewSharedFolder {
            center_id: self.center_id,
            name: &self.name,
            description: &self.description,
            folder_type: self.folder_type,
            local_path: self.local_path.as_deref(),
            cloud_url: self.cloud_url.as_deref(),
        }
    }
}

/// A listing row: the folder plus its center's name.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SharedFolderWithCenter {
    #[serde(flatten)]
    pub folder: SharedFolder,
    pub center_name: Option<String>,
}
