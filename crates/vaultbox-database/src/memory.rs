//! In-memory implementation of every store trait.
//!
//! Backs the test suites and `database.provider = "memory"`. All tables
//! live behind one async `RwLock`, so each call is atomic with respect to
//! every other call.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use vaultbox_core::result::AppResult;
use vaultbox_core::types::{
    ActivityId, FileId, FileOrdering, FileSortKey, FolderId, PageRequest, PageResponse,
    ShareLinkId, UserId, UserShareId,
};
use vaultbox_entity::activity::{Activity, CreateActivity, ResourceType};
use vaultbox_entity::file::{CreateFile, File, TagCount};
use vaultbox_entity::folder::{CreateFolder, Folder};
use vaultbox_entity::share::{CreateShareLink, LinkUse, ShareLink, UpsertUserShare, UserShare};
use vaultbox_entity::user::{UpsertUser, User};

use crate::store::{
    ActivityStore, FileFilter, FileStore, FolderScope, FolderStore, ShareLinkStore, UserShareStore,
    UserStore,
};

#[derive(Debug, Default)]
struct Tables {
    folders: HashMap<FolderId, Folder>,
    files: HashMap<FileId, File>,
    links: HashMap<ShareLinkId, ShareLink>,
    user_shares: HashMap<UserShareId, UserShare>,
    activities: Vec<Activity>,
    users: HashMap<UserId, User>,
}

/// Process-local database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of activity entries, for assertions.
    pub async fn activity_count(&self) -> usize {
        self.tables.read().await.activities.len()
    }
}

fn compare_files(a: &File, b: &File, ordering: FileOrdering) -> Ordering {
    let primary = match ordering.key {
        FileSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        FileSortKey::Name => a.name.cmp(&b.name),
        FileSortKey::Size => a.size_bytes.cmp(&b.size_bytes),
    };
    ordering.direction.apply(primary.then_with(|| a.id.cmp(&b.id)))
}

fn newest_first(a: &Activity, b: &Activity) -> Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
}

#[async_trait]
impl FolderStore for MemoryStore {
    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>> {
        Ok(self.tables.read().await.folders.get(&id).cloned())
    }

    async fn find_children(&self, owner: UserId, parent: Option<FolderId>) -> AppResult<Vec<Folder>> {
        let tables = self.tables.read().await;
        let mut children: Vec<Folder> = tables
            .folders
            .values()
            .filter(|f| f.owner_id == owner && f.parent_id == parent)
            .cloned()
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(children)
    }

    async fn find_by_owner(&self, owner: UserId) -> AppResult<Vec<Folder>> {
        let tables = self.tables.read().await;
        let mut folders: Vec<Folder> = tables
            .folders
            .values()
            .filter(|f| f.owner_id == owner)
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.path.cmp(&b.path).then(a.name.cmp(&b.name)));
        Ok(folders)
    }

    async fn search(&self, owner: UserId, name_contains: &str) -> AppResult<Vec<Folder>> {
        let needle = name_contains.to_lowercase();
        let tables = self.tables.read().await;
        let mut folders: Vec<Folder> = tables
            .folders
            .values()
            .filter(|f| f.owner_id == owner && f.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(folders)
    }

    async fn count_children(&self, id: FolderId) -> AppResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .folders
            .values()
            .filter(|f| f.parent_id == Some(id))
            .count() as u64)
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        let now = Utc::now();
        let folder = Folder {
            id: FolderId::new(),
            name: data.name.clone(),
            parent_id: data.parent_id,
            owner_id: data.owner_id,
            path: data.path.clone(),
            color: data.color.clone(),
            icon: data.icon.clone(),
            revision: 0,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .await
            .folders
            .insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn update_if_current(&self, folder: &Folder) -> AppResult<Option<Folder>> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.folders.get_mut(&folder.id) else {
            return Ok(None);
        };
        if stored.revision != folder.revision {
            return Ok(None);
        }
        stored.name = folder.name.clone();
        stored.parent_id = folder.parent_id;
        stored.path = folder.path.clone();
        stored.revision += 1;
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn update_path(&self, id: FolderId, path: &str) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.folders.get_mut(&id) {
            Some(folder) => {
                folder.path = path.to_string();
                folder.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: FolderId) -> AppResult<bool> {
        Ok(self.tables.write().await.folders.remove(&id).is_some())
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn find_by_id(&self, id: FileId) -> AppResult<Option<File>> {
        Ok(self.tables.read().await.files.get(&id).cloned())
    }

    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        let now = Utc::now();
        let file = File {
            id: FileId::new(),
            owner_id: data.owner_id,
            name: data.name.clone(),
            size_bytes: data.size_bytes,
            mime_type: data.mime_type.clone(),
            folder_id: data.folder_id,
            object_ref: data.object_ref.clone(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.files.insert(file.id, file.clone());
        Ok(file)
    }

    async fn list(
        &self,
        owner: UserId,
        scope: FolderScope,
        filter: &FileFilter,
        page: PageRequest,
        ordering: FileOrdering,
    ) -> AppResult<PageResponse<File>> {
        let tables = self.tables.read().await;
        let mut matching: Vec<File> = tables
            .files
            .values()
            .filter(|f| f.owner_id == owner)
            .filter(|f| match scope {
                FolderScope::All => true,
                FolderScope::Root => f.folder_id.is_none(),
                FolderScope::Folder(id) => f.folder_id == Some(id),
            })
            .filter(|f| filter.matches(f))
            .cloned()
            .collect();
        matching.sort_by(|a, b| compare_files(a, b, ordering));
        let total = matching.len() as u64;
        Ok(PageResponse::new(page.slice(matching), page, total))
    }

    async fn find_in_folder(&self, folder: FolderId) -> AppResult<Vec<File>> {
        let tables = self.tables.read().await;
        let mut files: Vec<File> = tables
            .files
            .values()
            .filter(|f| f.folder_id == Some(folder))
            .cloned()
            .collect();
        files.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(files)
    }

    async fn count_in_folder(&self, folder: FolderId) -> AppResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .files
            .values()
            .filter(|f| f.folder_id == Some(folder))
            .count() as u64)
    }

    async fn update_folder(&self, id: FileId, folder: Option<FolderId>) -> AppResult<Option<File>> {
        let mut tables = self.tables.write().await;
        Ok(tables.files.get_mut(&id).map(|file| {
            file.folder_id = folder;
            file.updated_at = Utc::now();
            file.clone()
        }))
    }

    async fn update_tags(&self, id: FileId, tags: &[String]) -> AppResult<Option<File>> {
        let mut tables = self.tables.write().await;
        Ok(tables.files.get_mut(&id).map(|file| {
            file.tags = tags.to_vec();
            file.updated_at = Utc::now();
            file.clone()
        }))
    }

    async fn delete(&self, id: FileId) -> AppResult<bool> {
        Ok(self.tables.write().await.files.remove(&id).is_some())
    }

    async fn tag_counts(&self, owner: UserId) -> AppResult<Vec<TagCount>> {
        let tables = self.tables.read().await;
        let mut counts: HashMap<String, i64> = HashMap::new();
        for file in tables.files.values().filter(|f| f.owner_id == owner) {
            for tag in &file.tags {
                *counts.entry(tag.clone()).or_default() += 1;
            }
        }
        let mut counts: Vec<TagCount> = counts
            .into_iter()
            .map(|(tag, count)| TagCount { tag, count })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
        Ok(counts)
    }

    async fn scan_after(&self, cursor: Option<FileId>, limit: u32) -> AppResult<Vec<File>> {
        let tables = self.tables.read().await;
        let mut files: Vec<File> = tables
            .files
            .values()
            .filter(|f| cursor.is_none_or(|c| f.id > c))
            .cloned()
            .collect();
        files.sort_by(|a, b| a.id.cmp(&b.id));
        files.truncate(limit as usize);
        Ok(files)
    }
}

#[async_trait]
impl ShareLinkStore for MemoryStore {
    async fn find_by_id(&self, id: ShareLinkId) -> AppResult<Option<ShareLink>> {
        Ok(self.tables.read().await.links.get(&id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareLink>> {
        let tables = self.tables.read().await;
        Ok(tables.links.values().find(|l| l.token == token).cloned())
    }

    async fn token_exists(&self, token: &str) -> AppResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.links.values().any(|l| l.token == token))
    }

    async fn create(&self, data: &CreateShareLink) -> AppResult<ShareLink> {
        let link = ShareLink {
            id: ShareLinkId::new(),
            file_id: data.file_id,
            owner_id: data.owner_id,
            token: data.token.clone(),
            password_hash: data.password_hash.clone(),
            expires_at: data.expires_at,
            permissions: data.permissions.clone(),
            views: 0,
            downloads: 0,
            created_at: Utc::now(),
        };
        self.tables.write().await.links.insert(link.id, link.clone());
        Ok(link)
    }

    async fn list_by_owner(&self, owner: UserId, file: Option<FileId>) -> AppResult<Vec<ShareLink>> {
        let tables = self.tables.read().await;
        let mut links: Vec<ShareLink> = tables
            .links
            .values()
            .filter(|l| l.owner_id == owner && file.is_none_or(|f| l.file_id == f))
            .cloned()
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(links)
    }

    async fn record_use(&self, id: ShareLinkId, usage: LinkUse) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(link) = tables.links.get_mut(&id) {
            match usage {
                LinkUse::View => link.views += 1,
                LinkUse::Download => link.downloads += 1,
            }
        }
        Ok(())
    }

    async fn delete(&self, id: ShareLinkId) -> AppResult<bool> {
        Ok(self.tables.write().await.links.remove(&id).is_some())
    }

    async fn delete_by_file(&self, file: FileId) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.links.len();
        tables.links.retain(|_, l| l.file_id != file);
        Ok((before - tables.links.len()) as u64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.links.len();
        tables.links.retain(|_, l| !l.is_expired_at(now));
        Ok((before - tables.links.len()) as u64)
    }
}

#[async_trait]
impl UserShareStore for MemoryStore {
    async fn find_by_id(&self, id: UserShareId) -> AppResult<Option<UserShare>> {
        Ok(self.tables.read().await.user_shares.get(&id).cloned())
    }

    async fn find_for(&self, file: FileId, user: UserId) -> AppResult<Option<UserShare>> {
        let tables = self.tables.read().await;
        Ok(tables
            .user_shares
            .values()
            .find(|s| s.file_id == file && s.shared_with_id == user)
            .cloned())
    }

    async fn upsert(&self, data: &UpsertUserShare) -> AppResult<UserShare> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        if let Some(existing) = tables
            .user_shares
            .values_mut()
            .find(|s| s.file_id == data.file_id && s.shared_with_id == data.shared_with_id)
        {
            existing.permissions = data.permissions.clone();
            existing.shared_at = now;
            return Ok(existing.clone());
        }
        let share = UserShare {
            id: UserShareId::new(),
            file_id: data.file_id,
            owner_id: data.owner_id,
            shared_with_id: data.shared_with_id,
            permissions: data.permissions.clone(),
            shared_at: now,
            created_at: now,
        };
        tables.user_shares.insert(share.id, share.clone());
        Ok(share)
    }

    async fn list_by_file(&self, file: FileId) -> AppResult<Vec<UserShare>> {
        let tables = self.tables.read().await;
        let mut shares: Vec<UserShare> = tables
            .user_shares
            .values()
            .filter(|s| s.file_id == file)
            .cloned()
            .collect();
        shares.sort_by(|a, b| b.shared_at.cmp(&a.shared_at).then(a.id.cmp(&b.id)));
        Ok(shares)
    }

    async fn list_shared_with(&self, user: UserId) -> AppResult<Vec<UserShare>> {
        let tables = self.tables.read().await;
        let mut shares: Vec<UserShare> = tables
            .user_shares
            .values()
            .filter(|s| s.shared_with_id == user)
            .cloned()
            .collect();
        shares.sort_by(|a, b| b.shared_at.cmp(&a.shared_at).then(a.id.cmp(&b.id)));
        Ok(shares)
    }

    async fn delete(&self, id: UserShareId) -> AppResult<bool> {
        Ok(self.tables.write().await.user_shares.remove(&id).is_some())
    }

    async fn delete_by_file(&self, file: FileId) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.user_shares.len();
        tables.user_shares.retain(|_, s| s.file_id != file);
        Ok((before - tables.user_shares.len()) as u64)
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn append(&self, data: &CreateActivity) -> AppResult<Activity> {
        let activity = Activity {
            id: ActivityId::from_uuid(Uuid::now_v7()),
            user_id: data.user_id,
            action: data.action,
            resource_type: data.resource_type,
            resource_id: data.resource_id,
            resource_name: data.resource_name.clone(),
            metadata: data.metadata.clone(),
            ip_address: data.ip_address.clone(),
            user_agent: data.user_agent.clone(),
            created_at: Utc::now(),
        };
        self.tables.write().await.activities.push(activity.clone());
        Ok(activity)
    }

    async fn list_by_user(&self, user: UserId, page: PageRequest) -> AppResult<PageResponse<Activity>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<Activity> = tables
            .activities
            .iter()
            .filter(|a| a.user_id == user)
            .cloned()
            .collect();
        entries.sort_by(newest_first);
        let total = entries.len() as u64;
        Ok(PageResponse::new(page.slice(entries), page, total))
    }

    async fn list_by_resource(
        &self,
        user: UserId,
        resource_type: ResourceType,
        resource_id: Uuid,
        limit: u32,
    ) -> AppResult<Vec<Activity>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<Activity> = tables
            .activities
            .iter()
            .filter(|a| {
                a.user_id == user && a.resource_type == resource_type && a.resource_id == resource_id
            })
            .cloned()
            .collect();
        entries.sort_by(newest_first);
        entries.truncate(limit as usize);
        Ok(entries)
    }

    async fn list_since(&self, user: UserId, since: DateTime<Utc>, limit: u32) -> AppResult<Vec<Activity>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<Activity> = tables
            .activities
            .iter()
            .filter(|a| a.user_id == user && a.created_at >= since)
            .cloned()
            .collect();
        entries.sort_by(newest_first);
        entries.truncate(limit as usize);
        Ok(entries)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn upsert(&self, data: &UpsertUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let email = data.email.trim().to_lowercase();
        let user = tables
            .users
            .entry(data.id)
            .and_modify(|u| {
                if u.email != email || u.display_name != data.display_name {
                    u.email = email.clone();
                    u.display_name = data.display_name.clone();
                    u.updated_at = now;
                }
            })
            .or_insert_with(|| User {
                id: data.id,
                email: email.clone(),
                display_name: data.display_name.clone(),
                created_at: now,
                updated_at: now,
            });
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.trim().to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }
}
