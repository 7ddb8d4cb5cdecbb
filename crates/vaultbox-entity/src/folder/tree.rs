//! Folder tree structures for hierarchical display.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use vaultbox_core::types::FolderId;

use super::model::Folder;

/// A node in a folder tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderNode {
    /// The folder at this node.
    #[serde(flatten)]
    pub folder: Folder,
    /// Child folder nodes, ordered by name.
    pub children: Vec<FolderNode>,
}

/// A complete folder tree for one owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderTree {
    /// The root-level nodes.
    pub roots: Vec<FolderNode>,
    /// Total number of folders in the tree.
    pub total_folders: u64,
}

impl FolderTree {
    /// Create an empty folder tree.
    pub fn empty() -> Self {
        Self {
            roots: Vec::new(),
            total_folders: 0,
        }
    }

    /// Assemble a tree from a flat list of one owner's folders.
    ///
    /// Built bottom-up without recursion. Folders whose parent is missing
    /// from the list are attached at the root.
    pub fn build(folders: Vec<Folder>) -> Self {
        let total_folders = folders.len() as u64;
        let ids: std::collections::HashSet<FolderId> = folders.iter().map(|f| f.id).collect();

        let mut children_of: HashMap<Option<FolderId>, Vec<Folder>> = HashMap::new();
        for folder in folders {
            let parent = folder.parent_id.filter(|p| ids.contains(p));
            children_of.entry(parent).or_default().push(folder);
        }
        for siblings in children_of.values_mut() {
            siblings.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        }

        // Post-order over an explicit stack: a node is finished once all
        // of its children have been finished.
        let mut finished: HashMap<FolderId, FolderNode> = HashMap::new();
        let mut stack: Vec<(Folder, bool)> = children_of
            .get(&None)
            .map(|roots| roots.iter().rev().map(|f| (f.clone(), false)).collect())
            .unwrap_or_default();
        let mut roots = Vec::new();

        while let Some((folder, expanded)) = stack.pop() {
            let kids = children_of.get(&Some(folder.id)).cloned().unwrap_or_default();
            if !expanded && !kids.is_empty() {
                stack.push((folder, true));
                for kid in kids.into_iter().rev() {
                    stack.push((kid, false));
                }
                continue;
            }
            let children = kids
                .iter()
                .filter_map(|k| finished.remove(&k.id))
                .collect();
            let node = FolderNode { folder, children };
            if node.folder.parent_id.is_none_or(|p| !ids.contains(&p)) {
                roots.push(node);
            } else {
                finished.insert(node.folder.id, node);
            }
        }

        Self {
            roots,
            total_folders,
        }
    }
}
