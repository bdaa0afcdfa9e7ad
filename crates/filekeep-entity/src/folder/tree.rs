//! Folder hierarchy index and tree structures.
//!
//! Everything here is pure: the index is built from a flat folder list and
//! answers ancestry questions without touching the store. All walks are
//! iterative and guarded by a visited set, so corrupt (cyclic) input data
//! terminates instead of looping.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use filekeep_core::types::FolderId;

use super::model::{Folder, PATH_SEPARATOR};

/// A node in a folder tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderNode {
    /// The folder itself, with its materialized path.
    pub folder: Folder,
    /// Number of live files directly inside this folder.
    pub file_count: u64,
    /// Child folder nodes, ordered by name.
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    /// Group a flat folder list into root nodes with children populated.
    ///
    /// A folder whose declared parent is absent from the input is treated
    /// as a root.
    pub fn build(folders: &[Folder]) -> Vec<FolderNode> {
        FolderIndex::new(folders).build(&HashMap::new())
    }

    /// Number of direct child folders.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Find a node by folder id in this subtree.
    pub fn find(&self, id: FolderId) -> Option<&FolderNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.folder.id == id {
                return Some(node);
            }
            stack.extend(node.children.iter());
        }
        None
    }

    /// Depth-first listing of `(depth, folder)` pairs, roots at depth 0.
    pub fn flatten(roots: &[FolderNode]) -> Vec<(usize, &Folder)> {
        let mut out = Vec::new();
        let mut stack: Vec<(usize, &FolderNode)> = roots.iter().rev().map(|n| (0, n)).collect();
        while let Some((depth, node)) = stack.pop() {
            out.push((depth, &node.folder));
            stack.extend(node.children.iter().rev().map(|c| (depth + 1, c)));
        }
        out
    }
}

/// The ancestor chain of a folder, starting with the folder itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ancestry {
    /// Folder ids from the starting folder up to its root.
    pub chain: Vec<FolderId>,
    /// Whether the walk stopped because it revisited a folder.
    pub cyclic: bool,
}

impl Ancestry {
    /// Whether `id` appears on the chain.
    pub fn contains(&self, id: FolderId) -> bool {
        self.chain.contains(&id)
    }
}

/// Lookup structure over the folders of one project.
#[derive(Debug, Clone, Default)]
pub struct FolderIndex {
    /// Folder id → folder.
    folders: HashMap<FolderId, Folder>,
}

impl FolderIndex {
    /// Index a flat folder list.
    pub fn new(folders: &[Folder]) -> Self {
        Self {
            folders: folders.iter().map(|f| (f.id, f.clone())).collect(),
        }
    }

    /// Number of indexed folders.
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Look up a folder.
    pub fn get(&self, id: FolderId) -> Option<&Folder> {
        self.folders.get(&id)
    }

    /// Whether the folder is indexed.
    pub fn contains(&self, id: FolderId) -> bool {
        self.folders.contains_key(&id)
    }

    /// All folders, ordered by materialized path.
    pub fn folders(&self) -> Vec<&Folder> {
        let mut all: Vec<&Folder> = self.folders.values().collect();
        all.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
        all
    }

    /// Parent as seen by the tree: a dangling parent reference counts as root.
    pub fn effective_parent(&self, id: FolderId) -> Option<FolderId> {
        self.folders
            .get(&id)
            .and_then(|f| f.parent_id)
            .filter(|p| self.folders.contains_key(p))
    }

    /// Direct children of `parent` (`None` for project root), ordered by name.
    pub fn children_of(&self, parent: Option<FolderId>) -> Vec<&Folder> {
        let mut children: Vec<&Folder> = self
            .folders
            .values()
            .filter(|f| self.effective_parent(f.id) == parent && Some(f.id) != parent)
            .collect();
        children.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
        children
    }

    /// Walk from `id` up to its root.
    ///
    /// The walk is bounded by the number of indexed folders and stops at the
    /// first revisited folder, flagging the chain as cyclic.
    pub fn ancestry(&self, id: FolderId) -> Ancestry {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(id);
        let mut cyclic = false;

        while let Some(cur) = current {
            if !seen.insert(cur) || chain.len() > self.folders.len() {
                cyclic = true;
                break;
            }
            if !self.folders.contains_key(&cur) {
                break;
            }
            chain.push(cur);
            current = self.effective_parent(cur);
        }

        Ancestry { chain, cyclic }
    }

    /// Names from the root down to `id` inclusive. Empty for an unknown id.
    pub fn path_names(&self, id: FolderId) -> Vec<String> {
        let ancestry = self.ancestry(id);
        ancestry
            .chain
            .iter()
            .rev()
            .filter_map(|fid| self.folders.get(fid))
            .map(|f| f.name.clone())
            .collect()
    }

    /// Every folder below `id`, breadth first.
    pub fn descendants(&self, id: FolderId) -> Vec<FolderId> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut queue = std::collections::VecDeque::from([id]);
        while let Some(cur) = queue.pop_front() {
            for child in self.children_of(Some(cur)) {
                if seen.insert(child.id) {
                    out.push(child.id);
                    queue.push_back(child.id);
                }
            }
        }
        out
    }

    /// Recompute every folder's `path` from its parent chain.
    ///
    /// Returns the ids whose path changed.
    pub fn materialize_paths(&mut self) -> Vec<FolderId> {
        let computed: Vec<(FolderId, String)> = self
            .folders
            .keys()
            .map(|id| {
                let sep = PATH_SEPARATOR.to_string();
                (*id, self.path_names(*id).join(&sep))
            })
            .collect();

        let mut changed = Vec::new();
        for (id, path) in computed {
            if let Some(folder) = self.folders.get_mut(&id) {
                if folder.path != path {
                    folder.path = path;
                    changed.push(id);
                }
            }
        }
        changed.sort();
        changed
    }

    /// Build root nodes with children populated.
    ///
    /// Folders stranded on a parent cycle are unreachable from any root;
    /// they are promoted to roots so that nothing disappears from the tree.
    pub fn build(&self, file_counts: &HashMap<FolderId, u64>) -> Vec<FolderNode> {
        let mut visited = HashSet::new();
        let mut roots: Vec<FolderNode> = self
            .children_of(None)
            .into_iter()
            .filter_map(|f| self.build_node(f.id, file_counts, &mut visited))
            .collect();

        if visited.len() < self.folders.len() {
            for folder in self.folders() {
                if !visited.contains(&folder.id) {
                    if let Some(node) = self.build_node(folder.id, file_counts, &mut visited) {
                        roots.push(node);
                    }
                }
            }
        }

        roots
    }

    fn build_node(
        &self,
        id: FolderId,
        file_counts: &HashMap<FolderId, u64>,
        visited: &mut HashSet<FolderId>,
    ) -> Option<FolderNode> {
        if !visited.insert(id) {
            return None;
        }
        let folder = self.folders.get(&id)?.clone();
        let children = self
            .children_of(Some(id))
            .into_iter()
            .filter_map(|child| self.build_node(child.id, file_counts, visited))
            .collect();

        Some(FolderNode {
            file_count: file_counts.get(&id).copied().unwrap_or(0),
            folder,
            children,
        })
    }
}

fn sort_key(folder: &Folder) -> (String, FolderId) {
    (folder.name.to_lowercase(), folder.id)
}
