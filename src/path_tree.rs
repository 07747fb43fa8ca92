//! Parent-linked path nodes and their flattened `id -> path` table
//!
//! Both container formats store their directory tree as a flat list of
//! `(id, parent_id, name)` nodes. Full paths are rebuilt by walking each parent
//! chain up to a seeded root (or an already resolved node) and then filling in
//! every node on the way back down, so each path is built exactly once.

use std::collections::{HashMap, HashSet};

use tracing::warn;

/// One `(id, parent, name)` entry from a filename or path section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathNode {
    pub id: u64,
    pub parent_id: u64,
    pub name: String,
}

/// Resolved paths, indexed both ways.
///
/// When several ids share a path (exactly or by case), lookups by path
/// return whichever came first: seeded roots, then nodes in section order.
#[derive(Debug, Clone, Default)]
pub struct PathTable {
    paths: HashMap<u64, String>,
    ids: HashMap<String, u64>,
    /// Resolved ids in section order
    order: Vec<u64>,
}

impl PathTable {
    /// Resolve every node in `nodes` against the seeded `roots`.
    ///
    /// Nodes whose chain loops back on itself, or ends at an id that is
    /// neither a root nor a known node, stay unresolved and are reported once.
    pub fn build(nodes: &[PathNode], roots: &[(u64, &str)]) -> Self {
        let by_id: HashMap<u64, &PathNode> = nodes.iter().map(|n| (n.id, n)).collect();

        let mut paths: HashMap<u64, String> = roots
            .iter()
            .map(|&(id, name)| (id, name.to_string()))
            .collect();
        let mut unresolvable: HashSet<u64> = HashSet::new();

        for node in nodes {
            if paths.contains_key(&node.id) || unresolvable.contains(&node.id) {
                continue;
            }

            let mut chain: Vec<&PathNode> = Vec::new();
            let mut visited: HashSet<u64> = HashSet::new();
            let mut current = node.id;

            let base = loop {
                if let Some(path) = paths.get(&current) {
                    break Some(path.clone());
                }
                if unresolvable.contains(&current) {
                    break None;
                }
                if !visited.insert(current) {
                    warn!("cycle in path parent chain at {:016x}", current);
                    break None;
                }
                match by_id.get(&current) {
                    Some(next) => {
                        chain.push(next);
                        current = next.parent_id;
                    }
                    None => {
                        warn!(
                            "path chain of {:016x} stops at unknown parent {:016x}",
                            node.id, current
                        );
                        break None;
                    }
                }
            };

            match base {
                Some(mut path) => {
                    for link in chain.iter().rev() {
                        path = join(&path, &link.name);
                        paths.insert(link.id, path.clone());
                    }
                }
                None => unresolvable.extend(chain.iter().map(|n| n.id)),
            }
        }

        let mut seen = HashSet::with_capacity(paths.len());
        let order: Vec<u64> = roots
            .iter()
            .map(|&(id, _)| id)
            .chain(nodes.iter().map(|n| n.id))
            .filter(|id| paths.contains_key(id) && seen.insert(*id))
            .collect();

        let mut ids = HashMap::with_capacity(order.len());
        for &id in &order {
            ids.entry(paths[&id].clone()).or_insert(id);
        }

        PathTable { paths, ids, order }
    }

    /// Full path of `id`, if it resolved
    pub fn get(&self, id: u64) -> Option<&str> {
        self.paths.get(&id).map(String::as_str)
    }

    /// Exact reverse lookup
    pub fn id_of(&self, path: &str) -> Option<u64> {
        self.ids.get(path).copied()
    }

    /// Case-insensitive reverse lookup (linear scan)
    pub fn id_of_ignore_case(&self, path: &str) -> Option<u64> {
        if let Some(id) = self.id_of(path) {
            return Some(id);
        }
        self.iter()
            .find(|(_, candidate)| candidate.eq_ignore_ascii_case(path))
            .map(|(id, _)| id)
    }

    /// Resolved `(id, path)` pairs in section order
    pub fn iter(&self) -> impl Iterator<Item = (u64, &str)> {
        self.order
            .iter()
            .filter_map(|&id| self.paths.get(&id).map(|path| (id, path.as_str())))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}
