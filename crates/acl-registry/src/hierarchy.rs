//! # Hierarchies
//!
//! Parent graphs for roles and resources, and the closure walk used by every
//! permission lookup.
//!
//! ## Closure
//!
//! ```text
//! editor ──► writer ──► actived_user ──► user
//!    └─────► manager ────┘
//!
//! closure(editor) = [editor, writer, actived_user, user, manager, *]
//! ```
//!
//! The node comes first, every transitive ancestor appears exactly once, and the
//! `Any` wildcard comes last.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::config::CyclePolicy;
use crate::error::{AclError, AclResult, EntityKind};
use crate::selector::Selector;

/// A directed "is-a" graph from child to parents.
///
/// Parent lists keep insertion order so traversal is deterministic.
///
/// # Example
///
/// ```
/// use acl_registry::{CyclePolicy, EntityKind, Hierarchy, Selector};
///
/// let mut roles = Hierarchy::new(EntityKind::Role);
/// roles.insert("user", [], CyclePolicy::Reject).unwrap();
/// roles.insert("writer", ["user"], CyclePolicy::Reject).unwrap();
///
/// let closure = roles.closure(&Selector::Exact("writer"));
/// assert_eq!(
///     closure,
///     vec![Selector::Exact("writer"), Selector::Exact("user"), Selector::Any]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Hierarchy<K> {
    kind: EntityKind,
    parents: HashMap<K, Vec<K>>,
    children: HashMap<K, Vec<K>>,
}

impl<K> Hierarchy<K>
where
    K: Clone + Eq + Hash + std::fmt::Debug,
{
    /// Create an empty hierarchy for the given entity kind.
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            parents: HashMap::new(),
            children: HashMap::new(),
        }
    }

    /// The kind of entity this hierarchy stores.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Register a node, or merge more parents into an existing node.
    ///
    /// Parents that are not registered yet become root nodes. With
    /// [`CyclePolicy::Reject`] the whole call fails, leaving the graph
    /// untouched, if any new edge would close a cycle.
    ///
    /// # Returns
    ///
    /// `true` if the node did not exist before.
    pub fn insert<I>(&mut self, node: K, parents: I, policy: CyclePolicy) -> AclResult<bool>
    where
        I: IntoIterator<Item = K>,
    {
        let existing = self.parents.get(&node);
        let mut added: Vec<K> = Vec::new();
        for parent in parents {
            let known = existing.map_or(false, |ps| ps.contains(&parent));
            if !known && !added.contains(&parent) {
                added.push(parent);
            }
        }

        if policy == CyclePolicy::Reject {
            for parent in &added {
                if *parent == node || self.is_ancestor(&node, parent) {
                    return Err(AclError::CyclicHierarchy {
                        kind: self.kind,
                        node: format!("{:?}", node),
                        parent: format!("{:?}", parent),
                    });
                }
            }
        }

        let created = !self.parents.contains_key(&node);
        for parent in &added {
            self.parents.entry(parent.clone()).or_default();
            self.children
                .entry(parent.clone())
                .or_default()
                .push(node.clone());
        }
        self.parents.entry(node).or_default().extend(added);

        Ok(created)
    }

    /// Check if a node is registered.
    pub fn contains(&self, node: &K) -> bool {
        self.parents.contains_key(node)
    }

    /// Fail with `UnknownEntity` unless the selector is `Any` or a registered node.
    pub fn ensure_known(&self, selector: &Selector<K>) -> AclResult<()> {
        match selector {
            Selector::Any => Ok(()),
            Selector::Exact(node) if self.contains(node) => Ok(()),
            Selector::Exact(node) => Err(AclError::unknown(self.kind, node)),
        }
    }

    /// Direct parents of a node. Unknown nodes have none.
    pub fn parents(&self, node: &K) -> &[K] {
        self.parents.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All registered nodes, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &K> {
        self.parents.keys()
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Check if no node is registered.
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Every transitive ancestor of `node`, depth first, each exactly once.
    ///
    /// The node itself is not included, even when a permitted cycle leads back to it.
    pub fn ancestors(&self, node: &K) -> Vec<K> {
        walk(&self.parents, node)
    }

    /// Every transitive descendant of `node`, each exactly once.
    pub fn descendants(&self, node: &K) -> Vec<K> {
        walk(&self.children, node)
    }

    /// Check if `candidate` is a transitive ancestor of `node`.
    pub fn is_ancestor(&self, candidate: &K, node: &K) -> bool {
        let mut stack: Vec<&K> = self.parents(node).iter().collect();
        let mut seen: HashSet<&K> = HashSet::new();
        while let Some(current) = stack.pop() {
            if current == candidate {
                return true;
            }
            if seen.insert(current) {
                stack.extend(self.parents(current));
            }
        }
        false
    }

    /// The node, its ancestors, then `Any`.
    ///
    /// The closure of `Any` is just `[Any]`.
    pub fn closure(&self, selector: &Selector<K>) -> Vec<Selector<K>> {
        let mut closure = Vec::new();
        if let Selector::Exact(node) = selector {
            closure.push(Selector::Exact(node.clone()));
            closure.extend(self.ancestors(node).into_iter().map(Selector::Exact));
        }
        closure.push(Selector::Any);
        closure
    }
}

/// Depth-first preorder walk over `edges` starting below `start`.
fn walk<K>(edges: &HashMap<K, Vec<K>>, start: &K) -> Vec<K>
where
    K: Clone + Eq + Hash,
{
    let mut out = Vec::new();
    let mut seen: HashSet<&K> = HashSet::new();
    seen.insert(start);

    let mut stack: Vec<&K> = match edges.get(start) {
        Some(next) => next.iter().rev().collect(),
        None => return out,
    };
    while let Some(current) = stack.pop() {
        if !seen.insert(current) {
            continue;
        }
        out.push(current.clone());
        if let Some(next) = edges.get(current) {
            stack.extend(next.iter().rev());
        }
    }
    out
}
