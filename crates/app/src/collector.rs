//! Subtree collection shared by hierarchy assembly and cascade planning.
//!
//! Walks the flat store level by level with an explicit stack, so depth is
//! bounded by memory rather than by the call stack. Every document is
//! visited at most once, which also cuts cycles in the device self-chain.

use std::collections::HashSet;

use infratree_domain::document::{Document, id_of, normalize};
use infratree_domain::error::InfraTreeError;
use infratree_domain::filter::Filter;
use infratree_domain::hierarchy::TreeNode;
use infratree_domain::kind::Kind;

use crate::ports::DocumentStore;

/// Which children a node expands into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Descent {
    /// Follow the facility chain (`kind + 1`) and stop expanding at `end`.
    Chain { end: Kind },
    /// Follow the facility chain plus devices parented by devices.
    Cascade,
}

impl Descent {
    fn levels(self, kind: Kind) -> Vec<Kind> {
        match self {
            Self::Chain { end } if kind == end => Vec::new(),
            Self::Chain { .. } => kind.next_level().into_iter().collect(),
            Self::Cascade => {
                let mut levels: Vec<Kind> = kind.next_level().into_iter().collect();
                if kind == Kind::Device {
                    levels.push(Kind::Device);
                }
                levels
            }
        }
    }
}

struct Slot {
    kind: Kind,
    document: Document,
    children: Option<Vec<usize>>,
}

pub(crate) struct SubtreeCollector<'a, S> {
    store: &'a S,
}

impl<'a, S: DocumentStore + Sync> SubtreeCollector<'a, S> {
    pub(crate) fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Collect everything below `root` (an already normalized document of
    /// `kind`). Nodes whose kind has no further level keep `children` unset.
    pub(crate) async fn collect(
        &self,
        kind: Kind,
        root: Document,
        descent: Descent,
    ) -> Result<TreeNode, InfraTreeError> {
        let mut seen: HashSet<String> = HashSet::new();
        seen.extend(id_of(&root).map(str::to_string));
        let mut arena: Vec<Slot> = Vec::new();
        let mut root_children = None;
        // `None` stands for the root, `Some(i)` for `arena[i]`.
        let mut stack: Vec<Option<usize>> = vec![None];

        while let Some(entry) = stack.pop() {
            let (node_kind, node_doc) = match entry {
                None => (kind, &root),
                Some(index) => (arena[index].kind, &arena[index].document),
            };
            let levels = descent.levels(node_kind);
            if levels.is_empty() {
                continue;
            }
            let parent_id = id_of(node_doc).map(str::to_string);

            let mut children = Vec::new();
            if let Some(parent_id) = parent_id {
                for level in levels {
                    let found = self
                        .store
                        .find_many(level.name(), &Filter::by_parent(&parent_id))
                        .await?;
                    for document in found.into_iter().map(normalize) {
                        if let Some(id) = id_of(&document)
                            && !seen.insert(id.to_string())
                        {
                            continue;
                        }
                        arena.push(Slot {
                            kind: level,
                            document,
                            children: None,
                        });
                        children.push(arena.len() - 1);
                    }
                }
            }
            stack.extend(children.iter().rev().map(|&index| Some(index)));
            match entry {
                None => root_children = Some(children),
                Some(index) => arena[index].children = Some(children),
            }
        }

        let mut built = assemble(arena);
        Ok(TreeNode {
            kind,
            document: root,
            children: root_children.map(|ids| take_children(&mut built, ids)),
        })
    }
}

/// Build every collected node bottom-up. Children always sit at higher
/// arena indices than their parent, so a reverse sweep sees every child
/// finished first.
fn assemble(arena: Vec<Slot>) -> Vec<Option<TreeNode>> {
    let mut built: Vec<Option<TreeNode>> = Vec::with_capacity(arena.len());
    built.resize_with(arena.len(), || None);
    for (index, slot) in arena.into_iter().enumerate().rev() {
        let children = slot.children.map(|ids| take_children(&mut built, ids));
        built[index] = Some(TreeNode {
            kind: slot.kind,
            document: slot.document,
            children,
        });
    }
    built
}

fn take_children(built: &mut [Option<TreeNode>], ids: Vec<usize>) -> Vec<TreeNode> {
    ids.into_iter()
        .filter_map(|child| built[child].take())
        .collect()
}
