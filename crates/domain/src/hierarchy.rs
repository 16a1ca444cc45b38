//! Assembled hierarchy trees and cascade deletion plans.
//!
//! Both are plain values produced by the app layer's subtree collector.
//! Keeping the "collect" phase separate from the "apply" phase lets a
//! caller inspect a cascade before running it.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::document::{CHILDREN, Document, id_of};
use crate::id::ObjectId;
use crate::kind::Kind;

/// One node of an assembled hierarchy.
///
/// Serializes as the node's document with an optional `children` array.
/// Nodes at the end level carry no `children` key at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    #[serde(skip)]
    pub kind: Kind,
    #[serde(flatten)]
    pub document: Document,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    /// Exposed `id` of the node.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        id_of(&self.document)
    }

    /// Direct children, empty when the node was not expanded.
    #[must_use]
    pub fn children(&self) -> &[TreeNode] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Convert into a plain document carrying `children` recursively.
    #[must_use]
    pub fn into_document(self) -> Document {
        let mut document = self.document;
        if let Some(children) = self.children {
            let children = children
                .into_iter()
                .map(|child| Value::Object(child.into_document()))
                .collect();
            document.insert(CHILDREN.to_string(), Value::Array(children));
        }
        document
    }

    /// Every descendant grouped by level, keyed `"<kind>s"`, in depth-first
    /// order. The node itself is not included; documents carry no
    /// `children` key.
    #[must_use]
    pub fn flatten(&self) -> BTreeMap<String, Vec<Document>> {
        let mut levels: BTreeMap<String, Vec<Document>> = BTreeMap::new();
        let mut stack: Vec<&TreeNode> = self.children().iter().rev().collect();
        while let Some(node) = stack.pop() {
            levels
                .entry(node.kind.nested_field())
                .or_default()
                .push(node.document.clone());
            stack.extend(node.children().iter().rev());
        }
        levels
    }

    /// Number of nodes in the tree, this one included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(TreeNode::node_count)
            .sum::<usize>()
    }
}

/// One deletion in a cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanStep {
    pub kind: Kind,
    pub id: ObjectId,
}

/// Ordered deletions for a cascade: every descendant precedes its parent,
/// the root comes last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionPlan {
    steps: Vec<PlanStep>,
}

impl DeletionPlan {
    /// Build a plan from steps listed parent-first (pre-order); the plan
    /// reverses them so children are deleted before their parents.
    #[must_use]
    pub fn from_pre_order(mut steps: Vec<PlanStep>) -> Self {
        steps.reverse();
        Self { steps }
    }

    #[must_use]
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The entity the cascade was planned for.
    #[must_use]
    pub fn root(&self) -> Option<PlanStep> {
        self.steps.last().copied()
    }
}
