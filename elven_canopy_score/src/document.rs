// Section document: an arena of context and leaf nodes plus the indicator
// annotations attached to them.
//
// Nodes and annotations live in flat `Vec`s and refer to each other by index
// (`NodeId`, `AnnotationId`). The node → annotations back-reference is a
// precomputed multimap kept up to date by `attach`, so "what is attached
// here" never walks the annotation list.
//
// Timing is deliberately simple: contexts nest simultaneously (a child
// context starts where its parent starts) and the leaves of one context
// follow one another. That covers a score → staff → voice hierarchy, which
// is all the continuity bookkeeping needs to know about.
//
// Every annotation records the name of the context it governs, resolved at
// attach time from the indicator kind's default scope: the nearest enclosing
// context of that LilyPond type, or the outermost context if there is none.

use crate::error::ScoreError;
use crate::indicator::{Indicator, Scope};
use crate::offset::Offset;
use crate::status::Treatment;
use elven_canopy_tags::Tag;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// A named LilyPond context (`\context Staff = "Cello_Staff"`).
    Context { name: String, lilypond_type: String },
    /// A note, chord or rest (`body`), or a spacer skip when `body` is `None`.
    Leaf {
        duration: Offset,
        body: Option<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub start: Offset,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn context_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Context { name, .. } => Some(name),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub fn duration(&self) -> Offset {
        match &self.kind {
            NodeKind::Leaf { duration, .. } => *duration,
            NodeKind::Context { .. } => Offset::ZERO,
        }
    }
}

/// An indicator attached to a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    pub indicator: Indicator,
    pub node: NodeId,
    /// Name of the context this indicator governs.
    pub context: String,
    pub tag: Tag,
    pub deactivated: bool,
    /// Overrides the node's start when deciding which indicator is in
    /// effect. Negative means bookkeeping only: never emitted as markup.
    pub synthetic_offset: Option<Offset>,
    pub treatment: Option<Treatment>,
}

impl Annotation {
    pub fn is_bookkeeping_only(&self) -> bool {
        self.synthetic_offset.is_some_and(Offset::is_negative)
    }
}

#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
    annotations: Vec<Annotation>,
    by_node: BTreeMap<NodeId, Vec<AnnotationId>>,
    contexts: BTreeMap<String, NodeId>,
}

impl Document {
    /// A document whose outermost context is `name`.
    pub fn new(name: &str, lilypond_type: &str) -> Self {
        let root = Node {
            kind: NodeKind::Context {
                name: name.to_string(),
                lilypond_type: lilypond_type.to_string(),
            },
            parent: None,
            children: Vec::new(),
            start: Offset::ZERO,
        };
        Self {
            nodes: vec![root],
            annotations: Vec::new(),
            by_node: BTreeMap::new(),
            contexts: BTreeMap::from([(name.to_string(), NodeId(0))]),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn push_node(&mut self, parent: NodeId, kind: NodeKind, start: Offset) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            start,
        });
        self.nodes[parent.0 as usize].children.push(id);
        id
    }

    fn require_context(&self, id: NodeId) -> Result<&Node, ScoreError> {
        let node = self.node(id);
        if node.is_leaf() {
            return Err(ScoreError::NotAContext(id.0));
        }
        Ok(node)
    }

    /// Add a context inside `parent`. Context names are unique per document.
    pub fn add_context(
        &mut self,
        parent: NodeId,
        name: &str,
        lilypond_type: &str,
    ) -> Result<NodeId, ScoreError> {
        let start = self.require_context(parent)?.start;
        if self.contexts.contains_key(name) {
            return Err(ScoreError::DuplicateContext(name.to_string()));
        }
        let kind = NodeKind::Context {
            name: name.to_string(),
            lilypond_type: lilypond_type.to_string(),
        };
        let id = self.push_node(parent, kind, start);
        self.contexts.insert(name.to_string(), id);
        Ok(id)
    }

    /// Append a leaf after the last leaf of `context`.
    pub fn add_leaf(
        &mut self,
        context: NodeId,
        duration: Offset,
        body: Option<&str>,
    ) -> Result<NodeId, ScoreError> {
        let parent = self.require_context(context)?;
        let start = parent
            .children
            .iter()
            .map(|&c| self.node(c))
            .filter(|n| n.is_leaf())
            .map(|n| n.start + n.duration())
            .max()
            .unwrap_or(parent.start);
        let kind = NodeKind::Leaf {
            duration,
            body: body.map(str::to_string),
        };
        Ok(self.push_node(context, kind, start))
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn context(&self, name: &str) -> Option<NodeId> {
        self.contexts.get(name).copied()
    }

    pub fn context_names(&self) -> impl Iterator<Item = &str> {
        self.contexts.keys().map(String::as_str)
    }

    fn lilypond_type(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Context { lilypond_type, .. } => Some(lilypond_type),
            NodeKind::Leaf { .. } => None,
        }
    }

    /// All leaves inside `context`, at any depth, in start order.
    pub fn leaves(&self, context: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![context];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if node.is_leaf() {
                leaves.push(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        // Stable: among equal starts, depth-first order decides.
        leaves.sort_by_key(|&id| self.node(id).start);
        leaves
    }

    /// The earliest leaf of `context`, or the context itself if it has none.
    pub fn first_node(&self, context: NodeId) -> NodeId {
        self.leaves(context).first().copied().unwrap_or(context)
    }

    /// Nearest context enclosing `node` (itself included) whose LilyPond type
    /// is `scope`'s, else the outermost context.
    pub fn governing_context(&self, node: NodeId, scope: Scope) -> NodeId {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.lilypond_type(id) == Some(scope.lilypond_type()) {
                return id;
            }
            current = self.node(id).parent;
        }
        self.root()
    }

    /// Attach `indicator` to `node`, governing the context its kind's default
    /// scope resolves to.
    pub fn attach(&mut self, indicator: Indicator, node: NodeId, tag: Tag) -> AnnotationId {
        let scope = indicator.kind().default_scope();
        let context_id = self.governing_context(node, scope);
        let context = self
            .node(context_id)
            .context_name()
            .unwrap_or_default()
            .to_string();
        self.attach_to_context(indicator, node, &context, tag)
    }

    /// Attach `indicator` to `node`, governing the context named `context`.
    pub fn attach_to_context(
        &mut self,
        indicator: Indicator,
        node: NodeId,
        context: &str,
        tag: Tag,
    ) -> AnnotationId {
        let id = AnnotationId(self.annotations.len() as u32);
        self.annotations.push(Annotation {
            indicator,
            node,
            context: context.to_string(),
            tag,
            deactivated: false,
            synthetic_offset: None,
            treatment: None,
        });
        self.by_node.entry(node).or_default().push(id);
        id
    }

    pub fn annotation(&self, id: AnnotationId) -> &Annotation {
        &self.annotations[id.0 as usize]
    }

    pub fn annotation_mut(&mut self, id: AnnotationId) -> &mut Annotation {
        &mut self.annotations[id.0 as usize]
    }

    pub fn annotation_ids(&self) -> impl Iterator<Item = AnnotationId> + use<> {
        (0..self.annotations.len() as u32).map(AnnotationId)
    }

    /// Annotations attached to `node`, in attachment order.
    pub fn annotations_at(&self, node: NodeId) -> &[AnnotationId] {
        self.by_node.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Where an annotation counts as starting: its synthetic offset if it has
    /// one, else its node's start.
    pub fn site_offset(&self, id: AnnotationId) -> Offset {
        let annotation = self.annotation(id);
        annotation
            .synthetic_offset
            .unwrap_or_else(|| self.node(annotation.node).start)
    }
}
