//! The tree: an arena that owns every node of one compilation unit.
//!
//! Nodes are addressed by copyable [`NodeId`]s into a slab owned by the
//! [`Tree`]. Ownership flows strictly child-from-parent through each node's
//! ordered child list; the parent id stored on every node is a non-owning
//! back-reference used only for contextual queries (never for ownership, so
//! the structure stays a tree, not a graph).
//!
//! Re-parenting is atomic: [`adopt`](Tree::adopt) severs the child's old
//! parent link before establishing the new one, so a node has exactly one
//! live owner at any time. Detached subtrees stay in the arena unreachable
//! from the root until the job's tree is dropped wholesale; passes either
//! re-attach them elsewhere or simply leave them behind.
//!
//! Besides the root, the tree owns two side channels used by passes: the
//! pending-removal set for rulesets slated for deletion (mark now, sweep
//! later, so a marking pass never disturbs a traversal in progress
//! elsewhere) and the originating source unit for error messages.

use std::fmt::Write as _;
use std::num::NonZeroU32;
use std::sync::Arc;

use thiserror::Error;

use crate::location::{SourceLocation, SourceUnit};
use crate::node::{AtRuleKind, BlockKind, Branch, Comment, NodeKind};

/// Errors produced by structural tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A block was attached in a context that requires braces, but the
    /// block is not brace-delimited.
    #[error("invalid block structure: {0}")]
    InvalidBlockStructure(String),
}

/// A stable handle to a node in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    fn from_index(index: usize) -> Self {
        let raw = u32::try_from(index + 1).expect("arena overflow");
        Self(NonZeroU32::new(raw).expect("index + 1 is nonzero"))
    }

    fn index(self) -> usize {
        self.0.get() as usize - 1
    }
}

/// One node record: kind payload, ordered children, non-owning parent
/// back-reference, and the shared capability set (location, comments,
/// structured flags).
#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    location: Option<SourceLocation>,
    comments: Vec<Comment>,
    /// `/* @default */` - this value node is the overridable default of its
    /// definition.
    default_value: bool,
    /// `/* @noflip */` - directional flipping must not touch this subtree.
    no_flip: bool,
}

/// The arena owning every node of one compilation unit.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<NodeData>,
    root: NodeId,
    pending_removal: Vec<NodeId>,
    source: Option<Arc<SourceUnit>>,
}

impl Tree {
    /// Create an empty tree: a root with an import block and a body block.
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            // Patched immediately below; ids are 1-based.
            root: NodeId::from_index(0),
            pending_removal: Vec::new(),
            source: None,
        };
        let root = tree.alloc(NodeKind::Root { has_charset: false });
        let imports = tree.alloc(NodeKind::Block {
            kind: BlockKind::Imports,
            braces: false,
        });
        let body = tree.alloc(NodeKind::Block {
            kind: BlockKind::Rulesets,
            braces: false,
        });
        tree.root = root;
        tree.adopt(root, imports, 0);
        tree.adopt(root, body, 1);
        tree
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The originating source unit, for error messages.
    pub fn source(&self) -> Option<&Arc<SourceUnit>> {
        self.source.as_ref()
    }

    /// Record the originating source unit.
    pub fn set_source(&mut self, source: Arc<SourceUnit>) {
        self.source = Some(source);
    }

    // =====================================================================
    // Allocation and the shared capability set
    // =====================================================================

    /// Allocate a new parentless node.
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            children: Vec::new(),
            parent: None,
            location: None,
            comments: Vec::new(),
            default_value: false,
            no_flip: false,
        });
        id
    }

    /// Allocate a new parentless node with a source location.
    pub fn alloc_at(&mut self, kind: NodeKind, location: SourceLocation) -> NodeId {
        let id = self.alloc(kind);
        self.nodes[id.index()].location = Some(location);
        id
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    /// The node's kind payload.
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.data(id).kind
    }

    /// Mutable access to the node's kind payload.
    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.data_mut(id).kind
    }

    /// The node's source location, if the parser recorded one.
    pub fn location(&self, id: NodeId) -> Option<&SourceLocation> {
        self.data(id).location.as_ref()
    }

    /// Set the node's source location.
    pub fn set_location(&mut self, id: NodeId, location: SourceLocation) {
        self.data_mut(id).location = Some(location);
    }

    /// Comments attached to the node.
    pub fn comments(&self, id: NodeId) -> &[Comment] {
        &self.data(id).comments
    }

    /// Attach a comment to the node.
    pub fn add_comment(&mut self, id: NodeId, comment: Comment) {
        self.data_mut(id).comments.push(comment);
    }

    /// Whether the node carries a comment that is exactly `annotation`.
    pub fn has_annotation(&self, id: NodeId, annotation: &str) -> bool {
        self.data(id)
            .comments
            .iter()
            .any(|c| c.is_annotation(annotation))
    }

    /// Whether this value node is its definition's default.
    pub fn is_default_value(&self, id: NodeId) -> bool {
        self.data(id).default_value
    }

    /// Mark this value node as its definition's default.
    pub fn set_default_value(&mut self, id: NodeId, default: bool) {
        self.data_mut(id).default_value = default;
    }

    /// Whether flipping is suppressed directly on this node.
    pub fn no_flip(&self, id: NodeId) -> bool {
        self.data(id).no_flip
    }

    /// Suppress directional flipping for this subtree.
    pub fn set_no_flip(&mut self, id: NodeId, no_flip: bool) {
        self.data_mut(id).no_flip = no_flip;
    }

    /// Whether flipping is suppressed on this node or any ancestor.
    pub fn flip_suppressed(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            if self.data(node).no_flip {
                return true;
            }
            cursor = self.data(node).parent;
        }
        false
    }

    // =====================================================================
    // Ownership
    // =====================================================================

    /// The node's parent, or `None` for the root and detached nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    /// The node's ordered children.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.data(id).children
    }

    /// Make `parent` the owner of `child`, inserting it at `index` in the
    /// child list. Atomically severs any previous owner first.
    pub fn adopt(&mut self, parent: NodeId, child: NodeId, index: usize) {
        assert_ne!(child, self.root, "the root cannot be adopted");
        self.orphan(child);
        self.data_mut(parent).children.insert(index, child);
        self.data_mut(child).parent = Some(parent);
    }

    /// Append `child` to `parent`'s child list, severing any previous
    /// owner.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let index = self.data(parent).children.len();
        self.adopt(parent, child, index);
    }

    /// Sever `child` from its parent, if it has one. The subtree stays in
    /// the arena, detached.
    pub fn orphan(&mut self, child: NodeId) {
        if let Some(parent) = self.data(child).parent {
            let children = &mut self.data_mut(parent).children;
            let position = children
                .iter()
                .position(|&c| c == child)
                .expect("parent link without child entry");
            children.remove(position);
            self.data_mut(child).parent = None;
        }
    }

    /// Replace the child at `index` of `parent` with `replacements`,
    /// detaching the old child. Returns the detached child.
    pub fn splice(&mut self, parent: NodeId, index: usize, replacements: &[NodeId]) -> NodeId {
        let old = self.data(parent).children[index];
        self.data_mut(old).parent = None;
        self.data_mut(parent).children.remove(index);
        for (offset, &replacement) in replacements.iter().enumerate() {
            self.adopt(parent, replacement, index + offset);
        }
        old
    }

    // =====================================================================
    // Structured child access
    // =====================================================================

    /// A ruleset's selectors (all children but the last).
    pub fn ruleset_selectors(&self, ruleset: NodeId) -> &[NodeId] {
        debug_assert!(matches!(self.kind(ruleset), NodeKind::Ruleset));
        let children = self.children(ruleset);
        &children[..children.len() - 1]
    }

    /// A ruleset's declaration block (the last child).
    pub fn ruleset_block(&self, ruleset: NodeId) -> NodeId {
        debug_assert!(matches!(self.kind(ruleset), NodeKind::Ruleset));
        *self.children(ruleset).last().expect("ruleset without block")
    }

    /// Attach `block` as a ruleset's declaration block.
    ///
    /// # Errors
    ///
    /// Fails with [`TreeError::InvalidBlockStructure`] unless `block` is a
    /// brace-delimited declarations block.
    pub fn set_ruleset_block(&mut self, ruleset: NodeId, block: NodeId) -> Result<(), TreeError> {
        self.require_braced(block, "a ruleset body")?;
        self.append(ruleset, block);
        Ok(())
    }

    /// A declaration's property node (the first child).
    pub fn declaration_property(&self, declaration: NodeId) -> NodeId {
        debug_assert!(matches!(self.kind(declaration), NodeKind::Declaration { .. }));
        self.children(declaration)[0]
    }

    /// A declaration's value nodes (all children but the first).
    pub fn declaration_values(&self, declaration: NodeId) -> &[NodeId] {
        debug_assert!(matches!(self.kind(declaration), NodeKind::Declaration { .. }));
        &self.children(declaration)[1..]
    }

    /// An at-rule's parameter values (children before the block).
    pub fn at_rule_params(&self, at_rule: NodeId) -> &[NodeId] {
        let NodeKind::AtRule { has_block, .. } = *self.kind(at_rule) else {
            panic!("at_rule_params on {}", self.kind(at_rule).kind_name());
        };
        let children = self.children(at_rule);
        if has_block {
            &children[..children.len() - 1]
        } else {
            children
        }
    }

    /// An at-rule's block, if it has one (the last child).
    pub fn at_rule_block(&self, at_rule: NodeId) -> Option<NodeId> {
        let NodeKind::AtRule { has_block, .. } = *self.kind(at_rule) else {
            panic!("at_rule_block on {}", self.kind(at_rule).kind_name());
        };
        has_block.then(|| *self.children(at_rule).last().expect("at-rule without block"))
    }

    /// Attach `block` to an at-rule, marking it block-bearing.
    ///
    /// # Errors
    ///
    /// Fails with [`TreeError::InvalidBlockStructure`] unless `block` is
    /// brace-delimited.
    pub fn set_at_rule_block(&mut self, at_rule: NodeId, block: NodeId) -> Result<(), TreeError> {
        self.require_braced(block, "an at-rule body")?;
        let NodeKind::AtRule { has_block, .. } = self.kind_mut(at_rule) else {
            panic!("set_at_rule_block on a non-at-rule node");
        };
        assert!(!*has_block, "at-rule already has a block");
        *has_block = true;
        self.append(at_rule, block);
        Ok(())
    }

    /// The root's charset at-rule, if present.
    pub fn root_charset(&self, root: NodeId) -> Option<NodeId> {
        let NodeKind::Root { has_charset } = *self.kind(root) else {
            panic!("root_charset on {}", self.kind(root).kind_name());
        };
        has_charset.then(|| self.children(root)[0])
    }

    /// The root's import block.
    pub fn root_imports(&self, root: NodeId) -> NodeId {
        let NodeKind::Root { has_charset } = *self.kind(root) else {
            panic!("root_imports on {}", self.kind(root).kind_name());
        };
        self.children(root)[usize::from(has_charset)]
    }

    /// The root's body block.
    pub fn root_body(&self, root: NodeId) -> NodeId {
        let NodeKind::Root { has_charset } = *self.kind(root) else {
            panic!("root_body on {}", self.kind(root).kind_name());
        };
        self.children(root)[usize::from(has_charset) + 1]
    }

    /// Shortcut for the current tree's body block.
    pub fn body(&self) -> NodeId {
        self.root_body(self.root)
    }

    /// A conditional rule's condition value, when the branch carries one.
    pub fn conditional_condition(&self, rule: NodeId) -> Option<NodeId> {
        let NodeKind::ConditionalRule { has_condition, .. } = *self.kind(rule) else {
            panic!("conditional_condition on {}", self.kind(rule).kind_name());
        };
        has_condition.then(|| self.children(rule)[0])
    }

    /// A conditional rule's block.
    pub fn conditional_block(&self, rule: NodeId) -> NodeId {
        debug_assert!(matches!(self.kind(rule), NodeKind::ConditionalRule { .. }));
        *self.children(rule).last().expect("conditional rule without block")
    }

    /// A for-loop's `from` bound.
    pub fn for_from(&self, for_loop: NodeId) -> NodeId {
        debug_assert!(matches!(self.kind(for_loop), NodeKind::ForLoop { .. }));
        self.children(for_loop)[0]
    }

    /// A for-loop's `to` bound.
    pub fn for_to(&self, for_loop: NodeId) -> NodeId {
        debug_assert!(matches!(self.kind(for_loop), NodeKind::ForLoop { .. }));
        self.children(for_loop)[1]
    }

    /// A for-loop's `step`, if present.
    pub fn for_step(&self, for_loop: NodeId) -> Option<NodeId> {
        let NodeKind::ForLoop { has_step, .. } = *self.kind(for_loop) else {
            panic!("for_step on {}", self.kind(for_loop).kind_name());
        };
        has_step.then(|| self.children(for_loop)[2])
    }

    /// A for-loop's body block (the last child).
    pub fn for_block(&self, for_loop: NodeId) -> NodeId {
        debug_assert!(matches!(self.kind(for_loop), NodeKind::ForLoop { .. }));
        *self.children(for_loop).last().expect("for-loop without block")
    }

    /// A selector's refiners (children before the chained selector).
    pub fn selector_refiners(&self, selector: NodeId) -> &[NodeId] {
        let NodeKind::Selector { combinator, .. } = self.kind(selector) else {
            panic!("selector_refiners on {}", self.kind(selector).kind_name());
        };
        let children = self.children(selector);
        if combinator.is_some() {
            &children[..children.len() - 1]
        } else {
            children
        }
    }

    /// The selector chained behind this one's combinator, if any.
    pub fn selector_chained(&self, selector: NodeId) -> Option<NodeId> {
        let NodeKind::Selector { combinator, .. } = self.kind(selector) else {
            panic!("selector_chained on {}", self.kind(selector).kind_name());
        };
        combinator
            .is_some()
            .then(|| *self.children(selector).last().expect("combinator without chain"))
    }

    fn require_braced(&self, block: NodeId, context: &str) -> Result<(), TreeError> {
        match self.kind(block) {
            NodeKind::Block { braces: true, .. } => Ok(()),
            NodeKind::Block { braces: false, .. } => Err(TreeError::InvalidBlockStructure(
                format!("{context} must be enclosed with braces"),
            )),
            other => Err(TreeError::InvalidBlockStructure(format!(
                "{context} must be a block, found {}",
                other.kind_name()
            ))),
        }
    }

    // =====================================================================
    // Deep copy
    // =====================================================================

    /// Produce a fully independent copy of the subtree rooted at `id`.
    ///
    /// The copy has the same shape, values, comments, and flags, but shares
    /// no child ownership with the original; the copy's root is detached.
    pub fn deep_copy(&mut self, id: NodeId) -> NodeId {
        let NodeData {
            kind,
            children,
            location,
            comments,
            default_value,
            no_flip,
            ..
        } = self.data(id).clone();

        let copy = self.alloc(kind);
        {
            let data = self.data_mut(copy);
            data.location = location;
            data.comments = comments;
            data.default_value = default_value;
            data.no_flip = no_flip;
        }
        for child in children {
            let child_copy = self.deep_copy(child);
            self.append(copy, child_copy);
        }
        copy
    }

    /// Move the shared capability set - location, comments, flags - from
    /// one node onto another.
    ///
    /// Used by passes that replace a node with a typed equivalent (an
    /// unknown at-rule becoming a definition, say): the new node takes
    /// over the old node's provenance, and comment conventions like
    /// `/* @default */` keep riding with the construct they annotate.
    pub fn transfer_metadata(&mut self, from: NodeId, to: NodeId) {
        let location = self.data(from).location.clone();
        let comments = std::mem::take(&mut self.data_mut(from).comments);
        let default_value = self.data(from).default_value;
        let no_flip = self.data(from).no_flip;

        let data = self.data_mut(to);
        if data.location.is_none() {
            data.location = location;
        }
        data.comments.extend(comments);
        data.default_value |= default_value;
        data.no_flip |= no_flip;
    }

    /// Replace every child after index `keep` with `new_children`,
    /// detaching the old ones.
    ///
    /// `keep = 0` rebuilds the whole child list; a declaration passes
    /// `keep = 1` to leave its property slot alone.
    pub fn rebuild_children(&mut self, parent: NodeId, keep: usize, new_children: Vec<NodeId>) {
        while self.data(parent).children.len() > keep {
            let last = *self.data(parent).children.last().expect("len checked");
            self.orphan(last);
        }
        for child in new_children {
            self.append(parent, child);
        }
    }

    // =====================================================================
    // Pending removal
    // =====================================================================

    /// Mark a ruleset for removal by a later sweep, without disturbing any
    /// traversal currently in progress.
    pub fn mark_for_removal(&mut self, id: NodeId) {
        if !self.pending_removal.contains(&id) {
            self.pending_removal.push(id);
        }
    }

    /// Whether the node is marked for removal.
    pub fn is_marked_for_removal(&self, id: NodeId) -> bool {
        self.pending_removal.contains(&id)
    }

    /// Drain the pending-removal set.
    pub fn take_pending_removals(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.pending_removal)
    }

    // =====================================================================
    // Rendering
    // =====================================================================

    /// Render the subtree as a compact structural fingerprint.
    ///
    /// The output is a pure function of node state, stable and unambiguous,
    /// and is used by tests to compare trees: one ruleset renders as
    /// `[a]{[b:[c]]}`, a whole body as `[[a]{[b:[c]]}]`.
    pub fn render(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.render_into(id, &mut out);
        out
    }

    fn render_list(&self, ids: &[NodeId], separator: &str, out: &mut String) {
        for (index, &id) in ids.iter().enumerate() {
            if index > 0 {
                out.push_str(separator);
            }
            self.render_into(id, out);
        }
    }

    fn render_into(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Root { .. } => {
                if let Some(charset) = self.root_charset(id) {
                    self.render_into(charset, out);
                }
                self.render_into(self.root_imports(id), out);
                self.render_into(self.root_body(id), out);
            }
            NodeKind::Block { kind, .. } => {
                out.push('[');
                let separator = match kind {
                    BlockKind::Declarations => ";",
                    BlockKind::Rulesets | BlockKind::Imports => "",
                };
                self.render_list(self.children(id), separator, out);
                out.push(']');
            }
            NodeKind::Ruleset => {
                out.push('[');
                self.render_list(self.ruleset_selectors(id), ",", out);
                out.push_str("]{");
                self.render_into(self.ruleset_block(id), out);
                out.push('}');
            }
            NodeKind::Selector { element, combinator } => {
                if let Some(element) = element {
                    out.push_str(element);
                }
                for &refiner in self.selector_refiners(id) {
                    self.render_into(refiner, out);
                }
                if let (Some(combinator), Some(next)) = (combinator, self.selector_chained(id)) {
                    out.push_str(combinator.as_str());
                    self.render_into(next, out);
                }
            }
            NodeKind::ClassRefiner { name } => {
                let _ = write!(out, ".{name}");
            }
            NodeKind::IdRefiner { name } => {
                let _ = write!(out, "#{name}");
            }
            NodeKind::PseudoClass { name, has_argument } => {
                let _ = write!(out, ":{name}");
                if *has_argument {
                    out.push('(');
                    self.render_into(self.children(id)[0], out);
                    out.push(')');
                }
            }
            NodeKind::PseudoElement { name } => {
                let _ = write!(out, "::{name}");
            }
            NodeKind::AttributeRefiner { expr } => {
                let _ = write!(out, "[{expr}]");
            }
            NodeKind::Property(property) => {
                let _ = write!(out, "{}", property.name());
            }
            NodeKind::Declaration { important } => {
                self.render_into(self.declaration_property(id), out);
                out.push_str(":[");
                self.render_list(self.declaration_values(id), ",", out);
                out.push(']');
                if *important {
                    out.push_str("!important");
                }
            }
            NodeKind::Literal { value } => out.push_str(value),
            NodeKind::Numeric { repr, unit, .. } => {
                let _ = write!(out, "{repr}{unit}");
            }
            NodeKind::Str { value, quote } => {
                let q = quote.char();
                let _ = write!(out, "{q}{value}{q}");
            }
            NodeKind::FunctionCall { name } => {
                let _ = write!(out, "{name}(");
                // A name-less call is a parenthesized group; its contents
                // are space-separated, not an argument list.
                let separator = if name.is_empty() { " " } else { "," };
                self.render_list(self.children(id), separator, out);
                out.push(')');
            }
            NodeKind::Composite { op } => {
                self.render_list(self.children(id), op.separator(), out);
            }
            NodeKind::LoopVariable { name } => {
                let _ = write!(out, "${name}");
            }
            NodeKind::AtRule { kind, name, has_block } => {
                let canonical = kind.canonical_name().unwrap_or(name);
                let _ = write!(out, "@{canonical}");
                let params = self.at_rule_params(id);
                if !params.is_empty() {
                    out.push(' ');
                    self.render_list(params, " ", out);
                }
                if *has_block {
                    out.push('{');
                    self.render_into(self.at_rule_block(id).expect("has_block"), out);
                    out.push('}');
                } else {
                    out.push(';');
                }
            }
            NodeKind::Definition { name } => {
                let _ = write!(out, "@def {name} [");
                self.render_list(self.children(id), ",", out);
                out.push_str("];");
            }
            NodeKind::ConditionalBlock => {
                self.render_list(self.children(id), "", out);
            }
            NodeKind::ConditionalRule { branch, .. } => {
                let _ = write!(out, "@{}", branch.name());
                if let Some(condition) = self.conditional_condition(id) {
                    out.push_str(" [");
                    self.render_into(condition, out);
                    out.push(']');
                }
                out.push('{');
                self.render_into(self.conditional_block(id), out);
                out.push('}');
            }
            NodeKind::ForLoop { variable, .. } => {
                let _ = write!(out, "@for ${variable} from ");
                self.render_into(self.for_from(id), out);
                out.push_str(" to ");
                self.render_into(self.for_to(id), out);
                if let Some(step) = self.for_step(id) {
                    out.push_str(" step ");
                    self.render_into(step, out);
                }
                out.push('{');
                self.render_into(self.for_block(id), out);
                out.push('}');
            }
            NodeKind::MixinDefinition { name, formals } => {
                let _ = write!(out, "@defmixin {name}({})", formals.join(","));
                out.push('{');
                self.render_into(*self.children(id).last().expect("defmixin block"), out);
                out.push('}');
            }
            NodeKind::MixinCall { name } => {
                let _ = write!(out, "@mixin {name}(");
                self.render_list(self.children(id), ",", out);
                out.push_str(");");
            }
            NodeKind::Component {
                name,
                parent,
                is_abstract,
            } => {
                let keyword = if *is_abstract {
                    "abstract-component"
                } else {
                    "component"
                };
                let _ = write!(out, "@{keyword} {name}");
                if let Some(parent) = parent {
                    let _ = write!(out, " extends {parent}");
                }
                out.push('{');
                self.render_into(*self.children(id).last().expect("component block"), out);
                out.push('}');
            }
        }
    }

    // =====================================================================
    // Consistency checking
    // =====================================================================

    /// Verify the structural invariants that must hold after every pass:
    /// every reachable child reports its parent, no node is owned twice,
    /// and block child-kind constraints are satisfied.
    ///
    /// Used by tests and property tests; not called on the hot path.
    pub fn check_consistency(&self) -> Result<(), String> {
        let mut seen = vec![false; self.nodes.len()];
        self.check_node(self.root, None, &mut seen)
    }

    fn check_node(
        &self,
        id: NodeId,
        expected_parent: Option<NodeId>,
        seen: &mut [bool],
    ) -> Result<(), String> {
        if seen[id.index()] {
            return Err(format!(
                "{} node owned more than once",
                self.kind(id).kind_name()
            ));
        }
        seen[id.index()] = true;

        if self.parent(id) != expected_parent {
            return Err(format!(
                "{} node's parent link does not match its owner",
                self.kind(id).kind_name()
            ));
        }

        if let NodeKind::Block { kind, .. } = self.kind(id) {
            for &child in self.children(id) {
                if !kind.accepts(self.kind(child)) {
                    return Err(format!(
                        "{:?} block does not accept {} child",
                        kind,
                        self.kind(child).kind_name()
                    ));
                }
            }
        }

        for &child in self.children(id) {
            self.check_node(child, Some(id), seen)?;
        }
        Ok(())
    }

    /// Number of allocated nodes, including detached ones. Test-facing.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience constructors used by the parser and by passes that
/// synthesize structure.
impl Tree {
    /// Allocate a brace-delimited declarations block.
    pub fn alloc_declaration_block(&mut self) -> NodeId {
        self.alloc(NodeKind::Block {
            kind: BlockKind::Declarations,
            braces: true,
        })
    }

    /// Allocate a brace-delimited rulesets block.
    pub fn alloc_ruleset_block(&mut self) -> NodeId {
        self.alloc(NodeKind::Block {
            kind: BlockKind::Rulesets,
            braces: true,
        })
    }

    /// Allocate a conditional rule with the given branch, condition, and
    /// block.
    pub fn alloc_conditional_rule(
        &mut self,
        branch: Branch,
        condition: Option<NodeId>,
        block: NodeId,
    ) -> NodeId {
        let rule = self.alloc(NodeKind::ConditionalRule {
            branch,
            has_condition: condition.is_some(),
        });
        if let Some(condition) = condition {
            self.append(rule, condition);
        }
        self.append(rule, block);
        rule
    }

    /// Whether the at-rule node has the given typed kind.
    pub fn is_at_rule(&self, id: NodeId, expected: AtRuleKind) -> bool {
        matches!(self.kind(id), NodeKind::AtRule { kind, .. } if *kind == expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::Name;
    use crate::property::Property;

    /// Build `.a { b: c }` into the tree body and return the ruleset id.
    fn build_simple_ruleset(tree: &mut Tree) -> NodeId {
        let selector = tree.alloc(NodeKind::Selector {
            element: Some("a".into()),
            combinator: None,
        });
        let property = tree.alloc(NodeKind::Property(Property::new("b")));
        let value = tree.alloc(NodeKind::Literal { value: "c".into() });
        let declaration = tree.alloc(NodeKind::Declaration { important: false });
        tree.append(declaration, property);
        tree.append(declaration, value);

        let block = tree.alloc_declaration_block();
        tree.append(block, declaration);

        let ruleset = tree.alloc(NodeKind::Ruleset);
        tree.append(ruleset, selector);
        tree.set_ruleset_block(ruleset, block).unwrap();

        let body = tree.body();
        tree.append(body, ruleset);
        ruleset
    }

    #[test]
    fn test_new_tree_is_consistent() {
        let tree = Tree::new();
        tree.check_consistency().unwrap();
        assert_eq!(tree.render(tree.root()), "[][]");
    }

    #[test]
    fn test_ruleset_fingerprint() {
        let mut tree = Tree::new();
        build_simple_ruleset(&mut tree);
        tree.check_consistency().unwrap();
        assert_eq!(tree.render(tree.body()), "[[a]{[b:[c]]}]");
    }

    #[test]
    fn test_adopt_severs_previous_owner() {
        let mut tree = Tree::new();
        let ruleset = build_simple_ruleset(&mut tree);
        let block = tree.ruleset_block(ruleset);
        let declaration = tree.children(block)[0];

        let other_block = tree.alloc_declaration_block();
        tree.append(other_block, declaration);

        assert_eq!(tree.parent(declaration), Some(other_block));
        assert!(tree.children(block).is_empty());
    }

    #[test]
    fn test_orphan_detaches_both_directions() {
        let mut tree = Tree::new();
        let ruleset = build_simple_ruleset(&mut tree);
        tree.orphan(ruleset);

        assert_eq!(tree.parent(ruleset), None);
        assert!(tree.children(tree.body()).is_empty());
        tree.check_consistency().unwrap();
    }

    #[test]
    fn test_splice_replaces_and_detaches() {
        let mut tree = Tree::new();
        let ruleset = build_simple_ruleset(&mut tree);
        let block = tree.ruleset_block(ruleset);
        let declaration = tree.children(block)[0];

        let property = tree.alloc(NodeKind::Property(Property::new("x")));
        let value = tree.alloc(NodeKind::Literal { value: "y".into() });
        let replacement = tree.alloc(NodeKind::Declaration { important: false });
        tree.append(replacement, property);
        tree.append(replacement, value);

        let detached = tree.splice(block, 0, &[replacement]);
        assert_eq!(detached, declaration);
        assert_eq!(tree.parent(declaration), None);
        assert_eq!(tree.render(block), "[x:[y]]");
        tree.check_consistency().unwrap();
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let mut tree = Tree::new();
        let ruleset = build_simple_ruleset(&mut tree);
        tree.add_comment(ruleset, Comment::new(" @noflip "));

        let copy = tree.deep_copy(ruleset);
        assert_ne!(copy, ruleset);
        assert_eq!(tree.parent(copy), None);
        assert_eq!(tree.render(copy), tree.render(ruleset));
        assert!(tree.has_annotation(copy, "@noflip"));

        // Copying a copy is a fixed point of the fingerprint.
        let copy2 = tree.deep_copy(copy);
        assert_eq!(tree.render(copy2), tree.render(copy));

        // Mutating the copy leaves the original alone.
        let copy_block = tree.ruleset_block(copy);
        let copy_declaration = tree.children(copy_block)[0];
        tree.orphan(copy_declaration);
        assert_eq!(tree.render(ruleset), "[a]{[b:[c]]}");
        assert_eq!(tree.render(copy), "[a]{[]}");
    }

    #[test]
    fn test_unbraced_block_rejected_for_ruleset_body() {
        let mut tree = Tree::new();
        let naked = tree.alloc(NodeKind::Block {
            kind: BlockKind::Declarations,
            braces: false,
        });
        let ruleset = tree.alloc(NodeKind::Ruleset);
        let selector = tree.alloc(NodeKind::Selector {
            element: Some("a".into()),
            combinator: None,
        });
        tree.append(ruleset, selector);

        assert!(matches!(
            tree.set_ruleset_block(ruleset, naked),
            Err(TreeError::InvalidBlockStructure(_))
        ));
    }

    #[test]
    fn test_pending_removal_is_a_set() {
        let mut tree = Tree::new();
        let ruleset = build_simple_ruleset(&mut tree);
        tree.mark_for_removal(ruleset);
        tree.mark_for_removal(ruleset);
        assert!(tree.is_marked_for_removal(ruleset));
        assert_eq!(tree.take_pending_removals(), vec![ruleset]);
        assert!(!tree.is_marked_for_removal(ruleset));
    }

    #[test]
    fn test_class_refiner_rendering() {
        let mut tree = Tree::new();
        let selector = tree.alloc(NodeKind::Selector {
            element: Some("li".into()),
            combinator: None,
        });
        let class = tree.alloc(NodeKind::ClassRefiner {
            name: Name::new("red"),
        });
        tree.append(selector, class);
        assert_eq!(tree.render(selector), "li.red");
    }
}
