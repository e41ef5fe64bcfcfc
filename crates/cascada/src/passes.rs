//! Compiler passes.
//!
//! Each pass is one self-contained rewrite/validation step over a single
//! traversal: a [`Visitor`](cascada_core::visitor::Visitor) implementer
//! with a `run` entry point, constructed with the tree, the error sink,
//! and pass-specific configuration. Passes report problems through the
//! [`ErrorManager`](cascada_core::diagnostics::ErrorManager) and keep
//! going; a malformed construct is left unrewritten rather than aborting
//! the pipeline.
//!
//! Ordering is a hard dependency graph, wired in
//! [`pipeline`](crate::pipeline):
//!
//! - classification (`create_*`) must precede structuring and resolution,
//!   because the resolvers expect already-typed nodes;
//! - definition collection must precede constant-reference substitution,
//!   which must precede custom-function folding;
//! - comment-driven marking (`mark_*`) runs after classification (the
//!   flags land on typed nodes) but reads comment text captured at parse
//!   time;
//! - flipping and renaming run at the end, on fully resolved rules.

use cascada_core::node::NodeKind;
use cascada_core::tree::{NodeId, Tree};

/// Whether the parent block of `current` accepts a replacement of the
/// given kind. Used by the classification passes so a construct written
/// in an impossible position (say `@for` between declarations) is
/// reported instead of spliced into a block that forbids it.
pub(crate) fn block_accepts(tree: &Tree, current: NodeId, replacement: &NodeKind) -> bool {
    match tree.parent(current).map(|parent| tree.kind(parent)) {
        Some(NodeKind::Block { kind, .. }) => kind.accepts(replacement),
        _ => true,
    }
}

pub mod check_dependencies;
pub mod constants;
pub mod create_components;
pub mod create_conditionals;
pub mod create_definitions;
pub mod create_for_loops;
pub mod create_mixins;
pub mod create_standard_at_rules;
pub mod eliminate_conditionals;
pub mod eliminate_empty_rulesets;
pub mod evaluate_compile_constants;
pub mod flip_direction;
pub mod mark_defaults;
pub mod mark_non_flippable;
pub mod rename_classes;
pub mod resolve_components;
pub mod resolve_custom_functions;
pub mod resolve_for_loops;
pub mod resolve_mixins;
