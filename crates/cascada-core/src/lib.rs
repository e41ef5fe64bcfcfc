//! Cascada core - AST, traversal, and diagnostics for the Cascada stylesheet
//! compiler.
//!
//! This crate holds everything the compiler passes share:
//!
//! - `location`: source units and character-exact source locations
//! - `ident`: interned identifier storage for class and property names
//! - `node`: the polymorphic node model (kinds, at-rule metadata, properties)
//! - `tree`: the arena that owns every node and enforces parent/child
//!   ownership
//! - `specificity`: CSS cascade specificity computed from selector refiners
//! - `visitor` / `visit`: the visitor protocol and the mutating visit
//!   controller that walks a tree while passes rewrite it
//! - `diagnostics`: the diagnostic model and the collecting error manager

pub mod diagnostics;
pub mod ident;
pub mod location;
pub mod node;
pub mod property;
pub mod specificity;
pub mod tree;
pub mod visit;
pub mod visitor;

pub use diagnostics::{Diagnostic, ErrorCode, ErrorManager, Severity};
pub use ident::Name;
pub use location::{SourceLocation, SourcePoint, SourceUnit};
pub use node::{
    AtRuleKind, BlockKind, Branch, Combinator, Comment, JoinOp, NodeKind, NodeTag, QuoteStyle,
};
pub use property::Property;
pub use specificity::Specificity;
pub use tree::{NodeId, Tree, TreeError};
pub use visit::VisitController;
pub use visitor::Visitor;
