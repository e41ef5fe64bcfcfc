//! The polymorphic node model.
//!
//! Every tree element shares one capability set - optional source location,
//! attached comments, a single owning parent, deep copy - carried by the
//! arena's node record (see [`tree`](crate::tree)). What varies per node is
//! its [`NodeKind`]: a closed sum type over every kind of construct the
//! compiler manipulates, from literal values up to the stylesheet root.
//!
//! Child structure is uniform: every node owns an ordered child list in the
//! arena, and the kind determines how positions in that list are
//! interpreted (a ruleset's children are its selectors followed by its
//! declaration block, a declaration's children are its property followed by
//! its values, and so on). The typed accessors live on
//! [`Tree`](crate::tree::Tree).

use serde::Serialize;

use crate::ident::Name;
use crate::property::Property;

/// A comment attached to a node.
///
/// Comments ride along with their owning node: they survive deep copy and
/// relocate with the node when a pass moves it. Passes that turn comment
/// conventions (`/* @default */`, `/* @noflip */`) into structured flags
/// read these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    text: String,
}

impl Comment {
    /// Create a comment from its text without the `/*` `*/` delimiters.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The comment text, delimiters stripped.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the comment consists of exactly the given annotation word,
    /// e.g. `@default` or `@noflip`.
    pub fn is_annotation(&self, annotation: &str) -> bool {
        self.text.trim() == annotation
    }
}

/// Quoting style of a string value, preserved from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QuoteStyle {
    /// `"double"`
    Double,
    /// `'single'`
    Single,
}

impl QuoteStyle {
    /// The quote character.
    pub fn char(self) -> char {
        match self {
            QuoteStyle::Double => '"',
            QuoteStyle::Single => '\'',
        }
    }
}

/// The operator joining a composite value's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JoinOp {
    /// `a, b, c`
    Comma,
    /// `a b c`
    Space,
    /// `a/b`
    Slash,
}

impl JoinOp {
    /// The textual separator used when rendering.
    pub fn separator(self) -> &'static str {
        match self {
            JoinOp::Comma => ",",
            JoinOp::Space => " ",
            JoinOp::Slash => "/",
        }
    }
}

/// A selector combinator to the next selector in a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    Adjacent,
    /// `a ~ b`
    Sibling,
}

impl Combinator {
    /// The textual form used when rendering (descendant renders as a single
    /// space).
    pub fn as_str(self) -> &'static str {
        match self {
            Combinator::Descendant => " ",
            Combinator::Child => ">",
            Combinator::Adjacent => "+",
            Combinator::Sibling => "~",
        }
    }
}

/// Branch kind of a conditional rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// `@if (condition) { ... }`
    If,
    /// `@elseif (condition) { ... }`
    Elseif,
    /// `@else { ... }` - always chain-terminal.
    Else,
}

impl Branch {
    /// The at-rule name this branch was written as.
    pub fn name(self) -> &'static str {
        match self {
            Branch::If => "if",
            Branch::Elseif => "elseif",
            Branch::Else => "else",
        }
    }
}

/// The typed at-rule taxonomy.
///
/// Each kind knows its canonical name, whether it requires a block, and
/// whether it belongs to the conditional family. Standard CSS at-rules the
/// compiler treats as opaque carry [`AtRuleKind::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtRuleKind {
    Media,
    Page,
    FontFace,
    Charset,
    Import,
    Def,
    If,
    Elseif,
    Else,
    For,
    DefMixin,
    Mixin,
    Component,
    AbstractComponent,
    Provide,
    Require,
    /// Any at-rule the compiler does not interpret, including vendor
    /// extensions; printed back out unchanged.
    Unknown,
}

impl AtRuleKind {
    /// Classify a canonical (lower-cased) at-rule name.
    pub fn classify(name: &str) -> AtRuleKind {
        match name {
            "media" => AtRuleKind::Media,
            "page" => AtRuleKind::Page,
            "font-face" => AtRuleKind::FontFace,
            "charset" => AtRuleKind::Charset,
            "import" => AtRuleKind::Import,
            "def" => AtRuleKind::Def,
            "if" => AtRuleKind::If,
            "elseif" => AtRuleKind::Elseif,
            "else" => AtRuleKind::Else,
            "for" => AtRuleKind::For,
            "defmixin" => AtRuleKind::DefMixin,
            "mixin" => AtRuleKind::Mixin,
            "component" => AtRuleKind::Component,
            "abstract-component" | "abstract_component" => AtRuleKind::AbstractComponent,
            "provide" => AtRuleKind::Provide,
            "require" => AtRuleKind::Require,
            _ => AtRuleKind::Unknown,
        }
    }

    /// The canonical at-rule name, or `None` for [`AtRuleKind::Unknown`]
    /// (whose written name is stored on the node).
    pub fn canonical_name(self) -> Option<&'static str> {
        match self {
            AtRuleKind::Media => Some("media"),
            AtRuleKind::Page => Some("page"),
            AtRuleKind::FontFace => Some("font-face"),
            AtRuleKind::Charset => Some("charset"),
            AtRuleKind::Import => Some("import"),
            AtRuleKind::Def => Some("def"),
            AtRuleKind::If => Some("if"),
            AtRuleKind::Elseif => Some("elseif"),
            AtRuleKind::Else => Some("else"),
            AtRuleKind::For => Some("for"),
            AtRuleKind::DefMixin => Some("defmixin"),
            AtRuleKind::Mixin => Some("mixin"),
            AtRuleKind::Component => Some("component"),
            AtRuleKind::AbstractComponent => Some("abstract-component"),
            AtRuleKind::Provide => Some("provide"),
            AtRuleKind::Require => Some("require"),
            AtRuleKind::Unknown => None,
        }
    }

    /// Whether this at-rule requires a braced block.
    pub fn requires_block(self) -> bool {
        matches!(
            self,
            AtRuleKind::Media
                | AtRuleKind::Page
                | AtRuleKind::FontFace
                | AtRuleKind::If
                | AtRuleKind::Elseif
                | AtRuleKind::Else
                | AtRuleKind::For
                | AtRuleKind::DefMixin
                | AtRuleKind::Component
                | AtRuleKind::AbstractComponent
        )
    }

    /// Whether this at-rule is a member of the `@if`/`@elseif`/`@else`
    /// family.
    pub fn is_conditional(self) -> bool {
        matches!(self, AtRuleKind::If | AtRuleKind::Elseif | AtRuleKind::Else)
    }
}

/// What a block contains, which constrains the node kinds it accepts as
/// children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// The body of a ruleset: declarations, mixin calls, conditionals.
    Declarations,
    /// The body of the stylesheet, a media rule, a conditional branch, a
    /// for-loop or a component: rulesets, at-rules, definitions.
    Rulesets,
    /// The root's import slot: import at-rules only.
    Imports,
}

/// The kind-specific payload of a node.
///
/// Child ids live in the arena's uniform child list; variants only carry
/// scalar payload plus the bookkeeping needed to interpret child positions
/// (for example [`NodeKind::AtRule::has_block`] marks whether the last
/// child is the block rather than a parameter).
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Top-level container. Children: optional charset at-rule, then the
    /// import block, then the body block.
    Root {
        /// Whether the first child is a `@charset` at-rule.
        has_charset: bool,
    },

    /// Ordered child container. Children: anything the [`BlockKind`]
    /// permits.
    Block {
        kind: BlockKind,
        /// Whether the block was brace-delimited in source. Contexts that
        /// require braces (at-rule bodies, ruleset bodies) validate this.
        braces: bool,
    },

    /// A ruleset. Children: one or more selectors, then the declaration
    /// block (always the last child).
    Ruleset,

    /// One selector in a chain. Children: refiners, then (if `combinator`
    /// is set) the chained selector as the last child.
    Selector {
        /// Element name; `None` for the universal/implied selector.
        element: Option<String>,
        combinator: Option<Combinator>,
    },

    /// `.name` - class refiner.
    ClassRefiner { name: Name },

    /// `#name` - id refiner.
    IdRefiner { name: Name },

    /// `:name` or `:not(...)`. Children: the argument selector when
    /// `has_argument` is set.
    PseudoClass { name: String, has_argument: bool },

    /// `::name` - pseudo-element refiner.
    PseudoElement { name: String },

    /// `[expr]` - attribute refiner, expression kept textual.
    AttributeRefiner { expr: String },

    /// A property inside a declaration. No children.
    Property(Property),

    /// A declaration. Children: property, then value nodes in source
    /// order.
    Declaration {
        /// `!important` marker.
        important: bool,
    },

    /// An identifier-ish literal value. No children.
    Literal { value: String },

    /// A numeric value: the source magnitude, its parsed value, and a unit
    /// which may be empty. An empty unit is an explicit, queryable state,
    /// never a missing field.
    Numeric {
        repr: String,
        value: f64,
        unit: String,
    },

    /// A string value with its quoting style preserved.
    Str { value: String, quote: QuoteStyle },

    /// A function call value. Children: arguments in source order.
    FunctionCall { name: String },

    /// An operator-joined value list. Children: the joined values.
    Composite { op: JoinOp },

    /// A for-loop variable reference (`$i`) in value position. No
    /// children.
    LoopVariable { name: String },

    /// An at-rule. Children: parameter values, then (if `has_block`) the
    /// block as the last child. `name` preserves the written name;
    /// `kind` is the classification.
    AtRule {
        kind: AtRuleKind,
        name: String,
        has_block: bool,
    },

    /// `@def NAME value...;` once typed. Children: the value nodes.
    Definition { name: String },

    /// An assembled `@if`/`@elseif`/`@else` chain. Children: the
    /// conditional rules in chain order.
    ConditionalBlock,

    /// One branch of a conditional block. Children: the condition value
    /// (when `has_condition`), then the block.
    ConditionalRule { branch: Branch, has_condition: bool },

    /// `@for $i from A to B [step C] { ... }` once typed. Children: from,
    /// to, optional step, then the block.
    ForLoop { variable: String, has_step: bool },

    /// `@defmixin name(FORMAL, ...) { ... }` once typed. Children: the
    /// block.
    MixinDefinition {
        name: String,
        formals: Vec<String>,
    },

    /// `@mixin name(arg, ...);` in declaration position once typed.
    /// Children: the arguments.
    MixinCall { name: String },

    /// `@component name [extends base] { ... }` once typed. Children: the
    /// block.
    Component {
        name: String,
        parent: Option<String>,
        is_abstract: bool,
    },
}

/// Fieldless discriminant of [`NodeKind`], used by the visit controller to
/// dispatch without borrowing the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTag {
    Root,
    Block,
    Ruleset,
    Selector,
    ClassRefiner,
    IdRefiner,
    PseudoClass,
    PseudoElement,
    AttributeRefiner,
    Property,
    Declaration,
    Literal,
    Numeric,
    Str,
    FunctionCall,
    Composite,
    LoopVariable,
    AtRule,
    Definition,
    ConditionalBlock,
    ConditionalRule,
    ForLoop,
    MixinDefinition,
    MixinCall,
    Component,
}

impl NodeKind {
    /// The fieldless discriminant of this kind.
    pub fn tag(&self) -> NodeTag {
        match self {
            NodeKind::Root { .. } => NodeTag::Root,
            NodeKind::Block { .. } => NodeTag::Block,
            NodeKind::Ruleset => NodeTag::Ruleset,
            NodeKind::Selector { .. } => NodeTag::Selector,
            NodeKind::ClassRefiner { .. } => NodeTag::ClassRefiner,
            NodeKind::IdRefiner { .. } => NodeTag::IdRefiner,
            NodeKind::PseudoClass { .. } => NodeTag::PseudoClass,
            NodeKind::PseudoElement { .. } => NodeTag::PseudoElement,
            NodeKind::AttributeRefiner { .. } => NodeTag::AttributeRefiner,
            NodeKind::Property(_) => NodeTag::Property,
            NodeKind::Declaration { .. } => NodeTag::Declaration,
            NodeKind::Literal { .. } => NodeTag::Literal,
            NodeKind::Numeric { .. } => NodeTag::Numeric,
            NodeKind::Str { .. } => NodeTag::Str,
            NodeKind::FunctionCall { .. } => NodeTag::FunctionCall,
            NodeKind::Composite { .. } => NodeTag::Composite,
            NodeKind::LoopVariable { .. } => NodeTag::LoopVariable,
            NodeKind::AtRule { .. } => NodeTag::AtRule,
            NodeKind::Definition { .. } => NodeTag::Definition,
            NodeKind::ConditionalBlock => NodeTag::ConditionalBlock,
            NodeKind::ConditionalRule { .. } => NodeTag::ConditionalRule,
            NodeKind::ForLoop { .. } => NodeTag::ForLoop,
            NodeKind::MixinDefinition { .. } => NodeTag::MixinDefinition,
            NodeKind::MixinCall { .. } => NodeTag::MixinCall,
            NodeKind::Component { .. } => NodeTag::Component,
        }
    }

    /// A short, stable kind name used in traces and panic messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeKind::Root { .. } => "root",
            NodeKind::Block { .. } => "block",
            NodeKind::Ruleset => "ruleset",
            NodeKind::Selector { .. } => "selector",
            NodeKind::ClassRefiner { .. } => "class-refiner",
            NodeKind::IdRefiner { .. } => "id-refiner",
            NodeKind::PseudoClass { .. } => "pseudo-class",
            NodeKind::PseudoElement { .. } => "pseudo-element",
            NodeKind::AttributeRefiner { .. } => "attribute-refiner",
            NodeKind::Property(_) => "property",
            NodeKind::Declaration { .. } => "declaration",
            NodeKind::Literal { .. } => "literal",
            NodeKind::Numeric { .. } => "numeric",
            NodeKind::Str { .. } => "string",
            NodeKind::FunctionCall { .. } => "function-call",
            NodeKind::Composite { .. } => "composite",
            NodeKind::LoopVariable { .. } => "loop-variable",
            NodeKind::AtRule { .. } => "at-rule",
            NodeKind::Definition { .. } => "definition",
            NodeKind::ConditionalBlock => "conditional-block",
            NodeKind::ConditionalRule { .. } => "conditional-rule",
            NodeKind::ForLoop { .. } => "for-loop",
            NodeKind::MixinDefinition { .. } => "mixin-definition",
            NodeKind::MixinCall { .. } => "mixin-call",
            NodeKind::Component { .. } => "component",
        }
    }

    /// Whether nodes of this kind are valid value nodes (usable as
    /// declaration values, function arguments, at-rule parameters).
    pub fn is_value(&self) -> bool {
        matches!(
            self,
            NodeKind::Literal { .. }
                | NodeKind::Numeric { .. }
                | NodeKind::Str { .. }
                | NodeKind::FunctionCall { .. }
                | NodeKind::Composite { .. }
                | NodeKind::LoopVariable { .. }
        )
    }
}

impl BlockKind {
    /// Whether a child of the given kind may live in a block of this kind.
    pub fn accepts(self, child: &NodeKind) -> bool {
        match self {
            BlockKind::Declarations => matches!(
                child,
                NodeKind::Declaration { .. }
                    | NodeKind::MixinCall { .. }
                    | NodeKind::AtRule { .. }
                    | NodeKind::ConditionalBlock
            ),
            BlockKind::Rulesets => matches!(
                child,
                NodeKind::Ruleset
                    | NodeKind::AtRule { .. }
                    | NodeKind::Definition { .. }
                    | NodeKind::ConditionalBlock
                    | NodeKind::ForLoop { .. }
                    | NodeKind::MixinDefinition { .. }
                    | NodeKind::Component { .. }
            ),
            BlockKind::Imports => {
                matches!(child, NodeKind::AtRule { kind: AtRuleKind::Import, .. })
            }
        }
    }
}
