//! Lowering: parsed records into the arena tree.
//!
//! This is where spans become [`SourceLocation`]s and parsed comments
//! become attached [`Comment`]s. Several source units lower into one tree;
//! per-unit provenance is preserved on every node's location.
//!
//! Only the standard CSS at-rules (`@media`, `@page`, `@font-face`,
//! `@charset`, `@import`) receive their typed kind here. Everything else
//! lowers as [`AtRuleKind::Unknown`]; the classification passes turn the
//! extended at-rules into typed nodes afterwards.

use std::sync::Arc;

use cascada_core::location::{SourceLocation, SourceUnit};
use cascada_core::node::{AtRuleKind, BlockKind, Comment, JoinOp, NodeKind};
use cascada_core::property::Property;
use cascada_core::tree::{NodeId, Tree};

use crate::parser_types::{
    AtRuleP, BlockP, DeclarationP, EntryP, RefinerP, RulesetP, SelectorP, Sheet, StatementP,
    TermP, ValueP,
};
use crate::span::Span;

/// Lower one parsed sheet into `tree`, appending to the root's slots.
pub(crate) fn lower_sheet(tree: &mut Tree, unit: &Arc<SourceUnit>, sheet: Sheet) {
    let ctx = Ctx { unit };

    if let Some(charset) = sheet.charset {
        // Only the first unit's charset lands in the root slot; later ones
        // are dropped, matching the single-charset rule of CSS.
        let root = tree.root();
        if tree.root_charset(root).is_none() {
            let node = ctx.lower_at_rule(tree, charset);
            tree.adopt(root, node, 0);
            let NodeKind::Root { has_charset } = tree.kind_mut(root) else {
                unreachable!("root node");
            };
            *has_charset = true;
        }
    }

    let root = tree.root();
    let imports = tree.root_imports(root);
    for import in sheet.imports {
        let node = ctx.lower_at_rule(tree, import);
        tree.append(imports, node);
    }

    let body = tree.root_body(root);
    for statement in sheet.statements {
        let node = ctx.lower_statement(tree, statement);
        tree.append(body, node);
    }
}

/// Per-unit lowering context.
struct Ctx<'u> {
    unit: &'u Arc<SourceUnit>,
}

impl Ctx<'_> {
    fn location(&self, span: Span) -> SourceLocation {
        self.unit.location(span.start(), span.end())
    }

    fn attach(&self, tree: &mut Tree, node: NodeId, span: Span, comments: Vec<String>) {
        tree.set_location(node, self.location(span));
        for comment in comments {
            tree.add_comment(node, Comment::new(comment));
        }
    }

    fn lower_statement(&self, tree: &mut Tree, statement: StatementP) -> NodeId {
        match statement {
            StatementP::Ruleset(ruleset) => self.lower_ruleset(tree, ruleset),
            StatementP::AtRule(at_rule) => self.lower_at_rule(tree, at_rule),
        }
    }

    fn lower_at_rule(&self, tree: &mut Tree, at_rule: AtRuleP) -> NodeId {
        let canonical = at_rule.name.to_ascii_lowercase();
        let kind = match AtRuleKind::classify(&canonical) {
            standard @ (AtRuleKind::Media
            | AtRuleKind::Page
            | AtRuleKind::FontFace
            | AtRuleKind::Charset
            | AtRuleKind::Import) => standard,
            _ => AtRuleKind::Unknown,
        };

        let node = tree.alloc(NodeKind::AtRule {
            kind,
            name: canonical,
            has_block: false,
        });
        self.attach(tree, node, at_rule.span, at_rule.comments);

        for param in at_rule.params {
            let value = self.lower_value(tree, param);
            tree.append(node, value);
        }
        if let Some(block) = at_rule.block {
            let block = self.lower_block(tree, block);
            tree.set_at_rule_block(node, block)
                .expect("freshly lowered block is braced");
        }
        node
    }

    fn lower_block(&self, tree: &mut Tree, block: BlockP) -> NodeId {
        match block {
            BlockP::Statements(statements) => {
                let node = tree.alloc(NodeKind::Block {
                    kind: BlockKind::Rulesets,
                    braces: true,
                });
                for statement in statements {
                    let child = self.lower_statement(tree, statement);
                    tree.append(node, child);
                }
                node
            }
            BlockP::Declarations(entries) => {
                let node = tree.alloc(NodeKind::Block {
                    kind: BlockKind::Declarations,
                    braces: true,
                });
                for entry in entries {
                    let child = match entry {
                        EntryP::Declaration(declaration) => {
                            self.lower_declaration(tree, declaration)
                        }
                        EntryP::AtRule(at_rule) => self.lower_at_rule(tree, at_rule),
                    };
                    tree.append(node, child);
                }
                node
            }
        }
    }

    fn lower_ruleset(&self, tree: &mut Tree, ruleset: RulesetP) -> NodeId {
        let node = tree.alloc(NodeKind::Ruleset);
        self.attach(tree, node, ruleset.span, ruleset.comments);

        for selector in ruleset.selectors {
            let selector = self.lower_selector(tree, selector);
            tree.append(node, selector);
        }

        let block = self.lower_block(tree, BlockP::Declarations(ruleset.entries));
        tree.set_ruleset_block(node, block)
            .expect("freshly lowered block is braced");
        node
    }

    fn lower_declaration(&self, tree: &mut Tree, declaration: DeclarationP) -> NodeId {
        let node = tree.alloc(NodeKind::Declaration {
            important: declaration.important,
        });
        let span = declaration.span;
        self.attach(tree, node, span, declaration.comments);

        let property = tree.alloc(NodeKind::Property(Property::new(&declaration.property)));
        tree.set_location(property, self.location(span));
        tree.append(node, property);

        for value in declaration.values {
            let value = self.lower_value(tree, value);
            tree.append(node, value);
        }
        node
    }

    fn lower_value(&self, tree: &mut Tree, value: ValueP) -> NodeId {
        let span = value.span;
        let node = match value.term {
            TermP::Literal(text) => tree.alloc(NodeKind::Literal { value: text }),
            TermP::Numeric { repr, value, unit } => {
                tree.alloc(NodeKind::Numeric { repr, value, unit })
            }
            TermP::Str { value, quote } => tree.alloc(NodeKind::Str { value, quote }),
            TermP::LoopVariable(name) => tree.alloc(NodeKind::LoopVariable { name }),
            TermP::Function { name, args } => {
                let node = tree.alloc(NodeKind::FunctionCall { name });
                for arg in args {
                    let arg = self.lower_value(tree, arg);
                    tree.append(node, arg);
                }
                node
            }
            TermP::Paren(inner) => {
                let node = tree.alloc(NodeKind::FunctionCall {
                    name: String::new(),
                });
                for value in inner {
                    let value = self.lower_value(tree, value);
                    tree.append(node, value);
                }
                node
            }
            TermP::Space(items) => {
                let node = tree.alloc(NodeKind::Composite { op: JoinOp::Space });
                for item in items {
                    let item = self.lower_value(tree, item);
                    tree.append(node, item);
                }
                node
            }
            TermP::Comma(items) => {
                let node = tree.alloc(NodeKind::Composite { op: JoinOp::Comma });
                for item in items {
                    let item = self.lower_value(tree, item);
                    tree.append(node, item);
                }
                node
            }
        };
        tree.set_location(node, self.location(span));
        node
    }

    fn lower_selector(&self, tree: &mut Tree, selector: SelectorP) -> NodeId {
        let node = tree.alloc(NodeKind::Selector {
            element: selector.element,
            combinator: selector.next.as_ref().map(|(combinator, _)| *combinator),
        });
        tree.set_location(node, self.location(selector.span));

        for refiner in selector.refiners {
            let refiner = self.lower_refiner(tree, refiner);
            tree.append(node, refiner);
        }
        if let Some((_, next)) = selector.next {
            let next = self.lower_selector(tree, *next);
            tree.append(node, next);
        }
        node
    }

    fn lower_refiner(&self, tree: &mut Tree, refiner: RefinerP) -> NodeId {
        match refiner {
            RefinerP::Class(name) => tree.alloc(NodeKind::ClassRefiner {
                name: cascada_core::ident::Name::new(&name),
            }),
            RefinerP::Id(name) => tree.alloc(NodeKind::IdRefiner {
                name: cascada_core::ident::Name::new(&name),
            }),
            RefinerP::PseudoClass { name, argument } => {
                let node = tree.alloc(NodeKind::PseudoClass {
                    name,
                    has_argument: argument.is_some(),
                });
                if let Some(argument) = argument {
                    let argument = self.lower_selector(tree, *argument);
                    tree.append(node, argument);
                }
                node
            }
            RefinerP::PseudoElement(name) => tree.alloc(NodeKind::PseudoElement { name }),
            RefinerP::Attribute(expr) => tree.alloc(NodeKind::AttributeRefiner { expr }),
        }
    }
}
