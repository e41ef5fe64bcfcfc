//! The pass pipeline.
//!
//! Orders the compiler passes for one job and wires error collection
//! across them. The order is a dependency graph, not a list to shuffle:
//!
//! 1. classification: standard at-rule checks, mixins, definitions,
//!    conditional chains, for-loops, components, provide/require - the
//!    structuring passes expect already-typed at-rule nodes;
//! 2. comment conventions to structured flags (`@default`, `@noflip`);
//! 3. compile-time constants into loop bounds and definition values
//!    (while definitions still exist);
//! 4. definition collection, then constant-reference substitution;
//! 5. conditional elimination, loop unrolling, mixin inlining, component
//!    expansion - each producing plain rulesets for the next;
//! 6. custom-function folding (references already substituted);
//! 7. flipping, then renaming, on fully resolved rules;
//! 8. the empty-ruleset sweep last.

use log::debug;

use cascada_core::diagnostics::ErrorManager;
use cascada_core::tree::Tree;

use crate::config::JobConfig;
use crate::functions::FunctionRegistry;
use crate::passes::check_dependencies::CheckDependencies;
use crate::passes::constants::{CollectConstants, ConstantBindings, ReplaceConstants};
use crate::passes::create_components::CreateComponents;
use crate::passes::create_conditionals::CreateConditionals;
use crate::passes::create_definitions::CreateDefinitions;
use crate::passes::create_for_loops::CreateForLoops;
use crate::passes::create_mixins::CreateMixins;
use crate::passes::create_standard_at_rules::CreateStandardAtRules;
use crate::passes::eliminate_conditionals::EliminateConditionals;
use crate::passes::eliminate_empty_rulesets::EliminateEmptyRulesets;
use crate::passes::evaluate_compile_constants::EvaluateCompileConstants;
use crate::passes::flip_direction::FlipDirection;
use crate::passes::mark_defaults::MarkDefaults;
use crate::passes::mark_non_flippable::MarkNonFlippable;
use crate::passes::rename_classes::RenameClasses;
use crate::passes::resolve_components::ResolveComponents;
use crate::passes::resolve_custom_functions::ResolveCustomFunctions;
use crate::passes::resolve_for_loops::ResolveForLoops;
use crate::passes::resolve_mixins::ResolveMixins;
use crate::rename::SubstitutionMap;

/// Run every configured pass over `tree`, in order, collecting problems
/// into `errors`.
pub(crate) fn run_passes(
    tree: &mut Tree,
    errors: &mut ErrorManager,
    config: &JobConfig,
    registry: &FunctionRegistry,
    substitution: Option<&mut dyn SubstitutionMap>,
) {
    debug!("pass pipeline started");

    CreateStandardAtRules::run(tree, errors);
    CreateMixins::run(tree, errors);
    CreateDefinitions::run(tree, errors);
    CreateConditionals::run(tree, errors);
    CreateForLoops::run(tree, errors);
    CreateComponents::run(tree, errors);
    CheckDependencies::run(tree, errors);

    MarkDefaults::run(tree, errors);
    MarkNonFlippable::run(tree, errors);

    EvaluateCompileConstants::run(tree, errors, &config.compile_constants);

    let mut bindings = ConstantBindings::new();
    CollectConstants::run(tree, errors, &mut bindings);
    ReplaceConstants::run(
        tree,
        errors,
        &bindings,
        config.allow_undefined_constants,
    );

    EliminateConditionals::run(tree, errors, &config.truth_set());
    ResolveForLoops::run(tree, errors);
    ResolveMixins::run(tree, errors);
    ResolveComponents::run(tree, errors);

    ResolveCustomFunctions::run(tree, errors, registry);

    if config.flip {
        FlipDirection::run(tree, errors);
    }
    if let Some(map) = substitution {
        RenameClasses::run(tree, errors, map);
    }

    EliminateEmptyRulesets::run(tree, errors);

    debug_assert!(tree.check_consistency().is_ok(), "pipeline broke the tree");
    debug!(errors = errors.error_count(); "pass pipeline finished");
}
