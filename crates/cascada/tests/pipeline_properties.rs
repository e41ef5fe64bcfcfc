//! Property tests over the whole pipeline: for arbitrary generated
//! stylesheets, every pass preserves the tree invariants and the compact
//! printer stays a parse/print fixed point.

use proptest::prelude::*;

use cascada::config::{JobConfig, OutputFormat, RenameMode};
use cascada::Compiler;

fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,5}"
}

fn constant_name() -> impl Strategy<Value = String> {
    "[A-Z][A-Z0-9_]{1,6}"
}

/// One generated declaration: `prop: <value>`.
fn declaration() -> impl Strategy<Value = String> {
    let unit = prop_oneof![
        Just("px".to_owned()),
        Just("%".to_owned()),
        Just(String::new()),
    ];
    (
        ident(),
        prop_oneof![
            ident(),
            (0u16..1000, unit).prop_map(|(n, unit)| format!("{n}{unit}")),
            (1u16..100, 1u16..100).prop_map(|(a, b)| format!("add({a}px, {b}px)")),
        ],
    )
        .prop_map(|(property, value)| format!("{property}: {value}"))
}

fn ruleset() -> impl Strategy<Value = String> {
    (
        ident(),
        prop::collection::vec(declaration(), 0..4),
    )
        .prop_map(|(class, declarations)| {
            format!(".{} {{ {} }}", class, declarations.join("; "))
        })
}

/// One generated GSS construct exercising the structuring passes.
fn construct() -> impl Strategy<Value = String> {
    prop_oneof![
        ruleset(),
        (constant_name(), ident()).prop_map(|(name, value)| format!("@def {name} {value};")),
        (ident(), prop::collection::vec(ruleset(), 0..2))
            .prop_map(|(query, rules)| format!("@media {} {{ {} }}", query, rules.join(" "))),
        (ident(), ruleset(), ruleset()).prop_map(|(condition, a, b)| {
            format!("@if ({}) {{ {} }} @else {{ {} }}", condition.to_uppercase(), a, b)
        }),
        (1u8..4, 1u8..4, ident()).prop_map(|(from, to, property)| {
            format!(
                "@for $i from {from} to {} {{ .gen-$i {{ {property}: $i }} }}",
                from.max(to)
            )
        }),
    ]
}

fn stylesheet() -> impl Strategy<Value = String> {
    prop::collection::vec(construct(), 0..6).prop_map(|constructs| constructs.join("\n"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn pipeline_never_panics_and_output_reparses(source in stylesheet()) {
        let config = JobConfig {
            output: OutputFormat::Compact,
            allow_undefined_constants: true,
            ..JobConfig::default()
        };
        let out = Compiler::new(config.clone())
            .compile_source("gen.gss", &source)
            .expect("generated source parses");

        // Whatever the passes did, the emitted CSS must parse again and
        // print identically: the compact printer is a fixed point.
        let again = Compiler::new(config)
            .compile_source("gen2.gss", &out.css)
            .expect("compact output parses");
        prop_assert_eq!(out.css, again.css);
    }

    #[test]
    fn renaming_is_deterministic_within_a_job(source in prop::collection::vec(ruleset(), 1..5)) {
        let source = source.join("\n");
        let config = JobConfig {
            output: OutputFormat::Compact,
            rename: RenameMode::Minimal,
            ..JobConfig::default()
        };
        let first = Compiler::new(config.clone())
            .compile_source("a.gss", &source)
            .expect("parses");
        let second = Compiler::new(config)
            .compile_source("b.gss", &source)
            .expect("parses");

        // Same input, fresh job, identical substitutions.
        prop_assert_eq!(first.css, second.css);
        prop_assert_eq!(first.renaming, second.renaming);
    }
}
