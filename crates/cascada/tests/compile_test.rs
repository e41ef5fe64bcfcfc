//! End-to-end compiler tests: GSS source in, CSS text out.

use cascada::config::{JobConfig, OutputFormat, RenameMode};
use cascada::{Compilation, Compiler};

fn compile_with(source: &str, config: JobConfig) -> Compilation {
    Compiler::new(config)
        .compile_source("test.gss", source)
        .expect("source parses")
}

fn compile(source: &str) -> Compilation {
    compile_with(source, JobConfig::default())
}

fn compact(source: &str) -> Compilation {
    compile_with(
        source,
        JobConfig {
            output: OutputFormat::Compact,
            ..JobConfig::default()
        },
    )
}

#[test]
fn test_plain_css_passes_through() {
    let out = compact("a { color: red } .b { margin: 1px 2px }");
    assert!(!out.has_errors());
    assert_eq!(out.css, "a{color:red;}.b{margin:1px 2px;}");
}

#[test]
fn test_definitions_substitute_and_disappear() {
    let out = compact("@def BG_COLOR #e8eef7; .menu { background: BG_COLOR }");
    assert!(!out.has_errors());
    assert_eq!(out.css, ".menu{background:#e8eef7;}");
}

#[test]
fn test_arithmetic_folds() {
    let out = compact(".x { width: add(5%, 0, 10%); height: divide(100%, 5, 2) }");
    assert!(!out.has_errors());
    assert_eq!(out.css, ".x{width:15%;height:10%;}");
}

#[test]
fn test_unit_mismatch_is_reported_with_best_effort_output() {
    let out = compact(".x { width: add(5%, 10px) }");
    assert!(out.has_errors());
    // The offending call is left visible in the output.
    assert_eq!(out.css, ".x{width:add(5%,10px);}");
}

#[test]
fn test_conditionals_resolve_against_truth_set() {
    let source = "@if (IE) { a { x: 1 } } @else { b { x: 2 } }";
    let out = compile_with(
        source,
        JobConfig {
            output: OutputFormat::Compact,
            true_conditions: vec!["IE".to_owned()],
            ..JobConfig::default()
        },
    );
    assert_eq!(out.css, "a{x:1;}");

    let out = compact(source);
    assert_eq!(out.css, "b{x:2;}");
}

#[test]
fn test_for_loops_unroll() {
    let out = compact("@for $i from 1 to 3 { .col-$i { width: mult(10%, $i) } }");
    assert!(!out.has_errors());
    assert_eq!(
        out.css,
        ".col-1{width:10%;}.col-2{width:20%;}.col-3{width:30%;}"
    );
}

#[test]
fn test_compile_constants_reach_loop_bounds() {
    let out = compile_with(
        "@for $i from 1 to COLS { .c-$i { order: $i } }",
        JobConfig {
            output: OutputFormat::Compact,
            compile_constants: [("COLS".to_owned(), 2.0)].into(),
            ..JobConfig::default()
        },
    );
    assert!(!out.has_errors());
    assert_eq!(out.css, ".c-1{order:1;}.c-2{order:2;}");
}

#[test]
fn test_mixins_inline() {
    let out = compact(
        "@defmixin size(W, H) { width: W; height: H } \
         .thumb { @mixin size(80px, 60px); }",
    );
    assert!(!out.has_errors());
    assert_eq!(out.css, ".thumb{width:80px;height:60px;}");
}

#[test]
fn test_components_expand_with_prefixes() {
    let out = compact(
        "@abstract-component base { .inner { margin: 0 } } \
         @component card extends base { .title { font-weight: bold } }",
    );
    assert!(!out.has_errors());
    assert_eq!(
        out.css,
        ".card-inner{margin:0;}.card-title{font-weight:bold;}"
    );
}

#[test]
fn test_flip_rewrites_directional_rules() {
    let out = compile_with(
        "a { margin-left: 2px; padding: 1px 2px 3px 4px; float: left } \
         /* @noflip */ b { margin-left: 2px }",
        JobConfig {
            output: OutputFormat::Compact,
            flip: true,
            ..JobConfig::default()
        },
    );
    assert!(!out.has_errors());
    assert_eq!(
        out.css,
        "a{margin-right:2px;padding:1px 4px 3px 2px;float:right;}b{margin-left:2px;}"
    );
}

#[test]
fn test_minimal_rename_records_mappings() {
    let out = compile_with(
        ".goog-menu { a: b } .goog-menu-item { c: d }",
        JobConfig {
            output: OutputFormat::Compact,
            rename: RenameMode::Minimal,
            ..JobConfig::default()
        },
    );
    assert!(!out.has_errors());
    assert_eq!(out.css, ".a-b{a:b;}.a-b-c{c:d;}");

    let renaming = out.renaming.expect("renaming recorded");
    assert_eq!(renaming.get("goog-menu").map(String::as_str), Some("a-b"));
    assert_eq!(
        renaming.get("goog-menu-item").map(String::as_str),
        Some("a-b-c")
    );
}

#[test]
fn test_debug_rename_suffixes_fragments() {
    let out = compile_with(
        ".goog-menu { a: b }",
        JobConfig {
            output: OutputFormat::Compact,
            rename: RenameMode::Debug,
            ..JobConfig::default()
        },
    );
    assert_eq!(out.css, ".goog_-menu_{a:b;}");
}

#[test]
fn test_provide_require_disappear() {
    let out = compact("@provide ui.menu; @require ui.menu; a { b: c }");
    assert!(!out.has_errors());
    assert_eq!(out.css, "a{b:c;}");
}

#[test]
fn test_empty_rulesets_are_swept() {
    let out = compact("@if (NEVER) { a { x: 1 } } b { } c { d: e }");
    assert!(!out.has_errors());
    assert_eq!(out.css, "c{d:e;}");
}

#[test]
fn test_charset_and_imports_print_first() {
    let out = compact("@charset \"UTF-8\"; @import url(\"base.css\"); a { b: c }");
    assert!(!out.has_errors());
    assert_eq!(out.css, "@charset \"UTF-8\";@import url(\"base.css\");a{b:c;}");
}

#[test]
fn test_media_rules_nest() {
    let out = compact("@media screen and (max-width: 600px) { a { b: c } }");
    assert!(!out.has_errors());
    assert_eq!(out.css, "@media screen and (max-width: 600px){a{b:c;}}");
}

#[test]
fn test_multi_unit_compilation() {
    use cascada_core::location::SourceUnit;

    let units = [
        SourceUnit::new("defs.gss", "@def BRAND #336699;"),
        SourceUnit::new("app.gss", ".logo { color: BRAND }"),
    ];
    let out = Compiler::new(JobConfig {
        output: OutputFormat::Compact,
        ..JobConfig::default()
    })
    .compile_units(&units)
    .unwrap();
    assert!(!out.has_errors());
    assert_eq!(out.css, ".logo{color:#336699;}");
}

#[test]
fn test_lone_else_reports_but_still_produces_output() {
    let out = compact("@else { a { b: c } } d { e: f }");
    assert!(out.has_errors());
    assert_eq!(out.css, "d{e:f;}");
    let rendered: Vec<String> = out.diagnostics.iter().map(|d| d.to_string()).collect();
    assert!(
        rendered
            .iter()
            .any(|line| line.contains("@else without previous @if")),
        "{rendered:?}"
    );
}

#[test]
fn test_parse_error_is_fatal() {
    let result = Compiler::new(JobConfig::default()).compile_source("bad.gss", "a { b: }");
    assert!(result.is_err());
}

#[test]
fn test_pretty_output_shape() {
    let out = compile("a, b { color: red; margin: 0 }");
    assert!(!out.has_errors());
    assert_eq!(out.css, "a, b {\n  color: red;\n  margin: 0;\n}\n");
}

#[test]
fn test_round_trip_compact_is_a_fixed_point() {
    // Vendor-proprietary at-rules are treated as opaque and must survive
    // the cycle byte-for-byte.
    let sources = [
        "a { color: red }",
        "@-custom-viewport wide { a { b: c } }",
        "@media screen and (max-width: 600px) { .m { width: 50% } }",
        ".x { font-family: arial, serif; font-size: 12px }",
        "a { content: \"quoted text\" }",
        ".y { background: url(\"img.png\") no-repeat }",
    ];
    for source in sources {
        let first = compact(source);
        assert!(!first.has_errors(), "first pass errors for `{source}`");
        let second = compact(&first.css);
        assert!(!second.has_errors(), "second pass errors for `{source}`");
        assert_eq!(first.css, second.css, "not a fixed point for `{source}`");
    }
}

#[test]
fn test_custom_function_registry_is_per_job() {
    use cascada::functions::{Arity, FunctionRegistry, GssFunction};
    use cascada_core::diagnostics::Diagnostic;
    use cascada_core::node::NodeKind;
    use cascada_core::tree::{NodeId, Tree};

    struct Double;
    impl GssFunction for Double {
        fn arity(&self) -> Arity {
            Arity::Exact(1)
        }
        fn apply(&self, tree: &mut Tree, args: &[NodeId]) -> Result<NodeId, Diagnostic> {
            let NodeKind::Numeric { value, unit, .. } = tree.kind(args[0]).clone() else {
                return Err(Diagnostic::error("double takes a number"));
            };
            Ok(tree.alloc(NodeKind::Numeric {
                repr: cascada::functions::format_number(value * 2.0),
                value: value * 2.0,
                unit,
            }))
        }
    }

    let mut registry = FunctionRegistry::new();
    registry.register("double", Box::new(Double));
    let out = Compiler::new(JobConfig {
        output: OutputFormat::Compact,
        ..JobConfig::default()
    })
    .with_functions(registry)
    .compile_source("t.gss", ".x { width: double(21px) }")
    .unwrap();
    assert_eq!(out.css, ".x{width:42px;}");
}
