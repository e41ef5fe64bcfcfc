//! Custom GSS functions.
//!
//! A [`GssFunction`] is a pluggable unit with an arity contract: given the
//! validated argument nodes of a call it must produce exactly one
//! replacement value node, or fail with a diagnostic attached to the best
//! available argument location. The registry mapping function names to
//! implementations is explicit per-job configuration, never ambient state;
//! [`default_registry`] is the stock set, a convenience rather than a
//! requirement of the core.

mod color_fns;
mod numeric;
mod selection;

use std::collections::HashMap;

use cascada_core::diagnostics::Diagnostic;
use cascada_core::tree::{NodeId, Tree};

pub use numeric::format_number;

/// How many arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many.
    Exact(usize),
    /// At least this many.
    AtLeast(usize),
}

impl Arity {
    /// Whether `count` satisfies this arity.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }

    /// Human-readable form for diagnostics.
    pub fn describe(self) -> String {
        match self {
            Arity::Exact(n) => format!("exactly {n}"),
            Arity::AtLeast(n) => format!("at least {n}"),
        }
    }
}

/// One custom function implementation.
///
/// `apply` receives the call's argument node ids (arity already checked
/// against [`arity`](GssFunction::arity)) and must allocate and return
/// exactly one replacement value node in `tree`.
pub trait GssFunction {
    /// The arity contract, checked before `apply` is called.
    fn arity(&self) -> Arity;

    /// Evaluate the call.
    ///
    /// # Errors
    ///
    /// Returns a diagnostic (already located at the offending argument)
    /// when the arguments do not satisfy the function's contract.
    fn apply(&self, tree: &mut Tree, args: &[NodeId]) -> Result<NodeId, Diagnostic>;
}

/// A per-job mapping from function name to implementation.
#[derive(Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Box<dyn GssFunction>>,
}

impl FunctionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `function` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, function: Box<dyn GssFunction>) {
        self.functions.insert(name.into(), function);
    }

    /// Look up a function by name.
    pub fn get(&self, name: &str) -> Option<&dyn GssFunction> {
        self.functions.get(name).map(Box::as_ref)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("FunctionRegistry")
            .field("functions", &names)
            .finish()
    }
}

/// The stock function set: arithmetic, selection, and color blending.
pub fn default_registry() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    registry.register("add", Box::new(numeric::Add));
    registry.register("sub", Box::new(numeric::Sub));
    registry.register("mult", Box::new(numeric::Mult));
    registry.register("divide", Box::new(numeric::Divide));
    registry.register("min", Box::new(numeric::Min));
    registry.register("max", Box::new(numeric::Max));
    registry.register("concat", Box::new(selection::Concat));
    registry.register("selectFrom", Box::new(selection::SelectFrom));
    registry.register("blendColorsRgb", Box::new(color_fns::BlendColorsRgb));
    registry
}
