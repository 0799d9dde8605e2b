//! Symbol registry: the closed set of operators and functions.
//!
//! A [`Registry`] is built once and read-only afterwards. Most callers use
//! [`Registry::shared`], the lazily initialized process-wide instance; tests
//! and tools that need an alternate function set construct their own with
//! [`Registry::empty`] and the `with_*` builders.
//!
//! Native behavior is stored as plain function pointers keyed by symbol or
//! name. Operators are pure over their operands. Functions receive the
//! [`Evaluator`] so they can reach the host and force lazy arguments.

mod functions;
mod operators;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::EvalError;
use crate::eval::{Arg, Evaluator};
use crate::symbols::{LEFT_PAREN, PARAM_SEPARATOR, RIGHT_PAREN};
use crate::value::Value;

/// Native evaluation of an operator over resolved operands.
pub type OperatorFn = fn(&[Value]) -> Result<Value, EvalError>;

/// Native evaluation of a function over its (possibly deferred) arguments.
pub type FunctionFn = fn(&mut Evaluator<'_>, &[Arg<'_>]) -> Result<Value, EvalError>;

// ============================================================================
// Operators
// ============================================================================

/// Single-character operator.
pub struct Operator {
    symbol: &'static str,
    precedence: u8,
    left_associative: bool,
    arity: usize,
    eval: OperatorFn,
}

impl Operator {
    pub const fn new(
        symbol: &'static str,
        precedence: u8,
        left_associative: bool,
        arity: usize,
        eval: OperatorFn,
    ) -> Self {
        Self {
            symbol,
            precedence,
            left_associative,
            arity,
            eval,
        }
    }

    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    pub fn precedence(&self) -> u8 {
        self.precedence
    }

    pub fn is_left_associative(&self) -> bool {
        self.left_associative
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Unary operators are written before their operand.
    pub fn is_prefix(&self) -> bool {
        self.arity == 1
    }

    /// Applies the operator to already-resolved operands.
    pub fn apply(&self, operands: &[Value]) -> Result<Value, EvalError> {
        if operands.len() != self.arity {
            return Err(EvalError::Arity {
                name: self.symbol.to_owned(),
                found: operands.len(),
            });
        }
        (self.eval)(operands)
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("symbol", &self.symbol)
            .field("precedence", &self.precedence)
            .field("left_associative", &self.left_associative)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Operator {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Accepted argument count of a function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    Variadic { min: usize },
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Self::Fixed(n) => count == n,
            Self::Variadic { min } => count >= min,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "{n}"),
            Self::Variadic { min } => write!(f, "at least {min}"),
        }
    }
}

/// Named function callable as `NAME(arg, ...)`.
pub struct Function {
    name: &'static str,
    arity: Arity,
    lazy: &'static [bool],
    key_args: &'static [usize],
    eval: FunctionFn,
}

impl Function {
    pub const fn new(name: &'static str, arity: Arity, eval: FunctionFn) -> Self {
        Self {
            name,
            arity,
            lazy: &[],
            key_args: &[],
            eval,
        }
    }

    /// Marks argument positions that are passed unevaluated (`true` = lazy).
    pub const fn with_lazy(mut self, lazy: &'static [bool]) -> Self {
        self.lazy = lazy;
        self
    }

    /// Marks argument positions that name a stat, status, skill or damage type.
    pub const fn with_key_args(mut self, key_args: &'static [usize]) -> Self {
        self.key_args = key_args;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn is_lazy(&self, position: usize) -> bool {
        self.lazy.get(position).copied().unwrap_or(false)
    }

    pub fn is_key_arg(&self, position: usize) -> bool {
        self.key_args.contains(&position)
    }

    /// Invokes the native evaluation after checking the argument count.
    pub fn call(&self, evaluator: &mut Evaluator<'_>, args: &[Arg<'_>]) -> Result<Value, EvalError> {
        if !self.arity.accepts(args.len()) {
            return Err(EvalError::Arity {
                name: self.name.to_owned(),
                found: args.len(),
            });
        }
        (self.eval)(evaluator, args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("lazy", &self.lazy)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Immutable table of operators and functions.
#[derive(Debug, Default)]
pub struct Registry {
    operators: HashMap<&'static str, Arc<Operator>>,
    functions: HashMap<&'static str, Arc<Function>>,
}

impl Registry {
    /// Registry with no symbols at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding the standard operator and function set.
    pub fn standard() -> Self {
        let registry = operators::standard()
            .into_iter()
            .fold(Self::empty(), Self::with_operator);
        functions::standard()
            .into_iter()
            .fold(registry, Self::with_function)
    }

    /// Process-wide standard registry, built on first use.
    pub fn shared() -> &'static Registry {
        static SHARED: OnceLock<Registry> = OnceLock::new();
        SHARED.get_or_init(|| {
            tracing::debug!("initializing shared formula registry");
            Registry::standard()
        })
    }

    /// Adds or replaces an operator.
    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operators.insert(operator.symbol, Arc::new(operator));
        self
    }

    /// Adds or replaces a function.
    pub fn with_function(mut self, function: Function) -> Self {
        self.functions.insert(function.name, Arc::new(function));
        self
    }

    pub fn operator(&self, symbol: &str) -> Option<&Arc<Operator>> {
        self.operators.get(symbol)
    }

    pub fn function(&self, name: &str) -> Option<&Arc<Function>> {
        self.functions.get(name)
    }

    pub fn is_operator(&self, text: &str) -> bool {
        self.operators.contains_key(text)
    }

    pub fn is_function(&self, text: &str) -> bool {
        self.functions.contains_key(text)
    }

    pub fn is_separator(&self, text: &str) -> bool {
        is_single(text, PARAM_SEPARATOR)
    }

    pub fn is_left_paren(&self, text: &str) -> bool {
        is_single(text, LEFT_PAREN)
    }

    pub fn is_right_paren(&self, text: &str) -> bool {
        is_single(text, RIGHT_PAREN)
    }

    /// Characters that end a run of variable text.
    pub fn is_special_char(&self, c: char) -> bool {
        if c == PARAM_SEPARATOR || c == LEFT_PAREN || c == RIGHT_PAREN {
            return true;
        }
        let mut buf = [0u8; 4];
        self.is_operator(c.encode_utf8(&mut buf))
    }

    pub fn operators(&self) -> impl Iterator<Item = &Arc<Operator>> {
        self.operators.values()
    }

    pub fn functions(&self) -> impl Iterator<Item = &Arc<Function>> {
        self.functions.values()
    }
}

fn is_single(text: &str, expected: char) -> bool {
    let mut chars = text.chars();
    chars.next() == Some(expected) && chars.next().is_none()
}
