//! Designer formula language for combat content.
//!
//! Designers write mitigation, dodge, crit and status behavior as text such
//! as `NON_NEG($VALUE - GET_PROP($TARGET,DEF))`. A formula goes through four
//! stages:
//!
//! 1. [`Tokenizer`] splits the text into [`Token`]s
//! 2. [`TreeBuilder`] turns tokens into a [`Node`] tree using the [`Registry`]
//! 3. [`Sanitizer`] binds placeholders for one evaluation
//! 4. [`Evaluator`] resolves the tree to a [`Value`] against a [`Host`]
//!
//! Stages 1 and 2 run once per template; 3 and 4 run on every use.
//!
//! The language has no loops or user-defined functions. Formulas are trusted
//! designer content.
pub mod error;
pub mod eval;
pub mod host;
pub mod registry;
pub mod rng;
pub mod sanitize;
pub mod symbols;
pub mod token;
pub mod tree;
pub mod value;

pub use error::{
    ErrorSeverity, EvalError, FormulaError, GameError, LookupError, ParseError, TypeError,
};
pub use eval::{Arg, Evaluator, MAX_EVAL_DEPTH};
pub use host::{DetachedHost, Host, StatLookup};
pub use registry::{Arity, Function, Operator, Registry};
pub use rng::{PcgRng, RngOracle};
pub use sanitize::Sanitizer;
pub use token::{Token, TokenKind, Tokenizer};
pub use tree::{ArgSlot, Node, TreeBuilder};
pub use value::{EntityKey, StatModifier, Value, ValueKind};

/// Compiles and evaluates `expression` in one call.
pub fn resolve_str(
    registry: &Registry,
    host: &mut dyn Host,
    expression: &str,
) -> Result<Value, FormulaError> {
    let tree = TreeBuilder::new(registry).build_str(expression)?;
    Ok(Evaluator::new(host).resolve(&tree)?)
}

/// Builds and evaluates an already tokenized expression.
pub fn resolve_tokens(
    registry: &Registry,
    host: &mut dyn Host,
    tokens: &[Token],
) -> Result<Value, FormulaError> {
    let tree = TreeBuilder::new(registry).build(tokens)?;
    Ok(Evaluator::new(host).resolve(&tree)?)
}
