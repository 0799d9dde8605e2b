//! Error taxonomy for formula compilation and evaluation.
//!
//! Every error type implements [`GameError`] so callers can classify failures
//! uniformly, regardless of which layer raised them.
//!
//! # Categories
//!
//! - [`ParseError`]: malformed formula text, fatal to loading that one formula
//! - [`TypeError`]: a value accessed as the wrong variant
//! - [`LookupError`]: unknown entity, stat, status, skill or placeholder
//! - [`EvalError`]: anything raised while resolving a tree
//!
//! Numeric operators never raise: division by zero and domain errors follow
//! IEEE-754 and produce infinities or NaN.

use crate::value::ValueKind;

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - the same call may succeed once game state changes.
    Recoverable,

    /// Validation error - the formula or its arguments are wrong.
    ///
    /// Examples: unbalanced parentheses, unknown entity key
    Validation,

    /// Internal error - a contract between the engine and the language broke.
    ///
    /// Examples: runaway re-entrant evaluation
    Internal,

    /// Fatal error - engine state cannot be trusted anymore.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all formula and engine errors.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Malformed formula text.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParseError {
    /// Nothing left to parse after whitespace was stripped.
    #[error("empty expression")]
    Empty,

    /// `-` written directly after a function name, e.g. `MAX-(1)`.
    #[error("found minus after function with no '(': {function}")]
    MinusAfterFunction { function: String },

    /// A token appeared where it cannot start or continue an expression.
    #[error("unexpected token '{token}' at position {position}")]
    UnexpectedToken { token: String, position: usize },

    /// Input ended while an operand, argument or ')' was still expected.
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// A '(' without its ')' or a ')' without its '('.
    #[error("unmatched parenthesis at position {position}")]
    UnmatchedParen { position: usize },

    /// A name followed by '(' that is not a registered function.
    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    /// Wrong number of arguments for a function call.
    #[error("'{name}' expects {expected} argument(s), found {found}")]
    Arity {
        name: String,
        expected: String,
        found: usize,
    },

    /// A complete expression was followed by more tokens.
    #[error("trailing input starting at position {position}")]
    TrailingInput { position: usize },
}

impl GameError for ParseError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        use ParseError::*;
        match self {
            Empty => "PARSE_EMPTY",
            MinusAfterFunction { .. } => "PARSE_MINUS_AFTER_FUNCTION",
            UnexpectedToken { .. } => "PARSE_UNEXPECTED_TOKEN",
            UnexpectedEnd => "PARSE_UNEXPECTED_END",
            UnmatchedParen { .. } => "PARSE_UNMATCHED_PAREN",
            UnknownFunction { .. } => "PARSE_UNKNOWN_FUNCTION",
            Arity { .. } => "PARSE_ARITY",
            TrailingInput { .. } => "PARSE_TRAILING_INPUT",
        }
    }
}

// ============================================================================
// Evaluation Errors
// ============================================================================

/// A tagged value was accessed through the wrong variant.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("expected {expected}, found {found}")]
pub struct TypeError {
    pub expected: ValueKind,
    pub found: ValueKind,
}

/// A key referenced at evaluation time is not known to the engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LookupError {
    #[error("unknown entity '{0}'")]
    UnknownEntity(String),

    #[error("entity '{entity}' has no stat '{stat}'")]
    UnknownStat { entity: String, stat: String },

    #[error("unknown damage type '{0}'")]
    UnknownDamageType(String),

    #[error("unknown status '{0}'")]
    UnknownStatus(String),

    #[error("unknown skill '{0}'")]
    UnknownSkill(String),

    /// `$n` placeholder with no matching status argument.
    #[error("placeholder '{placeholder}' has no value ({available} supplied)")]
    UnknownPlaceholder {
        placeholder: String,
        available: usize,
    },
}

impl GameError for LookupError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        use LookupError::*;
        match self {
            UnknownEntity(_) => "LOOKUP_UNKNOWN_ENTITY",
            UnknownStat { .. } => "LOOKUP_UNKNOWN_STAT",
            UnknownDamageType(_) => "LOOKUP_UNKNOWN_DAMAGE_TYPE",
            UnknownStatus(_) => "LOOKUP_UNKNOWN_STATUS",
            UnknownSkill(_) => "LOOKUP_UNKNOWN_SKILL",
            UnknownPlaceholder { .. } => "LOOKUP_UNKNOWN_PLACEHOLDER",
        }
    }
}

/// Errors raised while resolving an expression tree.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvalError {
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Operand count did not match at evaluation time. Parse-time validation
    /// makes this unreachable for built trees.
    #[error("'{name}' received {found} argument(s)")]
    Arity { name: String, found: usize },

    /// `ARR_RANDOM` over an empty array.
    #[error("cannot pick from an empty array")]
    EmptyArray,

    /// Evaluation nested deeper than the configured limit.
    #[error("recursion limit of {limit} exceeded")]
    RecursionLimit { limit: usize },
}

impl GameError for EvalError {
    fn severity(&self) -> ErrorSeverity {
        use EvalError::*;
        match self {
            Type(e) => e.severity(),
            Lookup(e) => e.severity(),
            Arity { .. } | RecursionLimit { .. } => ErrorSeverity::Internal,
            EmptyArray => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        use EvalError::*;
        match self {
            Type(e) => e.error_code(),
            Lookup(e) => e.error_code(),
            Arity { .. } => "EVAL_ARITY",
            EmptyArray => "EVAL_EMPTY_ARRAY",
            RecursionLimit { .. } => "EVAL_RECURSION_LIMIT",
        }
    }
}

impl GameError for TypeError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        "EVAL_TYPE_MISMATCH"
    }
}

/// Either half of a compile-and-evaluate call.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormulaError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
}

impl From<TypeError> for FormulaError {
    fn from(err: TypeError) -> Self {
        Self::Eval(err.into())
    }
}

impl From<LookupError> for FormulaError {
    fn from(err: LookupError) -> Self {
        Self::Eval(err.into())
    }
}

impl GameError for FormulaError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Parse(e) => e.severity(),
            Self::Eval(e) => e.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(e) => e.error_code(),
            Self::Eval(e) => e.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_errors_delegate_classification() {
        let err = EvalError::from(LookupError::UnknownEntity("ghost".into()));
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert_eq!(err.error_code(), "LOOKUP_UNKNOWN_ENTITY");

        let err = EvalError::RecursionLimit { limit: 4 };
        assert!(err.severity().is_internal());
    }

    #[test]
    fn formula_error_wraps_both_halves() {
        let parse: FormulaError = ParseError::Empty.into();
        assert_eq!(parse.error_code(), "PARSE_EMPTY");

        let ty: FormulaError = TypeError {
            expected: ValueKind::Number,
            found: ValueKind::Boolean,
        }
        .into();
        assert_eq!(ty.to_string(), "evaluation error: expected number, found boolean");
    }
}
