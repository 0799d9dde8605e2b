//! Engine-level errors.
//!
//! Formula failures keep their own taxonomy from `game-formula`; this module
//! only adds what the engine API itself can reject.

use game_formula::{ErrorSeverity, EvalError, GameError, LookupError, ParseError};

use crate::EntityKey;

/// Errors surfaced by [`crate::GameEngine`] operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("formula '{formula}' is invalid: {source}")]
    InvalidFormula {
        formula: String,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error("unknown entity '{0}'")]
    UnknownEntity(EntityKey),

    #[error("entity '{0}' is already registered")]
    DuplicateEntity(EntityKey),
}

impl EngineError {
    pub fn invalid_formula(formula: &str, source: ParseError) -> Self {
        Self::InvalidFormula {
            formula: formula.to_owned(),
            source,
        }
    }
}

impl From<LookupError> for EngineError {
    fn from(err: LookupError) -> Self {
        Self::Eval(err.into())
    }
}

impl GameError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidFormula { .. } => ErrorSeverity::Validation,
            Self::Eval(e) => e.severity(),
            Self::UnknownEntity(_) | Self::DuplicateEntity(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidFormula { .. } => "ENGINE_INVALID_FORMULA",
            Self::Eval(e) => e.error_code(),
            Self::UnknownEntity(_) => "ENGINE_UNKNOWN_ENTITY",
            Self::DuplicateEntity(_) => "ENGINE_DUPLICATE_ENTITY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_errors_keep_their_codes() {
        let err = EngineError::from(LookupError::UnknownSkill("fireball".into()));
        assert_eq!(err.error_code(), "LOOKUP_UNKNOWN_SKILL");
        assert_eq!(err.to_string(), "unknown skill 'fireball'");
    }

    #[test]
    fn invalid_formula_names_the_text() {
        let err = EngineError::invalid_formula("1+", ParseError::UnexpectedEnd);
        assert_eq!(
            err.to_string(),
            "formula '1+' is invalid: unexpected end of expression"
        );
        assert_eq!(err.severity(), ErrorSeverity::Validation);
    }
}
