//! The tagged runtime value that flows through evaluation.
//!
//! A [`Value`] carries exactly one payload. Conversions are strict: asking a
//! boolean for its number fails with a [`TypeError`] instead of coercing.
//! Entities are carried by key; anything that needs live entity data looks it
//! up through the host at the point of use.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use crate::error::{EvalError, LookupError, TypeError};
use crate::registry::{Function, Operator};

/// Stable key of an entity in the engine's tables.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EntityKey(String);

impl EntityKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for EntityKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

impl From<String> for EntityKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Additive change to one derived stat, produced by `MOD_VALUE`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatModifier {
    pub stat: String,
    pub amount: f64,
}

impl StatModifier {
    pub fn new(stat: impl Into<String>, amount: f64) -> Self {
        Self {
            stat: stat.into(),
            amount,
        }
    }
}

/// Discriminant of [`Value`], used in error reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueKind {
    Number,
    Boolean,
    Key,
    Entity,
    Array,
    Operator,
    Function,
    StatModifier,
    Null,
}

/// Tagged formula value.
///
/// `Key` holds any unresolved text leaf: stat names, damage type keys, status
/// keys, and entity keys the host does not know about.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Boolean(bool),
    Key(String),
    Entity(EntityKey),
    Array(Vec<Value>),
    Operator(Arc<Operator>),
    Function(Arc<Function>),
    StatModifier(StatModifier),
    Null,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Number(_) => ValueKind::Number,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Key(_) => ValueKind::Key,
            Self::Entity(_) => ValueKind::Entity,
            Self::Array(_) => ValueKind::Array,
            Self::Operator(_) => ValueKind::Operator,
            Self::Function(_) => ValueKind::Function,
            Self::StatModifier(_) => ValueKind::StatModifier,
            Self::Null => ValueKind::Null,
        }
    }

    fn mismatch(&self, expected: ValueKind) -> TypeError {
        TypeError {
            expected,
            found: self.kind(),
        }
    }

    pub fn as_number(&self) -> Result<f64, TypeError> {
        match self {
            Self::Number(n) => Ok(*n),
            other => Err(other.mismatch(ValueKind::Number)),
        }
    }

    pub fn as_bool(&self) -> Result<bool, TypeError> {
        match self {
            Self::Boolean(b) => Ok(*b),
            other => Err(other.mismatch(ValueKind::Boolean)),
        }
    }

    /// Text of a key leaf. Entity references also answer with their key, so a
    /// name that happens to collide with an entity key still works as a name.
    pub fn as_key(&self) -> Result<&str, TypeError> {
        match self {
            Self::Key(key) => Ok(key),
            Self::Entity(key) => Ok(key.as_str()),
            other => Err(other.mismatch(ValueKind::Key)),
        }
    }

    /// Entity reference. A bare key reaching this point was not found by the
    /// host during resolution, so it is reported as a lookup failure.
    pub fn as_entity(&self) -> Result<&EntityKey, EvalError> {
        match self {
            Self::Entity(key) => Ok(key),
            Self::Key(key) => Err(LookupError::UnknownEntity(key.clone()).into()),
            other => Err(other.mismatch(ValueKind::Entity).into()),
        }
    }

    pub fn as_array(&self) -> Result<&[Value], TypeError> {
        match self {
            Self::Array(values) => Ok(values),
            other => Err(other.mismatch(ValueKind::Array)),
        }
    }

    pub fn as_modifier(&self) -> Result<&StatModifier, TypeError> {
        match self {
            Self::StatModifier(modifier) => Ok(modifier),
            other => Err(other.mismatch(ValueKind::StatModifier)),
        }
    }

    pub fn as_operator(&self) -> Result<&Arc<Operator>, TypeError> {
        match self {
            Self::Operator(op) => Ok(op),
            other => Err(other.mismatch(ValueKind::Operator)),
        }
    }

    pub fn as_function(&self) -> Result<&Arc<Function>, TypeError> {
        match self {
            Self::Function(func) => Ok(func),
            other => Err(other.mismatch(ValueKind::Function)),
        }
    }

    /// Converts every element to a number, failing on the first non-number.
    pub fn numbers(values: &[Value]) -> Result<Vec<f64>, TypeError> {
        values.iter().map(Value::as_number).collect()
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<EntityKey> for Value {
    fn from(key: EntityKey) -> Self {
        Self::Entity(key)
    }
}

impl From<StatModifier> for Value {
    fn from(modifier: StatModifier) -> Self {
        Self::StatModifier(modifier)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Self::Array(values)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Key(key) => f.write_str(key),
            Self::Entity(key) => write!(f, "@{key}"),
            Self::Array(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
            Self::Operator(op) => f.write_str(op.symbol()),
            Self::Function(func) => f.write_str(func.name()),
            Self::StatModifier(m) => write!(f, "{}{:+}", m.stat, m.amount),
            Self::Null => f.write_str("null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_are_strict() {
        let err = Value::Boolean(true).as_number().unwrap_err();
        assert_eq!(err.expected, ValueKind::Number);
        assert_eq!(err.found, ValueKind::Boolean);

        assert!(Value::Number(1.0).as_bool().is_err());
        assert!(Value::Array(vec![]).as_number().is_err());
    }

    #[test]
    fn unknown_key_as_entity_is_a_lookup_failure() {
        let err = Value::Key("ghost".into()).as_entity().unwrap_err();
        assert_eq!(
            err,
            EvalError::Lookup(LookupError::UnknownEntity("ghost".into()))
        );

        let err = Value::Number(3.0).as_entity().unwrap_err();
        assert!(matches!(err, EvalError::Type(_)));
    }

    #[test]
    fn entity_answers_as_key() {
        let value = Value::Entity(EntityKey::from("hero"));
        assert_eq!(value.as_key().unwrap(), "hero");
    }

    #[test]
    fn numbers_collects_in_order() {
        let values = vec![Value::Number(10.0), Value::Number(20.0)];
        assert_eq!(Value::numbers(&values).unwrap(), vec![10.0, 20.0]);

        let mixed = vec![Value::Number(1.0), Value::Null];
        assert!(Value::numbers(&mixed).is_err());
    }

    #[test]
    fn display_renders_arrays_and_modifiers() {
        let value = Value::Array(vec![
            Value::Number(10.0),
            StatModifier::new("STR", -2.0).into(),
        ]);
        assert_eq!(value.to_string(), "[10, STR-2]");
    }
}
