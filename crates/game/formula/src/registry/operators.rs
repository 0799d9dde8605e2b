//! Standard operator table.
//!
//! | tier | operators        |
//! |------|------------------|
//! | 0    | `!` `>` `<` `=`  |
//! | 1    | `+` `-`          |
//! | 2    | `*` `/`          |
//! | 3    | `^`              |
//!
//! All operators are left-associative. Arithmetic follows IEEE-754, so
//! division by zero yields an infinity or NaN rather than an error.

use super::Operator;
use crate::error::EvalError;
use crate::symbols::*;
use crate::value::Value;

const COMPARISON: u8 = 0;
const ADDITIVE: u8 = 1;
const MULTIPLICATIVE: u8 = 2;
const EXPONENT: u8 = 3;

pub(super) fn standard() -> Vec<Operator> {
    vec![
        Operator::new(PLUS_OP, ADDITIVE, true, 2, add),
        Operator::new(MINUS_OP, ADDITIVE, true, 2, subtract),
        Operator::new(MULTIPLY_OP, MULTIPLICATIVE, true, 2, multiply),
        Operator::new(DIVIDE_OP, MULTIPLICATIVE, true, 2, divide),
        Operator::new(POWER_OP, EXPONENT, true, 2, power),
        Operator::new(NOT_OP, COMPARISON, true, 1, not),
        Operator::new(GREATER_OP, COMPARISON, true, 2, greater),
        Operator::new(LESSER_OP, COMPARISON, true, 2, lesser),
        Operator::new(EQUAL_OP, COMPARISON, true, 2, equal),
    ]
}

fn pair(values: &[Value]) -> Result<(f64, f64), EvalError> {
    match values {
        [lhs, rhs] => Ok((lhs.as_number()?, rhs.as_number()?)),
        _ => Err(EvalError::Arity {
            name: "binary operator".to_owned(),
            found: values.len(),
        }),
    }
}

fn add(values: &[Value]) -> Result<Value, EvalError> {
    let (a, b) = pair(values)?;
    Ok(Value::Number(a + b))
}

fn subtract(values: &[Value]) -> Result<Value, EvalError> {
    let (a, b) = pair(values)?;
    Ok(Value::Number(a - b))
}

fn multiply(values: &[Value]) -> Result<Value, EvalError> {
    let (a, b) = pair(values)?;
    Ok(Value::Number(a * b))
}

fn divide(values: &[Value]) -> Result<Value, EvalError> {
    let (a, b) = pair(values)?;
    Ok(Value::Number(a / b))
}

fn power(values: &[Value]) -> Result<Value, EvalError> {
    let (a, b) = pair(values)?;
    Ok(Value::Number(a.powf(b)))
}

fn not(values: &[Value]) -> Result<Value, EvalError> {
    match values {
        [operand] => Ok(Value::Boolean(!operand.as_bool()?)),
        _ => Err(EvalError::Arity {
            name: NOT_OP.to_owned(),
            found: values.len(),
        }),
    }
}

fn greater(values: &[Value]) -> Result<Value, EvalError> {
    let (a, b) = pair(values)?;
    Ok(Value::Boolean(a > b))
}

fn lesser(values: &[Value]) -> Result<Value, EvalError> {
    let (a, b) = pair(values)?;
    Ok(Value::Boolean(a < b))
}

#[allow(clippy::float_cmp)]
fn equal(values: &[Value]) -> Result<Value, EvalError> {
    let (a, b) = pair(values)?;
    Ok(Value::Boolean(a == b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn division_by_zero_follows_ieee() {
        let inf = divide(&[num(1.0), num(0.0)]).unwrap();
        assert_eq!(inf, Value::Number(f64::INFINITY));

        let nan = divide(&[num(0.0), num(0.0)]).unwrap().as_number().unwrap();
        assert!(nan.is_nan());
    }

    #[test]
    fn comparisons_with_nan_are_false() {
        let nan = num(f64::NAN);
        assert_eq!(greater(&[nan.clone(), num(0.0)]).unwrap(), Value::Boolean(false));
        assert_eq!(lesser(&[nan.clone(), num(0.0)]).unwrap(), Value::Boolean(false));
        assert_eq!(equal(&[nan.clone(), nan]).unwrap(), Value::Boolean(false));
    }

    #[test]
    fn not_requires_a_boolean() {
        assert_eq!(not(&[Value::Boolean(false)]).unwrap(), Value::Boolean(true));
        assert!(matches!(not(&[num(1.0)]), Err(EvalError::Type(_))));
    }

    #[test]
    fn arithmetic_rejects_non_numbers() {
        let err = add(&[num(1.0), Value::Boolean(true)]).unwrap_err();
        assert!(matches!(err, EvalError::Type(_)));
    }
}
