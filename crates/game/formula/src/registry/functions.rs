//! Standard function table.
//!
//! Every function resolves its arguments eagerly except `IF`, whose branches
//! are deferred. Functions with side effects (`HARM`, `HEAL`, `CAST`,
//! `APPLY`) go through the host and evaluate to `Null`.

use super::{Arity, Function};
use crate::error::EvalError;
use crate::eval::{Arg, Evaluator};
use crate::symbols::*;
use crate::value::{EntityKey, StatModifier, Value};

pub(super) fn standard() -> Vec<Function> {
    vec![
        Function::new(MAX_F, Arity::Variadic { min: 1 }, max),
        Function::new(MIN_F, Arity::Variadic { min: 1 }, min),
        Function::new(ABS_F, Arity::Fixed(1), abs),
        Function::new(NON_NEG_F, Arity::Fixed(1), non_neg),
        Function::new(RANDOM_F, Arity::Fixed(2), random),
        Function::new(HARM_F, Arity::Fixed(4), harm).with_key_args(&[2]),
        Function::new(HEAL_F, Arity::Fixed(3), heal),
        Function::new(ARRAY_F, Arity::Variadic { min: 0 }, array),
        Function::new(GET_PLAYERS_F, Arity::Fixed(0), get_players),
        Function::new(GET_ACTIVE_PLAYERS_F, Arity::Fixed(0), get_active_players),
        Function::new(GET_PROP_F, Arity::Fixed(2), get_prop).with_key_args(&[1]),
        Function::new(IF_F, Arity::Fixed(3), if_then_else).with_lazy(&[false, true, true]),
        Function::new(ARR_RANDOM_F, Arity::Fixed(1), arr_random),
        Function::new(CHANCE_F, Arity::Fixed(1), chance),
        Function::new(CAST_F, Arity::Fixed(3), cast).with_key_args(&[2]),
        Function::new(MOD_VALUE_F, Arity::Fixed(2), mod_value).with_key_args(&[0]),
        Function::new(APPLY_F, Arity::Fixed(5), apply).with_key_args(&[2]),
    ]
}

/// Resolved argument at `index`. Only lazy positions are ever deferred.
fn eager<'a>(name: &str, args: &'a [Arg<'_>], index: usize) -> Result<&'a Value, EvalError> {
    args.get(index)
        .and_then(Arg::value)
        .ok_or_else(|| EvalError::Arity {
            name: name.to_owned(),
            found: args.len(),
        })
}

fn eager_all(name: &str, args: &[Arg<'_>]) -> Result<Vec<f64>, EvalError> {
    (0..args.len())
        .map(|i| -> Result<f64, EvalError> { Ok(eager(name, args, i)?.as_number()?) })
        .collect()
}

/// Draw in `[0, 1000)` compared against a percentage.
fn roll_percent(evaluator: &mut Evaluator<'_>, percent: f64) -> bool {
    f64::from(evaluator.host().roll(1000)) < percent * 10.0
}

// ===== numeric =====

fn max(_: &mut Evaluator<'_>, args: &[Arg<'_>]) -> Result<Value, EvalError> {
    let values = eager_all(MAX_F, args)?;
    Ok(Value::Number(values.into_iter().fold(f64::NEG_INFINITY, f64::max)))
}

fn min(_: &mut Evaluator<'_>, args: &[Arg<'_>]) -> Result<Value, EvalError> {
    let values = eager_all(MIN_F, args)?;
    Ok(Value::Number(values.into_iter().fold(f64::INFINITY, f64::min)))
}

fn abs(_: &mut Evaluator<'_>, args: &[Arg<'_>]) -> Result<Value, EvalError> {
    Ok(Value::Number(eager(ABS_F, args, 0)?.as_number()?.abs()))
}

fn non_neg(_: &mut Evaluator<'_>, args: &[Arg<'_>]) -> Result<Value, EvalError> {
    let x = eager(NON_NEG_F, args, 0)?.as_number()?;
    Ok(Value::Number(if x > 0.0 { x } else { 0.0 }))
}

/// Integer in `[low, high)`; `low` itself when the range is empty.
fn random(evaluator: &mut Evaluator<'_>, args: &[Arg<'_>]) -> Result<Value, EvalError> {
    let low = eager(RANDOM_F, args, 0)?.as_number()?.floor();
    let high = eager(RANDOM_F, args, 1)?.as_number()?.floor();
    if !(high > low) {
        return Ok(Value::Number(low));
    }
    let span = (high - low).min(f64::from(u32::MAX)) as u32;
    let offset = evaluator.host().roll(span);
    Ok(Value::Number(low + f64::from(offset)))
}

fn chance(evaluator: &mut Evaluator<'_>, args: &[Arg<'_>]) -> Result<Value, EvalError> {
    let percent = eager(CHANCE_F, args, 0)?.as_number()?;
    Ok(Value::Boolean(roll_percent(evaluator, percent)))
}

// ===== collections =====

fn array(_: &mut Evaluator<'_>, args: &[Arg<'_>]) -> Result<Value, EvalError> {
    let values = (0..args.len())
        .map(|i| eager(ARRAY_F, args, i).cloned())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Array(values))
}

fn arr_random(evaluator: &mut Evaluator<'_>, args: &[Arg<'_>]) -> Result<Value, EvalError> {
    let values = eager(ARR_RANDOM_F, args, 0)?.as_array()?;
    if values.is_empty() {
        return Err(EvalError::EmptyArray);
    }
    let upper = u32::try_from(values.len()).unwrap_or(u32::MAX);
    let index = evaluator.host().roll(upper) as usize;
    Ok(values[index].clone())
}

fn get_players(evaluator: &mut Evaluator<'_>, _: &[Arg<'_>]) -> Result<Value, EvalError> {
    let players = evaluator.host().players();
    Ok(Value::Array(players.into_iter().map(Value::Entity).collect()))
}

fn get_active_players(evaluator: &mut Evaluator<'_>, _: &[Arg<'_>]) -> Result<Value, EvalError> {
    let players = evaluator.host().active_players();
    Ok(Value::Array(players.into_iter().map(Value::Entity).collect()))
}

// ===== control =====

fn if_then_else(evaluator: &mut Evaluator<'_>, args: &[Arg<'_>]) -> Result<Value, EvalError> {
    let condition = eager(IF_F, args, 0)?.as_bool()?;
    let branch = if condition { &args[1] } else { &args[2] };
    evaluator.force(branch)
}

// ===== entity access =====

fn get_prop(evaluator: &mut Evaluator<'_>, args: &[Arg<'_>]) -> Result<Value, EvalError> {
    let entity = eager(GET_PROP_F, args, 0)?.as_entity()?;
    let stat = eager(GET_PROP_F, args, 1)?.as_key()?;
    evaluator.host().property(entity, stat).map(Value::Number)
}

fn mod_value(_: &mut Evaluator<'_>, args: &[Arg<'_>]) -> Result<Value, EvalError> {
    let stat = eager(MOD_VALUE_F, args, 0)?.as_key()?;
    let amount = eager(MOD_VALUE_F, args, 1)?.as_number()?;
    Ok(Value::StatModifier(StatModifier::new(stat, amount)))
}

// ===== side effects =====

/// Participant of a harm or heal. Unknown keys are passed through so the
/// host can treat a removed entity as a no-op instead of an error.
fn participant(value: &Value) -> Result<EntityKey, EvalError> {
    Ok(EntityKey::from(value.as_key()?))
}

fn harm(evaluator: &mut Evaluator<'_>, args: &[Arg<'_>]) -> Result<Value, EvalError> {
    let target = participant(eager(HARM_F, args, 0)?)?;
    let source = participant(eager(HARM_F, args, 1)?)?;
    let damage_type = eager(HARM_F, args, 2)?.as_key()?;
    let amount = eager(HARM_F, args, 3)?.as_number()?;
    evaluator.host().harm(&target, &source, damage_type, amount)?;
    Ok(Value::Null)
}

fn heal(evaluator: &mut Evaluator<'_>, args: &[Arg<'_>]) -> Result<Value, EvalError> {
    let target = participant(eager(HEAL_F, args, 0)?)?;
    let source = participant(eager(HEAL_F, args, 1)?)?;
    let amount = eager(HEAL_F, args, 2)?.as_number()?;
    evaluator.host().heal(&target, &source, amount)?;
    Ok(Value::Null)
}

fn cast(evaluator: &mut Evaluator<'_>, args: &[Arg<'_>]) -> Result<Value, EvalError> {
    let caster = eager(CAST_F, args, 0)?.as_entity()?;
    let target = eager(CAST_F, args, 1)?.as_entity()?;
    let skill = eager(CAST_F, args, 2)?.as_key()?;
    evaluator.host().cast(caster, target, skill)?;
    Ok(Value::Null)
}

fn apply(evaluator: &mut Evaluator<'_>, args: &[Arg<'_>]) -> Result<Value, EvalError> {
    let target = eager(APPLY_F, args, 0)?.as_entity()?;
    let source = eager(APPLY_F, args, 1)?.as_entity()?;
    let status = eager(APPLY_F, args, 2)?.as_key()?;
    let duration = eager(APPLY_F, args, 3)?.as_number()?;
    let values = Value::numbers(eager(APPLY_F, args, 4)?.as_array()?)?;
    evaluator
        .host()
        .apply_status(target, source, status, duration, &values)?;
    Ok(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DetachedHost;
    use crate::registry::Registry;
    use crate::tree::TreeBuilder;

    fn eval_seeded(expr: &str, seed: u64) -> Result<Value, EvalError> {
        let tree = TreeBuilder::new(Registry::shared()).build_str(expr).unwrap();
        let mut host = DetachedHost::with_seed(seed);
        Evaluator::new(&mut host).resolve(&tree)
    }

    fn eval(expr: &str) -> Result<Value, EvalError> {
        eval_seeded(expr, 0)
    }

    #[test]
    fn numeric_functions() {
        assert_eq!(eval("MAX(10,MAX(3,4))").unwrap(), Value::Number(10.0));
        assert_eq!(eval("MIN(4,-2,7)").unwrap(), Value::Number(-2.0));
        assert_eq!(eval("ABS(-3)").unwrap(), Value::Number(3.0));
        assert_eq!(eval("NON_NEG(-3)").unwrap(), Value::Number(0.0));
        assert_eq!(eval("NON_NEG(2.5)").unwrap(), Value::Number(2.5));
    }

    #[test]
    fn random_stays_in_half_open_range() {
        for seed in 0..200 {
            let n = eval_seeded("RANDOM(3,6)", seed).unwrap().as_number().unwrap();
            assert!((3.0..6.0).contains(&n), "{n} out of range");
            assert_eq!(n, n.floor());
        }
        assert_eq!(eval("RANDOM(5,5)").unwrap(), Value::Number(5.0));
        assert_eq!(eval("RANDOM(5,2)").unwrap(), Value::Number(5.0));
    }

    #[test]
    fn chance_bounds() {
        for seed in 0..50 {
            assert_eq!(eval_seeded("CHANCE(100)", seed).unwrap(), Value::Boolean(true));
            assert_eq!(eval_seeded("CHANCE(0)", seed).unwrap(), Value::Boolean(false));
        }
    }

    #[test]
    fn array_and_random_pick() {
        assert_eq!(
            eval("ARRAY(10,MAX(10,20),10)").unwrap(),
            Value::Array(vec![
                Value::Number(10.0),
                Value::Number(20.0),
                Value::Number(10.0)
            ])
        );
        assert_eq!(eval("ARRAY()").unwrap(), Value::Array(vec![]));

        let picked = eval("ARR_RANDOM(ARRAY(1,2,3))").unwrap().as_number().unwrap();
        assert!([1.0, 2.0, 3.0].contains(&picked));
        assert_eq!(eval("ARR_RANDOM(ARRAY())"), Err(EvalError::EmptyArray));
        assert!(matches!(eval("ARR_RANDOM(5)"), Err(EvalError::Type(_))));
    }

    #[test]
    fn if_picks_one_branch() {
        assert_eq!(
            eval("IF(10>3+8,5,IF(20>3,10,1))").unwrap(),
            Value::Number(10.0)
        );
        assert!(matches!(eval("IF(1,2,3)"), Err(EvalError::Type(_))));
    }

    #[test]
    fn mod_value_builds_a_modifier() {
        assert_eq!(
            eval("MOD_VALUE(STR,-2*3)").unwrap(),
            Value::StatModifier(StatModifier::new("STR", -6.0))
        );
    }

    #[test]
    fn entity_functions_need_entities() {
        use crate::error::LookupError;
        assert_eq!(
            eval("GET_PROP(hero,STR)"),
            Err(EvalError::Lookup(LookupError::UnknownEntity("hero".into())))
        );
        assert!(eval("HARM(a,b,PHYS,10)").is_err());
        assert_eq!(eval("GET_PLAYERS()").unwrap(), Value::Array(vec![]));
    }
}
