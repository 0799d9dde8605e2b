//! Placeholder binding.
//!
//! Templates are parsed once with placeholders (`$TARGET`, `$CASTER`,
//! `$VALUE`, `$0`, ...) and bare stat names left as keys. Before each
//! evaluation the engine binds them to concrete entities and numbers. Every
//! transform here builds a new tree; the cached template is never touched.
//!
//! Bare stat rewriting turns `STR` into `GET_PROP(entity, STR)`. Argument
//! positions that name something (the stat in `GET_PROP`, the damage type in
//! `HARM`, ...) are skipped so names stay names.

use std::convert::Infallible;
use std::sync::Arc;

use crate::error::{EvalError, LookupError};
use crate::host::StatLookup;
use crate::registry::{Function, Registry};
use crate::symbols::{
    CASTER_KEYWORD, GET_PROP_F, TARGET_KEYWORD, VALUE_KEYWORD, numeric_placeholder_index,
};
use crate::tree::{ArgSlot, Node};
use crate::value::{EntityKey, Value};

/// Binds placeholders in template trees.
#[derive(Clone, Debug)]
pub struct Sanitizer<'r> {
    registry: &'r Registry,
}

impl<'r> Sanitizer<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Rewrites every leaf for which `rewrite` returns a replacement.
    fn rewrite_leaves<E>(
        tree: &Node,
        mut rewrite: impl FnMut(&str, Option<ArgSlot<'_>>) -> Result<Option<Node>, E>,
    ) -> Result<Node, E> {
        tree.map(&mut |node, slot| {
            if !node.is_leaf() {
                return Ok(node);
            }
            let replacement = match node.value() {
                Value::Key(key) => rewrite(key.as_str(), slot)?,
                _ => None,
            };
            Ok(replacement.unwrap_or(node))
        })
    }

    fn infallible(result: Result<Node, Infallible>) -> Node {
        let Ok(node) = result;
        node
    }

    /// Binds `$CASTER` to `source` and `$TARGET` to `target`.
    pub fn replace_target_and_source(
        &self,
        tree: &Node,
        source: &EntityKey,
        target: &EntityKey,
    ) -> Node {
        Self::infallible(Self::rewrite_leaves::<Infallible>(tree, |key, _| {
            Ok(match key {
                CASTER_KEYWORD => Some(entity_leaf(source)),
                TARGET_KEYWORD => Some(entity_leaf(target)),
                _ => None,
            })
        }))
    }

    /// Binds `$0`, `$1`, ... to the status application arguments.
    pub fn replace_numeric_placeholders(
        &self,
        tree: &Node,
        values: &[f64],
    ) -> Result<Node, EvalError> {
        Self::rewrite_leaves::<EvalError>(tree, |key, _| {
            let Some(index) = numeric_placeholder_index(key) else {
                return Ok(None);
            };
            let value = values.get(index).copied().ok_or_else(|| {
                LookupError::UnknownPlaceholder {
                    placeholder: key.to_owned(),
                    available: values.len(),
                }
            })?;
            Ok(Some(Node::leaf(Value::Number(value))))
        })
    }

    /// Binds `$VALUE` to the amount being mitigated.
    pub fn replace_value(&self, tree: &Node, amount: f64) -> Node {
        Self::infallible(Self::rewrite_leaves::<Infallible>(tree, |key, _| {
            Ok((key == VALUE_KEYWORD).then(|| Node::leaf(Value::Number(amount))))
        }))
    }

    /// Turns bare stat names of `entity` into `GET_PROP(entity, STAT)`.
    pub fn replace_properties(
        &self,
        tree: &Node,
        entity: &EntityKey,
        stats: &dyn StatLookup,
    ) -> Node {
        let Some(get_prop) = self.get_prop() else {
            tracing::warn!("registry has no {GET_PROP_F}; bare stats left unbound");
            return tree.clone();
        };
        Self::infallible(Self::rewrite_leaves::<Infallible>(tree, |key, slot| {
            if slot.is_some_and(|slot| slot.is_key()) || !stats.has_stat(entity, key) {
                return Ok(None);
            }
            Ok(Some(Node::call(
                Arc::clone(&get_prop),
                vec![entity_leaf(entity), Node::leaf(Value::Key(key.to_owned()))],
            )))
        }))
    }

    fn get_prop(&self) -> Option<Arc<Function>> {
        self.registry.function(GET_PROP_F).cloned()
    }

    // ===== compositions =====

    /// Skill, dodge and crit formulas: bare stats belong to the caster.
    pub fn sanitize_skill_entities(
        &self,
        tree: &Node,
        source: &EntityKey,
        target: &EntityKey,
        stats: &dyn StatLookup,
    ) -> Node {
        let bound = self.replace_target_and_source(tree, source, target);
        self.replace_properties(&bound, source, stats)
    }

    /// Mitigation formulas: bare stats belong to the defender.
    pub fn sanitize_mitigation(
        &self,
        tree: &Node,
        target: &EntityKey,
        source: &EntityKey,
        amount: f64,
        stats: &dyn StatLookup,
    ) -> Node {
        let bound = self.replace_target_and_source(tree, source, target);
        let bound = self.replace_value(&bound, amount);
        self.replace_properties(&bound, target, stats)
    }

    /// Status components and intervals.
    pub fn sanitize_status(
        &self,
        tree: &Node,
        source: &EntityKey,
        target: &EntityKey,
        values: &[f64],
    ) -> Result<Node, EvalError> {
        let bound = self.replace_target_and_source(tree, source, target);
        self.replace_numeric_placeholders(&bound, values)
    }

    /// Free-standing expression over one entity's stats.
    pub fn sanitize_compound_stat(
        &self,
        tree: &Node,
        entity: &EntityKey,
        stats: &dyn StatLookup,
    ) -> Node {
        let bound = self.replace_target_and_source(tree, entity, entity);
        self.replace_properties(&bound, entity, stats)
    }
}

fn entity_leaf(entity: &EntityKey) -> Node {
    Node::leaf(Value::Key(entity.as_str().to_owned()))
}
