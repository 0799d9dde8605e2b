//! Lazy tree evaluator.
//!
//! Resolution is a single recursive pass with no memoization: formulas read
//! live entity state, so identical sub-expressions are evaluated again every
//! time they appear.
//!
//! Function arguments are resolved eagerly unless the function marks the
//! position lazy. Lazy positions are handed to the native evaluation as
//! [`Arg::Deferred`] and only run if the function calls [`Evaluator::force`].
//! This is what keeps the untaken branch of `IF` free of side effects.

use crate::error::EvalError;
use crate::host::Host;
use crate::tree::Node;
use crate::value::{EntityKey, Value};

/// Nesting limit for a single resolution.
pub const MAX_EVAL_DEPTH: usize = 256;

/// Function argument as seen by a native evaluation.
#[derive(Clone, Debug)]
pub enum Arg<'n> {
    /// Eagerly resolved value.
    Value(Value),
    /// Unevaluated sub-tree, resolved only through [`Evaluator::force`].
    Deferred(&'n Node),
}

impl Arg<'_> {
    /// The resolved value, or `None` for a deferred argument.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Deferred(_) => None,
        }
    }
}

/// Resolves trees against a [`Host`].
pub struct Evaluator<'h> {
    host: &'h mut dyn Host,
    depth: usize,
}

impl<'h> Evaluator<'h> {
    pub fn new(host: &'h mut dyn Host) -> Self {
        Self { host, depth: 0 }
    }

    /// The engine capability handle.
    pub fn host(&mut self) -> &mut (dyn Host + 'h) {
        &mut *self.host
    }

    /// Resolves `node` to a value.
    pub fn resolve(&mut self, node: &Node) -> Result<Value, EvalError> {
        if self.depth >= MAX_EVAL_DEPTH {
            return Err(EvalError::RecursionLimit {
                limit: MAX_EVAL_DEPTH,
            });
        }
        self.depth += 1;
        let result = self.resolve_inner(node);
        self.depth -= 1;
        result
    }

    /// Resolves `node` into a fresh leaf. The input tree is left untouched.
    pub fn resolve_node(&mut self, node: &Node) -> Result<Node, EvalError> {
        self.resolve(node).map(Node::leaf)
    }

    /// Resolves an argument, running a deferred sub-tree if needed.
    pub fn force(&mut self, arg: &Arg<'_>) -> Result<Value, EvalError> {
        match arg {
            Arg::Value(value) => Ok(value.clone()),
            Arg::Deferred(node) => self.resolve(node),
        }
    }

    fn resolve_inner(&mut self, node: &Node) -> Result<Value, EvalError> {
        match node.value() {
            Value::Operator(op) => {
                let operands = node
                    .children()
                    .iter()
                    .map(|child| self.resolve(child))
                    .collect::<Result<Vec<_>, _>>()?;
                op.apply(&operands)
            }
            Value::Function(func) => {
                let mut args = Vec::with_capacity(node.children().len());
                for (position, child) in node.children().iter().enumerate() {
                    if func.is_lazy(position) {
                        args.push(Arg::Deferred(child));
                    } else {
                        args.push(Arg::Value(self.resolve(child)?));
                    }
                }
                func.call(self, &args)
            }
            Value::Key(key) if self.host.entity_exists(key) => {
                Ok(Value::Entity(EntityKey::from(key.as_str())))
            }
            literal => Ok(literal.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DetachedHost;
    use crate::registry::Registry;
    use crate::tree::TreeBuilder;

    fn eval(expr: &str) -> Result<Value, EvalError> {
        let tree = TreeBuilder::new(Registry::shared()).build_str(expr).unwrap();
        let mut host = DetachedHost::new();
        Evaluator::new(&mut host).resolve(&tree)
    }

    #[test]
    fn resolve_node_leaves_the_input_untouched() {
        let tree = TreeBuilder::new(Registry::shared())
            .build_str("11+10")
            .unwrap();
        let mut host = DetachedHost::new();
        let resolved = Evaluator::new(&mut host).resolve_node(&tree).unwrap();

        assert_eq!(resolved, Node::leaf(Value::Number(21.0)));
        assert_eq!(tree.value().as_operator().unwrap().symbol(), "+");
        let leaves: Vec<f64> = tree
            .children()
            .iter()
            .map(|c| c.value().as_number().unwrap())
            .collect();
        assert_eq!(leaves, vec![11.0, 10.0]);
    }

    #[test]
    fn unknown_keys_stay_keys() {
        assert_eq!(eval("STR").unwrap(), Value::Key("STR".into()));
    }

    #[test]
    fn untaken_branch_errors_are_never_raised() {
        // The else branch would fail the type check if it were evaluated.
        assert_eq!(eval("IF(1<2, 5, 1+(3>2))").unwrap(), Value::Number(5.0));
        assert!(eval("IF(1>2, 5, 1+(3>2))").is_err());
    }

    #[test]
    fn depth_limit_is_enforced() {
        let expr = format!("{}1{}", "ABS(".repeat(MAX_EVAL_DEPTH + 1), ")".repeat(MAX_EVAL_DEPTH + 1));
        let err = eval(&expr).unwrap_err();
        assert_eq!(
            err,
            EvalError::RecursionLimit {
                limit: MAX_EVAL_DEPTH
            }
        );
    }
}
