//! Expression trees and the precedence-climbing tree builder.
//!
//! A [`Node`] holds a value and its ordered children. Leaves are literals or
//! unresolved keys; internal nodes hold an operator or function whose
//! children are its operands in declared order. Trees are immutable once
//! built, and `Clone` is a deep structural copy, so a cached template tree
//! can be rewritten per evaluation without aliasing.

use std::sync::Arc;

use crate::error::ParseError;
use crate::registry::{Function, Operator, Registry};
use crate::token::{Token, TokenKind, Tokenizer};
use crate::value::Value;

/// Expression tree node.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    value: Value,
    children: Vec<Node>,
}

impl Node {
    pub fn leaf(value: Value) -> Self {
        Self {
            value,
            children: Vec::new(),
        }
    }

    pub fn operator(op: Arc<Operator>, operands: Vec<Node>) -> Self {
        Self {
            value: Value::Operator(op),
            children: operands,
        }
    }

    pub fn call(func: Arc<Function>, args: Vec<Node>) -> Self {
        Self {
            value: Value::Function(func),
            children: args,
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && !matches!(self.value, Value::Function(_))
    }

    /// Function name if this node is a call.
    pub fn function_name(&self) -> Option<&'static str> {
        match &self.value {
            Value::Function(func) => Some(func.name()),
            _ => None,
        }
    }

    /// Whether this node is a call to the function named `name`.
    pub fn is_call_to(&self, name: &str) -> bool {
        self.function_name() == Some(name)
    }

    /// Rebuilds the tree bottom-up. `rewrite` sees each node after its
    /// children were rebuilt, together with the function position it sits
    /// in (`None` at the root and under operators).
    pub fn map<E>(
        &self,
        rewrite: &mut impl FnMut(Node, Option<ArgSlot<'_>>) -> Result<Node, E>,
    ) -> Result<Node, E> {
        self.map_at(None, rewrite)
    }

    fn map_at<E>(
        &self,
        slot: Option<ArgSlot<'_>>,
        rewrite: &mut impl FnMut(Node, Option<ArgSlot<'_>>) -> Result<Node, E>,
    ) -> Result<Node, E> {
        let parent = match &self.value {
            Value::Function(func) => Some(func.as_ref()),
            _ => None,
        };
        let children = self
            .children
            .iter()
            .enumerate()
            .map(|(position, child)| {
                let slot = parent.map(|function| ArgSlot { function, position });
                child.map_at(slot, rewrite)
            })
            .collect::<Result<Vec<_>, E>>()?;
        rewrite(
            Node {
                value: self.value.clone(),
                children,
            },
            slot,
        )
    }
}

/// Position of a node among a function call's arguments.
#[derive(Clone, Copy, Debug)]
pub struct ArgSlot<'f> {
    pub function: &'f Function,
    pub position: usize,
}

impl ArgSlot<'_> {
    /// Whether the argument in this slot names something rather than
    /// computing a value.
    pub fn is_key(&self) -> bool {
        self.function.is_key_arg(self.position)
    }
}

// ============================================================================
// Tree Builder
// ============================================================================

/// Builds trees from tokens using the registry's precedence table.
#[derive(Clone, Copy, Debug)]
pub struct TreeBuilder<'r> {
    registry: &'r Registry,
}

impl<'r> TreeBuilder<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Tokenizes and builds `expression`.
    pub fn build_str(&self, expression: &str) -> Result<Node, ParseError> {
        let tokens = Tokenizer::new(self.registry).tokenize(expression)?;
        self.build(&tokens)
    }

    pub fn build(&self, tokens: &[Token]) -> Result<Node, ParseError> {
        if tokens.is_empty() {
            return Err(ParseError::Empty);
        }
        let mut parser = Parser {
            registry: self.registry,
            tokens,
            pos: 0,
        };
        let root = parser.expression(0)?;
        match parser.peek() {
            None => Ok(root),
            Some(token) if token.kind() == TokenKind::RightParen => {
                Err(ParseError::UnmatchedParen {
                    position: parser.pos,
                })
            }
            Some(_) => Err(ParseError::TrailingInput {
                position: parser.pos,
            }),
        }
    }
}

struct Parser<'t, 'r> {
    registry: &'r Registry,
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t, '_> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(Token::kind)
    }

    fn unexpected(&self, token: &Token) -> ParseError {
        ParseError::UnexpectedToken {
            token: token.text().to_owned(),
            position: self.pos,
        }
    }

    /// Binary operator at the cursor, if any.
    fn peek_binary(&self) -> Option<Arc<Operator>> {
        let token = self.peek()?;
        if token.kind() != TokenKind::Operator {
            return None;
        }
        self.registry
            .operator(token.text())
            .filter(|op| !op.is_prefix())
            .cloned()
    }

    fn expression(&mut self, min_precedence: u8) -> Result<Node, ParseError> {
        let mut lhs = self.operand()?;

        while let Some(op) = self.peek_binary() {
            if op.precedence() < min_precedence {
                break;
            }
            self.pos += 1;
            let next_min = if op.is_left_associative() {
                op.precedence() + 1
            } else {
                op.precedence()
            };
            let rhs = self.expression(next_min)?;
            lhs = Node::operator(op, vec![lhs, rhs]);
        }

        Ok(lhs)
    }

    fn operand(&mut self) -> Result<Node, ParseError> {
        let token = self.peek().ok_or(ParseError::UnexpectedEnd)?;
        match token.kind() {
            TokenKind::Variable => {
                self.pos += 1;
                if self.peek_kind() == Some(TokenKind::LeftParen) {
                    return Err(ParseError::UnknownFunction {
                        name: token.text().to_owned(),
                    });
                }
                Ok(Node::leaf(literal(token.text())))
            }
            TokenKind::LeftParen => {
                let open = self.pos;
                self.pos += 1;
                let inner = self.expression(0)?;
                match self.peek() {
                    Some(t) if t.kind() == TokenKind::RightParen => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    Some(t) => Err(self.unexpected(t)),
                    None => Err(ParseError::UnmatchedParen { position: open }),
                }
            }
            TokenKind::Function => self.call(token),
            TokenKind::Operator => {
                let op = self
                    .registry
                    .operator(token.text())
                    .filter(|op| op.is_prefix())
                    .cloned()
                    .ok_or_else(|| self.unexpected(token))?;
                self.pos += 1;
                // Prefix operators take everything that binds at least as tightly.
                let operand = self.expression(op.precedence())?;
                Ok(Node::operator(op, vec![operand]))
            }
            TokenKind::RightParen | TokenKind::Separator => Err(self.unexpected(token)),
        }
    }

    fn call(&mut self, name: &Token) -> Result<Node, ParseError> {
        let func = self
            .registry
            .function(name.text())
            .cloned()
            .ok_or_else(|| ParseError::UnknownFunction {
                name: name.text().to_owned(),
            })?;
        self.pos += 1;

        match self.peek() {
            Some(t) if t.kind() == TokenKind::LeftParen => {}
            Some(t) => return Err(self.unexpected(t)),
            None => return Err(ParseError::UnexpectedEnd),
        }
        let open = self.pos;
        self.pos += 1;

        let mut args = Vec::new();
        if self.peek_kind() == Some(TokenKind::RightParen) {
            self.pos += 1;
        } else {
            loop {
                args.push(self.expression(0)?);
                match self.peek() {
                    Some(t) if t.kind() == TokenKind::Separator => self.pos += 1,
                    Some(t) if t.kind() == TokenKind::RightParen => {
                        self.pos += 1;
                        break;
                    }
                    Some(t) => return Err(self.unexpected(t)),
                    None => return Err(ParseError::UnmatchedParen { position: open }),
                }
            }
        }

        if !func.arity().accepts(args.len()) {
            return Err(ParseError::Arity {
                name: func.name().to_owned(),
                expected: func.arity().to_string(),
                found: args.len(),
            });
        }
        Ok(Node::call(func, args))
    }
}

/// Number literal, or an unresolved key for anything else.
fn literal(text: &str) -> Value {
    parse_number(text).map_or_else(|| Value::Key(text.to_owned()), Value::Number)
}

/// Accepts decimal literals only, so keys such as `inf` or `nan` stay keys.
fn parse_number(text: &str) -> Option<f64> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let first = digits.chars().next()?;
    if !(first.is_ascii_digit() || first == '.') {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::*;

    fn build(expr: &str) -> Result<Node, ParseError> {
        TreeBuilder::new(Registry::shared()).build_str(expr)
    }

    fn shape(node: &Node) -> String {
        match node.value() {
            Value::Operator(op) => {
                let parts: Vec<String> = node.children().iter().map(shape).collect();
                format!("({} {})", op.symbol(), parts.join(" "))
            }
            Value::Function(func) => {
                let parts: Vec<String> = node.children().iter().map(shape).collect();
                format!("{}[{}]", func.name(), parts.join(","))
            }
            other => other.to_string(),
        }
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(shape(&build("10*13+10").unwrap()), "(+ (* 10 13) 10)");
        assert_eq!(shape(&build("10+10^3+10").unwrap()), "(+ (+ 10 (^ 10 3)) 10)");
        assert_eq!(shape(&build("10-3-2").unwrap()), "(- (- 10 3) 2)");
        assert_eq!(shape(&build("2^3^2").unwrap()), "(^ (^ 2 3) 2)");
        assert_eq!(shape(&build("10>3+8").unwrap()), "(> 10 (+ 3 8))");
    }

    #[test]
    fn parentheses_group_without_nodes() {
        assert_eq!(shape(&build("(10+3)*2").unwrap()), "(* (+ 10 3) 2)");
        assert_eq!(shape(&build("((7))").unwrap()), "7");
    }

    #[test]
    fn prefix_not_binds_loosest() {
        assert_eq!(shape(&build("!(10>3+8)").unwrap()), "(! (> 10 (+ 3 8)))");
        assert_eq!(shape(&build("!10>3+8").unwrap()), "(! (> 10 (+ 3 8)))");
    }

    #[test]
    fn function_arguments_keep_their_order() {
        let tree = build("ARRAY(10,MAX(10,20),10)").unwrap();
        assert_eq!(shape(&tree), "ARRAY[10,MAX[10,20],10]");
        assert!(tree.is_call_to(ARRAY_F));
        assert_eq!(build("GET_PLAYERS()").unwrap().children().len(), 0);
    }

    #[test]
    fn keys_and_numbers() {
        let tree = build("GET_PROP(hero,STR)").unwrap();
        assert_eq!(tree.children()[0].value(), &Value::Key("hero".into()));
        assert_eq!(tree.children()[1].value(), &Value::Key("STR".into()));
        assert_eq!(build("-2.5").unwrap().value(), &Value::Number(-2.5));
        assert_eq!(build("nan").unwrap().value(), &Value::Key("nan".into()));
    }

    #[test]
    fn wrong_arity_is_rejected() {
        assert_eq!(
            build("ABS(1,2)"),
            Err(ParseError::Arity {
                name: ABS_F.into(),
                expected: "1".into(),
                found: 2,
            })
        );
        assert!(matches!(build("MAX()"), Err(ParseError::Arity { .. })));
        assert!(matches!(build("IF(1>2,3)"), Err(ParseError::Arity { .. })));
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert!(matches!(build("(1+2"), Err(ParseError::UnmatchedParen { .. })));
        assert!(matches!(build("1+2)"), Err(ParseError::UnmatchedParen { .. })));
        assert!(matches!(build("MAX(1,2"), Err(ParseError::UnmatchedParen { .. })));
        assert_eq!(build("1+"), Err(ParseError::UnexpectedEnd));
        assert!(matches!(build("*3"), Err(ParseError::UnexpectedToken { .. })));
        assert!(matches!(build("1 2"), Ok(_)), "whitespace joins runs: '12'");
        assert!(matches!(build("(1)(2)"), Err(ParseError::TrailingInput { .. })));
        assert!(matches!(build("MAX"), Err(ParseError::UnexpectedEnd)));
        assert_eq!(
            build("FOO(1)"),
            Err(ParseError::UnknownFunction { name: "FOO".into() })
        );
        assert!(matches!(build("MAX(1,,2)"), Err(ParseError::UnexpectedToken { .. })));
    }

    #[test]
    fn clone_is_a_deep_copy() {
        let tree = build("11+10").unwrap();
        let copy = tree.clone();
        assert_eq!(tree, copy);
        assert!(!std::ptr::eq(&tree.children()[0], &copy.children()[0]));
    }

    #[test]
    fn map_reports_argument_slots() {
        let tree = build("GET_PROP(hero,STR)+STR").unwrap();
        let mut key_slots = Vec::new();
        tree.map::<()>(&mut |node, slot| {
            if let Some(slot) = slot {
                key_slots.push((node.value().to_string(), slot.is_key()));
            }
            Ok(node)
        })
        .unwrap();
        assert_eq!(
            key_slots,
            vec![("hero".to_string(), false), ("STR".to_string(), true)]
        );
    }
}
