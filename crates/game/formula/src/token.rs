//! Tokenizer: formula text into a flat token sequence.
//!
//! Whitespace is stripped first. Separators, parentheses and operator
//! symbols are single-character tokens; every other run of characters
//! becomes one token whose kind is looked up in the [`Registry`].
//!
//! # Minus sign
//!
//! A `-` right after a variable or `)` is binary subtraction. Anywhere else
//! it starts a negative literal (`-3`). In front of anything that is not a
//! number (a group, a call, a key or a placeholder) it is lowered to `-1 *`,
//! so `-(2+3)` reads as `-1*(2+3)` and `-$0` as `-1*$0`. The lowered form
//! binds like `*`, so `2^-(3)` is `(2^-1)*3`; write `2^(-(3))` instead.
//! Writing `-` directly after a function name (`MAX-(1)`) is rejected.

use crate::error::ParseError;
use crate::registry::Registry;

/// Kind of a token, derived purely from its text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    /// Number literal, entity key, stat key or placeholder.
    Variable,
    Operator,
    Function,
    LeftParen,
    RightParen,
    Separator,
}

/// Immutable token.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    kind: TokenKind,
    text: String,
}

impl Token {
    /// Classifies `text` against the registry.
    pub fn classify(registry: &Registry, text: impl Into<String>) -> Self {
        let text = text.into();
        let kind = if registry.is_function(&text) {
            TokenKind::Function
        } else if registry.is_operator(&text) {
            TokenKind::Operator
        } else if registry.is_left_paren(&text) {
            TokenKind::LeftParen
        } else if registry.is_right_paren(&text) {
            TokenKind::RightParen
        } else if registry.is_separator(&text) {
            TokenKind::Separator
        } else {
            TokenKind::Variable
        };
        Self { kind, text }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Splits formula text into tokens.
#[derive(Clone, Copy, Debug)]
pub struct Tokenizer<'r> {
    registry: &'r Registry,
}

impl<'r> Tokenizer<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    pub fn tokenize(&self, expression: &str) -> Result<Vec<Token>, ParseError> {
        let cleaned: String = expression
            .chars()
            .filter(|c| !matches!(c, ' ' | '\t' | '\n' | '\r'))
            .collect();
        if cleaned.is_empty() {
            return Err(ParseError::Empty);
        }

        let mut tokens = Vec::new();
        let mut current = String::new();

        for c in cleaned.chars() {
            if !self.registry.is_special_char(c) {
                current.push(c);
                continue;
            }

            if c == '-' {
                if !current.is_empty() {
                    if self.registry.is_function(&current) {
                        return Err(ParseError::MinusAfterFunction { function: current });
                    }
                    self.flush(&mut tokens, &mut current);
                }
                match tokens.last().map(Token::kind) {
                    Some(TokenKind::Function) => {
                        let function = tokens
                            .last()
                            .map(|t| t.text.clone())
                            .unwrap_or_default();
                        return Err(ParseError::MinusAfterFunction { function });
                    }
                    Some(TokenKind::Variable) | Some(TokenKind::RightParen) => {
                        tokens.push(Token::classify(self.registry, c.to_string()));
                    }
                    _ => current.push(c),
                }
                continue;
            }

            self.flush(&mut tokens, &mut current);
            tokens.push(Token::classify(self.registry, c.to_string()));
        }
        self.flush(&mut tokens, &mut current);

        Ok(tokens)
    }

    /// Emits the pending run, lowering a unary minus on a non-number.
    fn flush(&self, tokens: &mut Vec<Token>, current: &mut String) {
        if current.is_empty() {
            return;
        }
        let text = std::mem::take(current);
        match text.strip_prefix('-') {
            Some(rest) if !rest.starts_with(|c: char| c.is_ascii_digit() || c == '.') => {
                tokens.push(Token::classify(self.registry, "-1"));
                tokens.push(Token::classify(self.registry, "*"));
                if !rest.is_empty() {
                    tokens.push(Token::classify(self.registry, rest));
                }
            }
            _ => tokens.push(Token::classify(self.registry, text)),
        }
    }
}

/// Tokenizes `expression` against `registry`.
pub fn tokenize(registry: &Registry, expression: &str) -> Result<Vec<Token>, ParseError> {
    Tokenizer::new(registry).tokenize(expression)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(expr: &str) -> Vec<String> {
        tokenize(Registry::shared(), expr)
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    fn kinds(expr: &str) -> Vec<TokenKind> {
        tokenize(Registry::shared(), expr)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn whitespace_is_stripped() {
        assert_eq!(texts(" 10 *\t13\r\n+ 10 "), vec!["10", "*", "13", "+", "10"]);
    }

    #[test]
    fn function_call_kinds() {
        use TokenKind::*;
        assert_eq!(
            kinds("MAX(STR,3)"),
            vec![Function, LeftParen, Variable, Separator, Variable, RightParen]
        );
    }

    #[test]
    fn minus_after_value_is_binary() {
        assert_eq!(texts("10-13"), vec!["10", "-", "13"]);
        assert_eq!(texts("(1)-2"), vec!["(", "1", ")", "-", "2"]);
    }

    #[test]
    fn minus_elsewhere_starts_a_literal() {
        assert_eq!(texts("-5+2"), vec!["-5", "+", "2"]);
        assert_eq!(texts("3*-2"), vec!["3", "*", "-2"]);
        assert_eq!(texts("MAX(-1,-2)"), vec!["MAX", "(", "-1", ",", "-2", ")"]);
    }

    #[test]
    fn unary_minus_before_group_is_lowered() {
        assert_eq!(texts("-(2+3)"), vec!["-1", "*", "(", "2", "+", "3", ")"]);
        assert_eq!(
            texts("-MAX(1,2)"),
            vec!["-1", "*", "MAX", "(", "1", ",", "2", ")"]
        );
        assert_eq!(kinds("-MAX(1,2)")[2], TokenKind::Function);
    }

    #[test]
    fn unary_minus_on_keys_is_lowered() {
        assert_eq!(
            texts("MOD_VALUE(STR,-$0)"),
            vec!["MOD_VALUE", "(", "STR", ",", "-1", "*", "$0", ")"]
        );
        assert_eq!(texts("-STR"), vec!["-1", "*", "STR"]);
        assert_eq!(texts("-.5"), vec!["-.5"]);
    }

    #[test]
    fn minus_directly_after_function_name_is_rejected() {
        // Known limitation: a function name must be followed by '('.
        let err = tokenize(Registry::shared(), "MAX-(1)").unwrap_err();
        assert_eq!(
            err,
            ParseError::MinusAfterFunction {
                function: "MAX".into()
            }
        );
    }

    #[test]
    fn empty_input_is_an_error() {
        assert_eq!(tokenize(Registry::shared(), "  \n"), Err(ParseError::Empty));
    }

    #[test]
    fn placeholders_are_variables() {
        let tokens = tokenize(Registry::shared(), "$VALUE-$0").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].kind(), TokenKind::Variable);
        assert_eq!(tokens[1].kind(), TokenKind::Operator);
        assert_eq!(tokens[2].text(), "$0");
    }
}
