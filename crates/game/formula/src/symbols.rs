//! Reserved spellings of the formula language.

// ===== operators =====
pub const PLUS_OP: &str = "+";
pub const MINUS_OP: &str = "-";
pub const MULTIPLY_OP: &str = "*";
pub const DIVIDE_OP: &str = "/";
pub const POWER_OP: &str = "^";
pub const NOT_OP: &str = "!";
pub const GREATER_OP: &str = ">";
pub const LESSER_OP: &str = "<";
pub const EQUAL_OP: &str = "=";

// ===== functions =====
pub const MAX_F: &str = "MAX";
pub const MIN_F: &str = "MIN";
pub const ABS_F: &str = "ABS";
pub const NON_NEG_F: &str = "NON_NEG";
pub const RANDOM_F: &str = "RANDOM";
pub const HARM_F: &str = "HARM";
pub const HEAL_F: &str = "HEAL";
pub const ARRAY_F: &str = "ARRAY";
pub const GET_PLAYERS_F: &str = "GET_PLAYERS";
pub const GET_ACTIVE_PLAYERS_F: &str = "GET_ACTIVE_PLAYERS";
pub const GET_PROP_F: &str = "GET_PROP";
pub const IF_F: &str = "IF";
pub const ARR_RANDOM_F: &str = "ARR_RANDOM";
pub const CHANCE_F: &str = "CHANCE";
pub const CAST_F: &str = "CAST";
pub const MOD_VALUE_F: &str = "MOD_VALUE";
pub const APPLY_F: &str = "APPLY";

// ===== punctuation =====
pub const PARAM_SEPARATOR: char = ',';
pub const LEFT_PAREN: char = '(';
pub const RIGHT_PAREN: char = ')';

// ===== placeholders =====
/// Prefix shared by every placeholder leaf.
pub const PLACEHOLDER_PREFIX: char = '$';
pub const TARGET_KEYWORD: &str = "$TARGET";
pub const CASTER_KEYWORD: &str = "$CASTER";
/// Amount being mitigated, bound by damage-type mitigation formulas.
pub const VALUE_KEYWORD: &str = "$VALUE";

/// Parses `$0`, `$1`, ... into the index of a status application argument.
pub fn numeric_placeholder_index(text: &str) -> Option<usize> {
    let digits = text.strip_prefix(PLACEHOLDER_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_placeholders_parse_only_digits() {
        assert_eq!(numeric_placeholder_index("$0"), Some(0));
        assert_eq!(numeric_placeholder_index("$12"), Some(12));
        assert_eq!(numeric_placeholder_index("$TARGET"), None);
        assert_eq!(numeric_placeholder_index("$"), None);
        assert_eq!(numeric_placeholder_index("12"), None);
    }
}
