use game_formula::{Node, ParseError, TreeBuilder};

/// Castable skill. `$CASTER` and `$TARGET` bind at cast time, and bare stat
/// names read the caster's stats.
#[derive(Clone, Debug, PartialEq)]
pub struct SkillTemplate {
    pub key: String,
    pub formula: Node,
}

impl SkillTemplate {
    pub fn parse(
        builder: &TreeBuilder<'_>,
        key: impl Into<String>,
        formula: &str,
    ) -> Result<Self, ParseError> {
        Ok(Self {
            key: key.into(),
            formula: builder.build_str(formula)?,
        })
    }
}
