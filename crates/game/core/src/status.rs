//! Status templates and their applied instances.

use std::sync::Arc;

use game_formula::{Node, ParseError, TreeBuilder};

use crate::EntityKey;
use crate::timer::Timestamp;

/// What happens when a status is applied to an entity that already has it.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StackingType {
    /// One instance; reapplying pushes its removal time out.
    #[default]
    Refresh,
    /// One instance; reapplying does nothing.
    None,
    /// Separate instances up to the max-stacks limit.
    Independent,
}

/// Designer definition of a status effect.
///
/// Formulas may use `$TARGET`, `$CASTER` and the numeric placeholders `$0`,
/// `$1`, ... bound to the values supplied when the status is applied.
/// Components rooted at `MOD_VALUE` modify derived stats each tick;
/// components rooted at `HARM` or `HEAL` run as tick effects.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusTemplate {
    pub key: String,
    pub stacking: StackingType,
    /// Stack limit for [`StackingType::Independent`]. Missing or 0 means
    /// unlimited.
    pub max_stacks: Option<Node>,
    /// Seconds between ticks.
    pub interval: Node,
    pub components: Vec<Node>,
}

impl StatusTemplate {
    /// Parses a template from formula text.
    pub fn parse(
        builder: &TreeBuilder<'_>,
        key: impl Into<String>,
        stacking: StackingType,
        max_stacks: Option<&str>,
        interval: &str,
        components: &[impl AsRef<str>],
    ) -> Result<Self, ParseError> {
        Ok(Self {
            key: key.into(),
            stacking,
            max_stacks: max_stacks.map(|text| builder.build_str(text)).transpose()?,
            interval: builder.build_str(interval)?,
            components: components
                .iter()
                .map(|text| builder.build_str(text.as_ref()))
                .collect::<Result<_, _>>()?,
        })
    }
}

/// A status instance living on an entity.
#[derive(Clone, Debug)]
pub struct AppliedStatus {
    /// Engine-unique instance id.
    pub id: u64,
    pub template: Arc<StatusTemplate>,
    /// Who applied it. May outlive the entity it names.
    pub source: EntityKey,
    /// `None` until the first tick.
    pub last_tick: Option<Timestamp>,
    /// `None` never expires.
    pub removal: Option<Timestamp>,
    pub interval_ms: i64,
    pub values: Vec<f64>,
}

impl AppliedStatus {
    pub fn key(&self) -> &str {
        &self.template.key
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.removal.is_some_and(|removal| now > removal)
    }

    /// Whether the status ticks at `now`.
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.last_tick
            .is_none_or(|last| now.since(last) >= self.interval_ms)
    }
}

/// Removal time for a status lasting `duration_s` seconds from `now`.
///
/// Zero, negative, infinite and NaN durations never expire.
pub fn removal_time(now: Timestamp, duration_s: f64) -> Option<Timestamp> {
    (duration_s > 0.0 && duration_s.is_finite()).then(|| now + (duration_s * 1000.0) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_formula::Registry;
    use std::str::FromStr;

    fn poison() -> Arc<StatusTemplate> {
        let builder = TreeBuilder::new(Registry::shared());
        Arc::new(
            StatusTemplate::parse(
                &builder,
                "poison",
                StackingType::Independent,
                Some("3"),
                "1",
                &["HARM($TARGET,$CASTER,T,$0)"],
            )
            .unwrap(),
        )
    }

    fn applied(last_tick: Option<i64>, removal: Option<i64>) -> AppliedStatus {
        AppliedStatus {
            id: 1,
            template: poison(),
            source: "mage".into(),
            last_tick: last_tick.map(Timestamp),
            removal: removal.map(Timestamp),
            interval_ms: 1000,
            values: vec![5.0],
        }
    }

    #[test]
    fn never_ticked_is_due() {
        assert!(applied(None, None).is_due(Timestamp(0)));
    }

    #[test]
    fn due_after_a_full_interval() {
        let status = applied(Some(1000), None);
        assert!(!status.is_due(Timestamp(1999)));
        assert!(status.is_due(Timestamp(2000)));
    }

    #[test]
    fn expiry_is_strictly_after_removal() {
        let status = applied(None, Some(5000));
        assert!(!status.is_expired(Timestamp(5000)));
        assert!(status.is_expired(Timestamp(5001)));
        assert!(!applied(None, None).is_expired(Timestamp(i64::MAX)));
    }

    #[test]
    fn removal_time_only_for_positive_durations() {
        assert_eq!(removal_time(Timestamp(100), 2.5), Some(Timestamp(2600)));
        assert_eq!(removal_time(Timestamp(100), 0.0), None);
        assert_eq!(removal_time(Timestamp(100), -1.0), None);
        assert_eq!(removal_time(Timestamp(100), f64::INFINITY), None);
        assert_eq!(removal_time(Timestamp(100), f64::NAN), None);
        assert_eq!(removal_time(Timestamp(100), 1e300), Some(Timestamp(i64::MAX)));
    }

    #[test]
    fn stacking_parses_from_designer_text() {
        assert_eq!(StackingType::from_str("independent").unwrap(), StackingType::Independent);
        assert_eq!(StackingType::from_str("Refresh").unwrap(), StackingType::Refresh);
        assert!(StackingType::from_str("forever").is_err());
    }

    #[test]
    fn parse_reports_bad_components() {
        let builder = TreeBuilder::new(Registry::shared());
        let err = StatusTemplate::parse(
            &builder,
            "broken",
            StackingType::None,
            None,
            "1",
            &["MAX(1,2"],
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::UnmatchedParen { .. }));
    }
}
