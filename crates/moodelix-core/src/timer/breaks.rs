//! Auto-break scheduling.
//!
//! A long focus session is divided into equal segments with a break
//! checkpoint between each pair. Both the number of checkpoints and the
//! length of each pause are tiered by the total session length.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Inclusive bounds for a user-chosen pause length, minutes.
pub const MIN_BREAK_DURATION: u32 = 5;
pub const MAX_BREAK_DURATION: u32 = 30;

/// Sessions of this length or longer use fixed 21-minute segments.
const MARATHON_MIN: u32 = 240;
const MARATHON_SEGMENT_MIN: u32 = 21;
const MARATHON_BREAKS: u32 = 7;

/// A precomputed pause checkpoint inside a focus session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledBreak {
    pub id: String,
    /// Minutes from the start of the session.
    #[serde(rename = "time")]
    pub time_offset_minutes: u32,
    pub completed: bool,
    pub skipped: bool,
}

impl ScheduledBreak {
    fn new(index: u32, offset: u32) -> Self {
        Self {
            id: format!("break-{index}"),
            time_offset_minutes: offset,
            completed: false,
            skipped: false,
        }
    }

    /// Neither taken nor skipped yet.
    pub fn is_pending(&self) -> bool {
        !self.completed && !self.skipped
    }
}

/// User-facing auto-break switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoBreakSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Length of each scheduled pause, minutes.
    #[serde(default = "default_break_duration")]
    pub break_duration: u32,
    #[serde(default)]
    pub skip_breaks: bool,
}

fn default_true() -> bool {
    true
}

fn default_break_duration() -> u32 {
    10
}

impl Default for AutoBreakSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            break_duration: default_break_duration(),
            skip_breaks: false,
        }
    }
}

impl AutoBreakSettings {
    /// Whether checkpoints should be scheduled and honoured at all.
    pub fn active(&self) -> bool {
        self.enabled && !self.skip_breaks
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if (MIN_BREAK_DURATION..=MAX_BREAK_DURATION).contains(&self.break_duration) {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                field: "breakDuration",
                min: MIN_BREAK_DURATION,
                max: MAX_BREAK_DURATION,
                value: self.break_duration,
            })
        }
    }
}

/// Number of breaks and segment length for a session of `total_minutes`.
fn break_plan(total_minutes: u32) -> (u32, u32) {
    match total_minutes {
        t if t >= MARATHON_MIN => (MARATHON_BREAKS, MARATHON_SEGMENT_MIN),
        t if t >= 150 => (4, t / 5),
        t if t >= 120 => (3, t / 4),
        t if t >= 90 => (2, t / 3),
        t if t >= 60 => (1, t / 2),
        _ => (0, 0),
    }
}

/// Break checkpoints for a focus session of `total_minutes`.
///
/// Offsets are `segment * i` for `i = 1..=breaks`; sessions under an hour
/// get no breaks.
pub fn calculate_auto_breaks(total_minutes: u32) -> Vec<ScheduledBreak> {
    let (count, segment) = break_plan(total_minutes);
    (1..=count)
        .map(|i| ScheduledBreak::new(i, segment * i))
        .collect()
}

/// Recommended pause length, minutes, for a session of `session_minutes`.
pub fn calculate_break_duration(session_minutes: u32) -> u32 {
    match session_minutes {
        m if m >= 240 => 15,
        m if m >= 150 => 12,
        m if m >= 120 => 10,
        m if m >= 90 => 8,
        _ => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn break_duration_bounds() {
        let at = |break_duration| AutoBreakSettings {
            break_duration,
            ..AutoBreakSettings::default()
        };
        assert!(AutoBreakSettings::default().validate().is_ok());
        assert!(at(5).validate().is_ok());
        assert!(at(30).validate().is_ok());
        assert_eq!(
            at(0).validate(),
            Err(ValidationError::OutOfRange {
                field: "breakDuration",
                min: 5,
                max: 30,
                value: 0,
            })
        );
        assert!(at(31).validate().is_err());
    }

    fn offsets(total: u32) -> Vec<u32> {
        calculate_auto_breaks(total)
            .iter()
            .map(|b| b.time_offset_minutes)
            .collect()
    }

    #[test]
    fn tier_table_break_counts() {
        assert_eq!(calculate_auto_breaks(240).len(), 7);
        assert_eq!(calculate_auto_breaks(239).len(), 4);
        assert_eq!(calculate_auto_breaks(150).len(), 4);
        assert_eq!(calculate_auto_breaks(149).len(), 3);
        assert_eq!(calculate_auto_breaks(120).len(), 3);
        assert_eq!(calculate_auto_breaks(119).len(), 2);
        assert_eq!(calculate_auto_breaks(90).len(), 2);
        assert_eq!(calculate_auto_breaks(89).len(), 1);
        assert_eq!(calculate_auto_breaks(60).len(), 1);
        assert!(calculate_auto_breaks(59).is_empty());
    }

    #[test]
    fn marathon_uses_fixed_segments() {
        assert_eq!(offsets(240), vec![21, 42, 63, 84, 105, 126, 147]);
        assert_eq!(offsets(300), offsets(240));
    }

    #[test]
    fn one_hundred_thirty_minutes_splits_in_quarters() {
        assert_eq!(offsets(130), vec![32, 64, 96]);
    }

    #[test]
    fn short_sessions_have_no_breaks() {
        assert!(calculate_auto_breaks(45).is_empty());
        assert!(calculate_auto_breaks(25).is_empty());
    }

    #[test]
    fn break_ids_are_one_based() {
        let ids: Vec<_> = calculate_auto_breaks(90).into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["break-1", "break-2"]);
    }

    #[test]
    fn break_duration_tiers() {
        assert_eq!(calculate_break_duration(240), 15);
        assert_eq!(calculate_break_duration(239), 12);
        assert_eq!(calculate_break_duration(150), 12);
        assert_eq!(calculate_break_duration(149), 10);
        assert_eq!(calculate_break_duration(120), 10);
        assert_eq!(calculate_break_duration(119), 8);
        assert_eq!(calculate_break_duration(90), 8);
        assert_eq!(calculate_break_duration(89), 5);
        assert_eq!(calculate_break_duration(25), 5);
    }

    #[test]
    fn settings_serialize_with_camel_case_keys() {
        let json = serde_json::to_value(AutoBreakSettings::default()).unwrap();
        assert_eq!(json["breakDuration"], 10);
        assert_eq!(json["skipBreaks"], false);
    }

    proptest! {
        #[test]
        fn offsets_are_multiples_of_first(total in 25u32..=400) {
            let breaks = calculate_auto_breaks(total);
            if let Some(first) = breaks.first() {
                let seg = first.time_offset_minutes;
                for (i, b) in breaks.iter().enumerate() {
                    prop_assert_eq!(b.time_offset_minutes, seg * (i as u32 + 1));
                    prop_assert!(b.is_pending());
                }
            }
        }

        #[test]
        fn checkpoints_fall_inside_session(total in 60u32..=240) {
            for b in calculate_auto_breaks(total) {
                prop_assert!(b.time_offset_minutes < total);
            }
        }
    }
}
