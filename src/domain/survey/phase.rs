//! SurveyPhase enum tracking where a participant is in the flow.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Phase of a survey session.
///
/// Phases only move forward; the only way back is a full session reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SurveyPhase {
    #[default]
    Consent,
    Intake,
    InProgress,
    Completed,
}

impl StateMachine for SurveyPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SurveyPhase::*;
        matches!(
            (self, target),
            (Consent, Intake) | (Intake, InProgress) | (InProgress, Completed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SurveyPhase::*;
        match self {
            Consent => vec![Intake],
            Intake => vec![InProgress],
            InProgress => vec![Completed],
            Completed => vec![],
        }
    }
}

impl fmt::Display for SurveyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SurveyPhase::Consent => "consent",
            SurveyPhase::Intake => "intake",
            SurveyPhase::InProgress => "in_progress",
            SurveyPhase::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SurveyPhase; 4] = [
        SurveyPhase::Consent,
        SurveyPhase::Intake,
        SurveyPhase::InProgress,
        SurveyPhase::Completed,
    ];

    #[test]
    fn default_is_consent() {
        assert_eq!(SurveyPhase::default(), SurveyPhase::Consent);
    }

    #[test]
    fn phases_advance_one_step_at_a_time() {
        assert!(SurveyPhase::Consent.can_transition_to(&SurveyPhase::Intake));
        assert!(SurveyPhase::Intake.can_transition_to(&SurveyPhase::InProgress));
        assert!(SurveyPhase::InProgress.can_transition_to(&SurveyPhase::Completed));
        assert!(!SurveyPhase::Consent.can_transition_to(&SurveyPhase::InProgress));
    }

    #[test]
    fn no_phase_can_move_backwards_or_stay() {
        for (i, from) in ALL.iter().enumerate() {
            for to in &ALL[..=i] {
                assert!(
                    !from.can_transition_to(to),
                    "{:?} -> {:?} must be rejected",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn completed_is_terminal() {
        assert!(SurveyPhase::Completed.is_terminal());
        assert!(!SurveyPhase::InProgress.is_terminal());
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for phase in ALL {
            for target in phase.valid_transitions() {
                assert!(phase.can_transition_to(&target));
            }
        }
    }

    #[test]
    fn display_and_serde_agree() {
        for phase in ALL {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase));
        }
    }
}
