//! Forward-only lifecycle enums.

use super::ValidationError;

/// Field name carried by every rejected transition.
pub const TRANSITION_FIELD: &str = "state_transition";

/// A lifecycle enum whose value may only change along declared edges.
///
/// Implementors list their edges; `transition_to` is the single place a
/// new value is produced, so callers never hold an undeclared state.
///
/// ```ignore
/// let next = SurveyPhase::Consent.transition_to(SurveyPhase::Intake)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Every state reachable in one step.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns `target` if the edge exists.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` on [`TRANSITION_FIELD`] naming both states.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if !self.can_transition_to(&target) {
            return Err(ValidationError::invalid_format(
                TRANSITION_FIELD,
                format!("{:?} cannot move to {:?}", self, target),
            ));
        }
        Ok(target)
    }

    /// No outgoing edges.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Upload {
        Pending,
        Sent,
        Acknowledged,
    }

    impl StateMachine for Upload {
        fn can_transition_to(&self, target: &Self) -> bool {
            self.valid_transitions().contains(target)
        }

        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                Upload::Pending => vec![Upload::Sent],
                Upload::Sent => vec![Upload::Acknowledged, Upload::Pending],
                Upload::Acknowledged => vec![],
            }
        }
    }

    #[test]
    fn declared_edge_yields_target() {
        assert_eq!(Upload::Sent.transition_to(Upload::Pending), Ok(Upload::Pending));
    }

    #[test]
    fn undeclared_edge_names_both_states() {
        let err = Upload::Pending.transition_to(Upload::Acknowledged).unwrap_err();
        assert_eq!(err.field(), TRANSITION_FIELD);
        let message = err.to_string();
        assert!(message.contains("Pending") && message.contains("Acknowledged"));
    }

    #[test]
    fn terminal_means_no_edges() {
        assert!(Upload::Acknowledged.is_terminal());
        assert!(!Upload::Sent.is_terminal());
    }
}
