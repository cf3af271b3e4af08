use serde::{Deserialize, Serialize};

/// Which attribute the name-prediction workflow should guess
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum PredictionKind {
    /// Predict age from a name
    #[default]
    Age,
    /// Predict gender from a name
    Gender,
}

/// Represents the current state of the user dialogue
///
/// A user has at most one active workflow: entering `AwaitingName` is only
/// possible from `Idle`, and consuming the next text message returns the
/// dialogue to `Idle` whatever the outcome.
#[derive(Clone, Serialize, Deserialize, Default)]
pub enum State {
    /// Initial state, ordinary command handling
    #[default]
    Idle,
    /// Waiting for a name to run a prediction on
    AwaitingName(PredictionKind),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_idle() {
        assert!(matches!(State::default(), State::Idle));
    }

    #[test]
    fn test_missing_kind_defaults_to_age() {
        assert_eq!(PredictionKind::default(), PredictionKind::Age);
    }
}
