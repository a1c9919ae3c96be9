use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Operational phase of a guarded component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum LifecyclePhase {
    Created = 0,
    Starting = 1,
    Started = 2,
    Stopping = 3,
    Stopped = 4,
    /// Absorbing failure state.
    Failed = 5,
}

impl LifecyclePhase {
    /// Returns whether `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: LifecyclePhase) -> bool {
        use LifecyclePhase::*;
        matches!(
            (self, next),
            (Created, Starting)
                | (Starting, Started)
                | (Started, Stopping)
                | (Stopping, Stopped)
                | (Created | Starting | Started | Stopping | Stopped, Failed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Starting => "STARTING",
            Self::Started => "STARTED",
            Self::Stopping => "STOPPING",
            Self::Stopped => "STOPPED",
            Self::Failed => "FAILED",
        }
    }

    pub(crate) fn from_repr(value: u8) -> Self {
        match value {
            0 => Self::Created,
            1 => Self::Starting,
            2 => Self::Started,
            3 => Self::Stopping,
            4 => Self::Stopped,
            _ => Self::Failed,
        }
    }
}

impl Display for LifecyclePhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::LifecyclePhase::{self, *};

    const ALL: [LifecyclePhase; 6] = [Created, Starting, Started, Stopping, Stopped, Failed];

    #[test]
    fn forward_chain_is_legal() {
        assert!(Created.can_transition_to(Starting));
        assert!(Starting.can_transition_to(Started));
        assert!(Started.can_transition_to(Stopping));
        assert!(Stopping.can_transition_to(Stopped));
    }

    #[test]
    fn backward_and_skipping_moves_are_illegal() {
        assert!(!Started.can_transition_to(Starting));
        assert!(!Stopped.can_transition_to(Starting));
        assert!(!Created.can_transition_to(Started));
        assert!(!Created.can_transition_to(Stopping));
        assert!(!Started.can_transition_to(Started));
    }

    #[test]
    fn failed_is_reachable_from_everywhere_and_absorbing() {
        for phase in ALL {
            assert_eq!(phase.can_transition_to(Failed), phase != Failed);
            assert!(!Failed.can_transition_to(phase));
        }
    }

    #[test]
    fn repr_roundtrips() {
        for phase in ALL {
            assert_eq!(LifecyclePhase::from_repr(phase as u8), phase);
        }
    }
}
