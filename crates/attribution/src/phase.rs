use derive_more::{Display, Error};

/// Attribution flow phase.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Phase {
    /// Scanned code identifier is being checked.
    Preparing,

    /// Device fingerprint is being derived.
    Fingerprinting,

    /// Scan is being reported to the tracking route.
    Tracking,

    /// Scan was recorded, navigation to the target URL has started.
    Redirecting,

    /// Attribution failed, no navigation will happen.
    Failed,
}

/// Attempt to move between phases that are not connected.
#[derive(Debug, Display, Error, PartialEq, Eq)]
#[display(fmt = "illegal transition from {} to {}", from, to)]
pub struct IllegalTransition {
    /// Current phase.
    pub from: Phase,

    /// Requested phase.
    pub to: Phase,
}

impl Phase {
    /// Check if no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Redirecting | Phase::Failed)
    }

    /// Move to the `next` phase.
    pub fn enter(self, next: Phase) -> Result<Phase, IllegalTransition> {
        let allowed = matches!(
            (self, next),
            (Phase::Preparing, Phase::Fingerprinting)
                | (Phase::Fingerprinting, Phase::Tracking)
                | (Phase::Tracking, Phase::Redirecting)
                | (
                    Phase::Preparing | Phase::Fingerprinting | Phase::Tracking,
                    Phase::Failed
                )
        );

        if allowed {
            Ok(next)
        } else {
            Err(IllegalTransition {
                from: self,
                to: next,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Phase; 5] = [
        Phase::Preparing,
        Phase::Fingerprinting,
        Phase::Tracking,
        Phase::Redirecting,
        Phase::Failed,
    ];

    #[test]
    fn happy_path() {
        let phase = Phase::Preparing
            .enter(Phase::Fingerprinting)
            .and_then(|phase| phase.enter(Phase::Tracking))
            .and_then(|phase| phase.enter(Phase::Redirecting))
            .unwrap();

        assert_eq!(phase, Phase::Redirecting);
        assert!(phase.is_terminal());
    }

    #[test]
    fn terminal_phases_are_final() {
        for from in [Phase::Redirecting, Phase::Failed] {
            for to in ALL {
                assert_eq!(from.enter(to), Err(IllegalTransition { from, to }));
            }
        }
    }

    #[test]
    fn skipping_phases_is_rejected() {
        assert!(Phase::Preparing.enter(Phase::Tracking).is_err());
        assert!(Phase::Preparing.enter(Phase::Redirecting).is_err());
        assert!(Phase::Fingerprinting.enter(Phase::Redirecting).is_err());
        assert!(Phase::Tracking.enter(Phase::Fingerprinting).is_err());
        assert!(Phase::Tracking.enter(Phase::Tracking).is_err());
    }

    #[test]
    fn failures_are_reachable() {
        for from in [Phase::Preparing, Phase::Fingerprinting, Phase::Tracking] {
            assert_eq!(from.enter(Phase::Failed), Ok(Phase::Failed));
        }
    }
}
