use std::fmt;

use serde::{Deserialize, Serialize};

/// Identification outcome of one analyte.
///
/// The first four variants form a ladder in declaration order; `DiscardHit` is a
/// terminal rejection outside the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentificationStatus {
    /// No usable MSn evidence (or no rules for the class)
    NoMsnPresent,
    /// Mandatory head-group evidence found
    HeadGroupDetected,
    /// At least one chain combination supported
    FragmentsDetected,
    /// At least one combination with every chain position resolved
    PositionDetected,
    /// Rejected
    DiscardHit,
}

impl IdentificationStatus {
    /// Ladder rank; `None` for the terminal discard
    pub fn rank(&self) -> Option<u8> {
        match self {
            Self::NoMsnPresent => Some(0),
            Self::HeadGroupDetected => Some(1),
            Self::FragmentsDetected => Some(2),
            Self::PositionDetected => Some(3),
            Self::DiscardHit => None,
        }
    }

    /// Whether this is the terminal rejection
    pub fn is_discard(&self) -> bool {
        matches!(self, Self::DiscardHit)
    }

    /// Upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoMsnPresent => "NO_MSN_PRESENT",
            Self::HeadGroupDetected => "HEAD_GROUP_DETECTED",
            Self::FragmentsDetected => "FRAGMENTS_DETECTED",
            Self::PositionDetected => "POSITION_DETECTED",
            Self::DiscardHit => "DISCARD_HIT",
        }
    }
}

impl fmt::Display for IdentificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forward-only status tracker that remembers every recorded transition
#[derive(Debug, Clone)]
pub struct StatusLadder {
    current: IdentificationStatus,
    trail: Vec<IdentificationStatus>,
}

impl Default for StatusLadder {
    fn default() -> Self {
        Self {
            current: IdentificationStatus::NoMsnPresent,
            trail: vec![IdentificationStatus::NoMsnPresent],
        }
    }
}

impl StatusLadder {
    /// Start at `NoMsnPresent`
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status
    pub fn current(&self) -> IdentificationStatus {
        self.current
    }

    /// Every recorded status in order
    pub fn trail(&self) -> &[IdentificationStatus] {
        &self.trail
    }

    /// Whether the analyte has been discarded
    pub fn is_discarded(&self) -> bool {
        self.current.is_discard()
    }

    /// Move to `next` if it is further up the ladder; returns whether the status changed.
    /// A discarded analyte never moves again.
    pub fn advance(&mut self, next: IdentificationStatus) -> bool {
        if self.is_discarded() {
            return false;
        }
        let forward = match (next.rank(), self.current.rank()) {
            (None, _) => true,
            (Some(next), Some(current)) => next > current,
            (Some(_), None) => false,
        };
        if forward {
            self.current = next;
            self.trail.push(next);
        }
        forward
    }

    /// Drop to `DiscardHit`
    pub fn discard(&mut self) -> bool {
        self.advance(IdentificationStatus::DiscardHit)
    }

    /// Consume into the final status and trail
    pub fn finish(self) -> (IdentificationStatus, Vec<IdentificationStatus>) {
        (self.current, self.trail)
    }
}
