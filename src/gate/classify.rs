use std::fmt;

/// Outcome of a single poll attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Flag file text matched the approve phrase
    Approved,
    /// Flag file text matched the decline phrase
    Declined,
    /// Flag file exists but holds no recognized decision yet
    Waiting,
    /// The flag file could not be fetched
    Error,
}

impl fmt::Display for PollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PollState::Approved => "approved",
            PollState::Declined => "declined",
            PollState::Waiting => "waiting",
            PollState::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// The pair of phrases that encode a decision. Normalized (trimmed and
/// lowercased) at construction so every comparison is exact — no partial
/// or fuzzy matching, which would risk false-positive approvals.
#[derive(Debug, Clone)]
pub struct DecisionPhrases {
    approve: String,
    decline: String,
}

impl DecisionPhrases {
    pub fn new(approve: &str, decline: &str) -> Self {
        Self {
            approve: approve.trim().to_lowercase(),
            decline: decline.trim().to_lowercase(),
        }
    }

    pub fn approve(&self) -> &str {
        &self.approve
    }

    pub fn decline(&self) -> &str {
        &self.decline
    }
}

/// Classify fetched flag-file text into a poll state. Pure function; the
/// loop, sleeping, and ceiling logic live in the driver so this can be
/// tested without network access or real delays.
///
/// Unrecognized text is `Waiting`, not an error, so a reviewer can iterate
/// on the file before settling on the exact phrase.
pub fn classify(text: &str, phrases: &DecisionPhrases) -> PollState {
    let normalized = text.trim().to_lowercase();
    if normalized == phrases.approve {
        PollState::Approved
    } else if normalized == phrases.decline {
        PollState::Declined
    } else {
        PollState::Waiting
    }
}
