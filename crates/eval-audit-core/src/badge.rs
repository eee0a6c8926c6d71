//! Badge classification
//!
//! Maps a (score, fatal) pair to one of five mutually exclusive badges.
//! A fatal flag always overrides the score, so a fatal answer with a
//! perfect score is still `Fatal`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discrete classification of one system's result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Badge {
    /// Disqualifying defect, regardless of score
    Fatal,
    /// Score >= 100
    Perfect,
    /// 90 <= score < 100
    Excellent,
    /// 60 <= score < 90
    Qualified,
    /// Score < 60
    Fail,
}

impl Badge {
    /// Classify a result. Precedence: fatal first, then score bands with
    /// inclusive lower bounds at 100, 90 and 60.
    #[must_use]
    pub fn classify(score: f64, is_fatal: bool) -> Self {
        if is_fatal {
            return Self::Fatal;
        }
        if score >= 100.0 {
            Self::Perfect
        } else if score >= 90.0 {
            Self::Excellent
        } else if score < 60.0 {
            Self::Fail
        } else {
            Self::Qualified
        }
    }

    /// Whether the badge counts as a pass
    #[must_use]
    pub const fn is_passing(&self) -> bool {
        matches!(self, Self::Perfect | Self::Excellent | Self::Qualified)
    }

    /// Console label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Fatal => "FATAL",
            Self::Perfect => "PERFECT",
            Self::Excellent => "EXCELLENT",
            Self::Qualified => "QUALIFIED",
            Self::Fail => "FAIL",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
