use serde::Serialize;
use std::fmt;

/// The processor's verdict on a payment attempt.
///
/// Any value the processor sends that is not one of the known verdicts is kept verbatim in
/// [`Decision::Unknown`] so it can be surfaced for investigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Accept,
    Decline,
    Review,
    Error,
    Cancel,
    Unknown(String),
}

impl Decision {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "ACCEPT" => Decision::Accept,
            "DECLINE" => Decision::Decline,
            "REVIEW" => Decision::Review,
            "ERROR" => Decision::Error,
            "CANCEL" => Decision::Cancel,
            other => Decision::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Decision::Accept => "ACCEPT",
            Decision::Decline => "DECLINE",
            Decision::Review => "REVIEW",
            Decision::Error => "ERROR",
            Decision::Cancel => "CANCEL",
            Decision::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
