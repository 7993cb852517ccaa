//! Closed value sets stored as lowercase snake_case strings

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Where a conversation takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Linkedin,
    Email,
    Phone,
    InPerson,
}

impl Platform {
    pub const ALL: [Platform; 4] = [Self::Linkedin, Self::Email, Self::Phone, Self::InPerson];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linkedin => "linkedin",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::InPerson => "in_person",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| Error::UnknownVariant {
                kind: "platform",
                value: s.to_string(),
            })
    }
}

/// Stage of a job opportunity, from first contact to resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    #[default]
    New,
    Reviewing,
    Interested,
    NotInterested,
    Applied,
    AwaitingResponse,
    Interviewing,
    Offer,
    Negotiating,
    Accepted,
    Declined,
    Rejected,
    Withdrawn,
    Ghosted,
}

impl ProcessStatus {
    pub const ALL: [ProcessStatus; 14] = [
        Self::New,
        Self::Reviewing,
        Self::Interested,
        Self::NotInterested,
        Self::Applied,
        Self::AwaitingResponse,
        Self::Interviewing,
        Self::Offer,
        Self::Negotiating,
        Self::Accepted,
        Self::Declined,
        Self::Rejected,
        Self::Withdrawn,
        Self::Ghosted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Reviewing => "reviewing",
            Self::Interested => "interested",
            Self::NotInterested => "not_interested",
            Self::Applied => "applied",
            Self::AwaitingResponse => "awaiting_response",
            Self::Interviewing => "interviewing",
            Self::Offer => "offer",
            Self::Negotiating => "negotiating",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
            Self::Ghosted => "ghosted",
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| Error::UnknownVariant {
                kind: "process status",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Recruiter,
    Candidate,
    HiringManager,
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recruiter => write!(f, "recruiter"),
            Self::Candidate => write!(f, "candidate"),
            Self::HiringManager => write!(f, "hiring_manager"),
        }
    }
}

impl FromStr for ParticipantRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "recruiter" => Ok(Self::Recruiter),
            "candidate" => Ok(Self::Candidate),
            "hiring_manager" => Ok(Self::HiringManager),
            _ => Err(Error::UnknownVariant {
                kind: "participant role",
                value: s.to_string(),
            }),
        }
    }
}

/// Language model a user drafts messages with by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelChoice {
    #[default]
    Sonnet,
    Haiku,
    Opus,
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sonnet => write!(f, "sonnet"),
            Self::Haiku => write!(f, "haiku"),
            Self::Opus => write!(f, "opus"),
        }
    }
}

impl FromStr for ModelChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sonnet" => Ok(Self::Sonnet),
            "haiku" => Ok(Self::Haiku),
            "opus" => Ok(Self::Opus),
            _ => Err(Error::UnknownVariant {
                kind: "model",
                value: s.to_string(),
            }),
        }
    }
}
