use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    NotFound,
    InvalidArgument,
    Conflict,
}

/// Result of a mutation that ran to completion. A rejected outcome leaves
/// the profile untouched and nothing is written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Applied { count: usize },
    Rejected { reason: RejectReason, message: String },
}

impl Outcome {
    pub fn applied(count: usize) -> Self {
        Self::Applied { count }
    }

    pub fn rejected(reason: RejectReason, message: impl Into<String>) -> Self {
        Self::Rejected {
            reason,
            message: message.into(),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    pub fn count(&self) -> Option<usize> {
        match self {
            Self::Applied { count } => Some(*count),
            Self::Rejected { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            Self::Applied { .. } => None,
            Self::Rejected { reason, .. } => Some(*reason),
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Applied { .. } => None,
            Self::Rejected { message, .. } => Some(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileListing {
    pub id: String,
    pub account_id: String,
    pub name: String,
    pub file: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogbookSummary {
    pub items: Vec<String>,
    pub equipment: Vec<String>,
    pub artifacts: Vec<String>,
    pub drones: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileSummary {
    pub name: String,
    pub coins: i64,
    pub characters: Vec<String>,
    pub skills_skins: Vec<String>,
    pub items: Vec<String>,
    pub achievements: Vec<String>,
    pub logbook: LogbookSummary,
    pub logbook_total: usize,
}
