use chrono::{DateTime, Utc};
use confrec_core_types::StatusId;
use serde::{Deserialize, Serialize};

/// Outcome of an apply or de-apply attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplyStatus {
    Success,
    Failure,
}

impl ApplyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyStatus::Success => "SUCCESS",
            ApplyStatus::Failure => "FAILURE",
        }
    }

    /// Parse the stored text form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SUCCESS" => Some(ApplyStatus::Success),
            "FAILURE" => Some(ApplyStatus::Failure),
            _ => None,
        }
    }
}

/// Which lifecycle path produced a status record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Apply,
    DeApply,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Apply => "apply",
            Operation::DeApply => "de_apply",
        }
    }

    /// Parse the stored text form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "apply" => Some(Operation::Apply),
            "de_apply" => Some(Operation::DeApply),
            _ => None,
        }
    }
}

/// Serialized documents used by an attempt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshots {
    pub local: Option<String>,
    pub default: Option<String>,
    pub definition: Option<String>,
}

/// One entry of a package's append-only apply history
///
/// Records are built with [`ConfigStatus::new`] and the `with_*` builders,
/// then handed to the status manager. Stores expose no update path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigStatus {
    pub id: StatusId,
    pub name: String,
    pub applied_at: DateTime<Utc>,
    pub operation: Operation,
    pub status: ApplyStatus,
    pub snapshots: ConfigSnapshots,
    /// Failure reason
    pub message: Option<String>,
}

impl ConfigStatus {
    /// Create a record for `name` applied at the given time
    ///
    /// Defaults to a failed apply with no snapshots.
    pub fn new(name: impl Into<String>, applied_at: DateTime<Utc>) -> Self {
        Self {
            id: StatusId::new(),
            name: name.into(),
            applied_at,
            operation: Operation::Apply,
            status: ApplyStatus::Failure,
            snapshots: ConfigSnapshots::default(),
            message: None,
        }
    }

    pub fn with_status(mut self, status: ApplyStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    pub fn with_snapshots(mut self, snapshots: ConfigSnapshots) -> Self {
        self.snapshots = snapshots;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ApplyStatus::Success
    }
}
