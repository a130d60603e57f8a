use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// StackStatus
// ---------------------------------------------------------------------------

/// Remote stack status as reported by the provider. Never owned by this
/// system; a parsed view onto whatever string the provider returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackStatus {
    CreateInProgress,
    UpdateInProgress,
    CreateComplete,
    UpdateComplete,
    /// Any status we do not recognize (rollbacks, deletes, failures).
    /// Carries the provider's string verbatim for error reporting.
    Other(String),
}

impl StackStatus {
    pub fn parse(s: &str) -> StackStatus {
        match s {
            "CREATE_IN_PROGRESS" => StackStatus::CreateInProgress,
            "UPDATE_IN_PROGRESS" => StackStatus::UpdateInProgress,
            "CREATE_COMPLETE" => StackStatus::CreateComplete,
            "UPDATE_COMPLETE" => StackStatus::UpdateComplete,
            other => StackStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StackStatus::CreateInProgress => "CREATE_IN_PROGRESS",
            StackStatus::UpdateInProgress => "UPDATE_IN_PROGRESS",
            StackStatus::CreateComplete => "CREATE_COMPLETE",
            StackStatus::UpdateComplete => "UPDATE_COMPLETE",
            StackStatus::Other(s) => s,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            StackStatus::CreateInProgress | StackStatus::UpdateInProgress
        )
    }

    pub fn is_complete(&self) -> bool {
        matches!(
            self,
            StackStatus::CreateComplete | StackStatus::UpdateComplete
        )
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StackDescriptor
// ---------------------------------------------------------------------------

/// Identifies one deployable unit. Built by the pipeline driver before each
/// convergence attempt; immutable once handed to the converger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackDescriptor {
    pub name: String,
    pub template_path: std::path::PathBuf,
    /// Ordered (key, value) pairs submitted with the create request.
    pub parameters: Vec<(String, String)>,
}

impl StackDescriptor {
    pub fn new(name: impl Into<String>, template_path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            name: name.into(),
            template_path: template_path.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<(String, String)>) -> Self {
        self.parameters = parameters;
        self
    }
}

// ---------------------------------------------------------------------------
// OutputRecord / StackHandle / StackView
// ---------------------------------------------------------------------------

/// One named value a completed stack exposes for downstream consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub key: String,
    pub value: String,
}

impl OutputRecord {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Opaque handle returned by a create request, used for progress reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackHandle(pub String);

impl fmt::Display for StackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a describe call returns: current status plus any outputs the
/// provider has published so far.
#[derive(Debug, Clone)]
pub struct StackView {
    pub name: String,
    pub status: StackStatus,
    pub outputs: Vec<OutputRecord>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
