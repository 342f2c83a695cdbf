//! The fixed drafting phases and progress reporting.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Drafting phase of a project, in order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpecPhase {
    #[default]
    Foundation,
    #[serde(rename = "Features & User Stories")]
    Features,
    #[serde(rename = "Functional Requirements")]
    FunctionalRequirements,
    #[serde(rename = "Non-Functional Requirements")]
    NonFunctionalRequirements,
    #[serde(rename = "Technical Context")]
    TechnicalContext,
    Completed,
}

/// Status of one phase relative to the project's current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseStatus {
    Done,
    Current,
    Pending,
}

impl SpecPhase {
    /// Every phase, in drafting order.
    pub const ALL: [SpecPhase; 6] = [
        SpecPhase::Foundation,
        SpecPhase::Features,
        SpecPhase::FunctionalRequirements,
        SpecPhase::NonFunctionalRequirements,
        SpecPhase::TechnicalContext,
        SpecPhase::Completed,
    ];

    /// Position in [`SpecPhase::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The following phase; `Completed` stays `Completed`.
    pub fn next(self) -> SpecPhase {
        Self::ALL
            .get(self.index() + 1)
            .copied()
            .unwrap_or(SpecPhase::Completed)
    }

    pub fn is_completed(self) -> bool {
        self == SpecPhase::Completed
    }

    /// Display name, identical to the wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            SpecPhase::Foundation => "Foundation",
            SpecPhase::Features => "Features & User Stories",
            SpecPhase::FunctionalRequirements => "Functional Requirements",
            SpecPhase::NonFunctionalRequirements => "Non-Functional Requirements",
            SpecPhase::TechnicalContext => "Technical Context",
            SpecPhase::Completed => "Completed",
        }
    }
}

impl fmt::Display for SpecPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of every phase given the project's current one.
pub fn progress(current: SpecPhase) -> Vec<(SpecPhase, PhaseStatus)> {
    SpecPhase::ALL
        .iter()
        .map(|&phase| {
            let status = match phase.cmp(&current) {
                std::cmp::Ordering::Less => PhaseStatus::Done,
                std::cmp::Ordering::Equal => PhaseStatus::Current,
                std::cmp::Ordering::Greater => PhaseStatus::Pending,
            };
            (phase, status)
        })
        .collect()
}
