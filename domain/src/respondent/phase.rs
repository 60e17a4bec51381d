//! Qualification protocol phases

use serde::{Deserialize, Serialize};

/// Phase of a respondent's pass through the qualification protocol
///
/// ```text
/// Loading ─┬─> Screening ⇄ ─> Checking ─┬─> Qualified ─> TakingSurvey ─> Submitting ─> Submitted ─> CompletionMarked
///          │                 ^           ├─> NotQualified
///          └─────────────────┘           └─> QuotaFull
///          ├─> AlreadySubmitted
///          └─> LoadError
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualificationPhase {
    /// Resolving the share token
    Loading,
    /// Answering screening questions
    Screening,
    /// Waiting for the quota oracle's verdict
    Checking,
    /// Oracle confirmed room in the respondent's buckets
    Qualified,
    /// Oracle declined, or the check failed
    NotQualified,
    /// Oracle reported the quota as full
    QuotaFull,
    /// Answering the survey itself
    TakingSurvey,
    /// Submitting survey answers
    Submitting,
    /// Answers accepted
    Submitted,
    /// Oracle acknowledged the completion
    CompletionMarked,
    /// This share token was already used for a submission
    AlreadySubmitted,
    /// The share token could not be resolved
    LoadError,
}

impl QualificationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualificationPhase::Loading => "loading",
            QualificationPhase::Screening => "screening",
            QualificationPhase::Checking => "checking",
            QualificationPhase::Qualified => "qualified",
            QualificationPhase::NotQualified => "not_qualified",
            QualificationPhase::QuotaFull => "quota_full",
            QualificationPhase::TakingSurvey => "taking_survey",
            QualificationPhase::Submitting => "submitting",
            QualificationPhase::Submitted => "submitted",
            QualificationPhase::CompletionMarked => "completion_marked",
            QualificationPhase::AlreadySubmitted => "already_submitted",
            QualificationPhase::LoadError => "load_error",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            QualificationPhase::Loading => "Loading",
            QualificationPhase::Screening => "Screening",
            QualificationPhase::Checking => "Checking",
            QualificationPhase::Qualified => "Qualified",
            QualificationPhase::NotQualified => "Not Qualified",
            QualificationPhase::QuotaFull => "Quota Full",
            QualificationPhase::TakingSurvey => "Taking Survey",
            QualificationPhase::Submitting => "Submitting",
            QualificationPhase::Submitted => "Submitted",
            QualificationPhase::CompletionMarked => "Completion Marked",
            QualificationPhase::AlreadySubmitted => "Already Submitted",
            QualificationPhase::LoadError => "Load Error",
        }
    }

    /// No further transition is possible (restart aside)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            QualificationPhase::NotQualified
                | QualificationPhase::QuotaFull
                | QualificationPhase::CompletionMarked
                | QualificationPhase::AlreadySubmitted
                | QualificationPhase::LoadError
        )
    }

    /// The respondent was turned away before the survey
    pub fn is_termination(&self) -> bool {
        matches!(
            self,
            QualificationPhase::NotQualified | QualificationPhase::QuotaFull
        )
    }

    /// Whether the protocol allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: QualificationPhase) -> bool {
        use QualificationPhase::*;
        matches!(
            (self, next),
            (Loading, Screening | Checking | AlreadySubmitted | LoadError)
                | (Screening, Checking)
                | (Checking, Qualified | NotQualified | QuotaFull)
                | (Qualified, TakingSurvey)
                | (TakingSurvey, Submitting)
                | (Submitting, Submitted | TakingSurvey)
                | (Submitted, CompletionMarked)
                | (Submitted | CompletionMarked, Screening | Checking)
        )
    }

    /// Message shown to the respondent in terminal phases
    pub fn respondent_message(&self) -> Option<&'static str> {
        match self {
            QualificationPhase::NotQualified => {
                Some("Thank you for your interest. You do not qualify for this survey.")
            }
            QualificationPhase::QuotaFull => {
                Some("Thank you for your interest. This survey has reached its target number of responses.")
            }
            QualificationPhase::AlreadySubmitted => {
                Some("A response has already been submitted with this link.")
            }
            QualificationPhase::LoadError => Some("This survey link is invalid or has expired."),
            QualificationPhase::Submitted | QualificationPhase::CompletionMarked => {
                Some("Thank you! Your response has been recorded.")
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for QualificationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
