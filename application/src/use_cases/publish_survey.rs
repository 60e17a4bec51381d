//! Publish Survey use case.
//!
//! Takes a finished quota configuration live:
//! 1. Refuse on quota issues or a vendor allocation blocking error
//! 2. Persist the quota (with its synthesized screening questions)
//! 3. Generate a share link, falling back to a local one
//! 4. Tell the vendor the job is live (best effort)
//! 5. Leave a "last published" record for the results view

use crate::config::PublishParams;
use crate::ports::key_value_store::{KeyValueStore, StoreError, keys};
use crate::ports::survey_api::{QuotaSaveRequest, SurveyApi, SurveyApiError, VendorContext};
use crate::ports::vendor_notifier::VendorNotifier;
use chrono::Utc;
use quota_gate_domain::screening;
use quota_gate_domain::vendor::blocking_error;
use quota_gate_domain::{Category, CriteriaMap, QuotaIssue, QuotaModel, VendorQuestion};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

fn issue_summary(issues: &[QuotaIssue]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur while publishing
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Quota configuration is invalid: {}", issue_summary(.0))]
    InvalidQuota(Vec<QuotaIssue>),

    #[error("{0}")]
    VendorAllocation(String),

    #[error("Failed to save quota: {0}")]
    Save(#[source] SurveyApiError),

    #[error("Failed to record published survey: {0}")]
    Store(#[from] StoreError),
}

/// Vendor audience chosen by the operator
#[derive(Debug, Clone, Default)]
pub struct VendorSelection {
    pub context: VendorContext,
    pub questions: Vec<VendorQuestion>,
    pub criteria: CriteriaMap,
}

/// Input for the [`PublishSurveyUseCase`]
#[derive(Debug, Clone)]
pub struct PublishInput {
    pub survey_id: String,
    pub quota: QuotaModel,
    pub categories: Vec<Category>,
    pub vendor: Option<VendorSelection>,
}

impl PublishInput {
    pub fn new(survey_id: impl Into<String>, quota: QuotaModel) -> Self {
        Self {
            survey_id: survey_id.into(),
            quota,
            categories: Vec::new(),
            vendor: None,
        }
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_vendor(mut self, vendor: VendorSelection) -> Self {
        self.vendor = Some(vendor);
        self
    }
}

/// Record left for the results view under [`keys::LAST_PUBLISHED_SURVEY`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastPublishedSurvey {
    pub survey_id: String,
    pub share_url: String,
    pub total_target: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    /// RFC 3339
    pub published_at: String,
}

/// Result of a publish
#[derive(Debug, Clone)]
pub struct PublishOutput {
    pub record: LastPublishedSurvey,
    /// The backend link call failed and a local link was used instead
    pub local_link: bool,
    /// Whether the vendor job-status update went through
    pub vendor_notified: bool,
}

/// Use case for publishing a survey's quota configuration
pub struct PublishSurveyUseCase<A: SurveyApi + 'static, V: VendorNotifier + 'static> {
    survey_api: Arc<A>,
    notifier: Arc<V>,
    store: Arc<dyn KeyValueStore>,
    params: PublishParams,
}

impl<A: SurveyApi + 'static, V: VendorNotifier + 'static> PublishSurveyUseCase<A, V> {
    pub fn new(survey_api: Arc<A>, notifier: Arc<V>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            survey_api,
            notifier,
            store,
            params: PublishParams::default(),
        }
    }

    pub fn with_params(mut self, params: PublishParams) -> Self {
        self.params = params;
        self
    }

    pub async fn execute(&self, input: PublishInput) -> Result<PublishOutput, PublishError> {
        let PublishInput {
            survey_id,
            mut quota,
            categories,
            vendor,
        } = input;

        let issues = quota_gate_domain::quota::validate(&quota);
        if !issues.is_empty() {
            return Err(PublishError::InvalidQuota(issues));
        }
        if let Some(vendor) = &vendor
            && let Some(message) = blocking_error(
                Some(vendor.context.vendor_id.as_str()),
                &vendor.questions,
                &vendor.criteria,
            )
        {
            return Err(PublishError::VendorAllocation(message));
        }

        quota.normalize((!categories.is_empty()).then_some(categories.as_slice()));
        screening::apply(&mut quota, &categories);

        info!(
            "Publishing survey {} ({} screening question(s))",
            survey_id,
            quota.screening_questions.len()
        );
        self.survey_api
            .save_quota(
                &survey_id,
                QuotaSaveRequest {
                    model: &quota,
                    vendor: vendor.as_ref().map(|v| &v.context),
                },
            )
            .await
            .map_err(PublishError::Save)?;

        let (share_url, local_link) = match self.survey_api.create_share_link(&survey_id).await {
            Ok(url) => (url, false),
            Err(e) => {
                warn!("Share link generation failed, using local link: {}", e);
                (self.params.local_link(&survey_id), true)
            }
        };

        let vendor_notified = match &vendor {
            Some(vendor) => self.notify_vendor(&vendor.context.vendor_id, &survey_id).await,
            None => false,
        };

        let record = LastPublishedSurvey {
            survey_id,
            share_url,
            total_target: quota.total_target,
            vendor_id: vendor.map(|v| v.context.vendor_id),
            published_at: Utc::now().to_rfc3339(),
        };
        let json = serde_json::to_string(&record)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        self.store.put(keys::LAST_PUBLISHED_SURVEY, &json)?;

        Ok(PublishOutput {
            record,
            local_link,
            vendor_notified,
        })
    }

    async fn notify_vendor(&self, vendor_id: &str, survey_id: &str) -> bool {
        match self
            .notifier
            .update_job_status(vendor_id, survey_id, self.params.published_status_code)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!("Vendor {} status update failed: {}", vendor_id, e);
                false
            }
        }
    }
}

/// Read the last-published record and remove it
pub fn take_last_published(
    store: &dyn KeyValueStore,
) -> Result<Option<LastPublishedSurvey>, StoreError> {
    store
        .take(keys::LAST_PUBLISHED_SURVEY)?
        .map(|json| {
            serde_json::from_str(&json).map_err(|e| StoreError::Corrupt(e.to_string()))
        })
        .transpose()
}
