//! Vendor criteria file
//!
//! ```json
//! {
//!   "vendor_id": "cint",
//!   "country_code": "US",
//!   "questions": [{ "id": "q1", "text": "What is your age?", "type": "numeric" }],
//!   "criteria": {
//!     "q1": { "desired_completes": 100, "targeting": { "ranges": [{ "id": "r1", "min": 18, "max": 34, "quota": 100 }] } }
//!   }
//! }
//! ```

use quota_gate_application::{VendorContext, VendorSelection};
use quota_gate_domain::vendor::{self, Allocation};
use quota_gate_domain::{CriteriaMap, VendorQuestion, VendorQuestionKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorCriteriaFile {
    #[serde(alias = "vendorId")]
    pub vendor_id: Option<String>,
    #[serde(alias = "countryCode")]
    pub country_code: Option<String>,
    pub language: Option<String>,
    pub questions: Vec<VendorQuestion>,
    pub criteria: CriteriaMap,
}

/// One vendor question with its classification and allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorQuestionReport {
    pub question_id: String,
    pub text: String,
    pub kind: VendorQuestionKind,
    /// `None` when the operator has no criteria for the question
    pub allocation: Option<Allocation>,
}

impl VendorCriteriaFile {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// First problem that blocks publishing, if any
    pub fn blocking_error(&self) -> Option<String> {
        vendor::blocking_error(self.vendor_id.as_deref(), &self.questions, &self.criteria)
    }

    pub fn report(&self) -> Vec<VendorQuestionReport> {
        self.questions
            .iter()
            .map(|q| VendorQuestionReport {
                question_id: q.id.clone(),
                text: q.text.clone(),
                kind: q.kind(),
                allocation: self.criteria.get(&q.id).map(|c| vendor::allocation(q, c)),
            })
            .collect()
    }

    /// Selection handed to the publish use case
    pub fn into_selection(self) -> VendorSelection {
        VendorSelection {
            context: VendorContext {
                vendor_id: self.vendor_id.unwrap_or_default(),
                country_code: self.country_code,
                language: self.language,
            },
            questions: self.questions,
            criteria: self.criteria,
        }
    }
}
