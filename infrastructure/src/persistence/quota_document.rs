//! Persisted quota document
//!
//! The survey backend stores a quota as one document per survey:
//!
//! ```json
//! {
//!   "totaltarget": 100,
//!   "screeningquestions": [
//!     {
//!       "questionId": "screening_age",
//!       "quotaType": "COUNT",
//!       "optionTargets": [{ "optionId": "screening_age:18-24", "target": 40 }],
//!       "buckets": [{ "label": "18-24", "operator": "between", "value": [18, 24], "target": 40 }]
//!     }
//!   ],
//!   "vendorId": "cint"
//! }
//! ```
//!
//! `buckets` is authoritative when present; `optionTargets` is read when a
//! document has no buckets. Age bucket bounds are inclusive on the wire.

use quota_gate_application::VendorContext;
use quota_gate_domain::screening::{self, ScreeningQuestion};
use quota_gate_domain::{
    AgeRange, BucketKey, Dimension, DomainError, QuotaDimension, QuotaModel, QuotaTarget, QuotaType,
};
use serde::{Deserialize, Serialize};

/// Wire form of a [`QuotaModel`] plus the vendor it was published with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaDocument {
    /// Missing in older documents; treated as enabled when a total is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub totaltarget: u32,
    #[serde(default)]
    pub screeningquestions: Vec<QuestionDocument>,
    #[serde(rename = "vendorId", default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    #[serde(rename = "countryCode", default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDocument {
    pub question_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_text: Option<String>,
    #[serde(default)]
    pub quota_type: QuotaType,
    #[serde(default)]
    pub option_targets: Vec<OptionTarget>,
    #[serde(default)]
    pub buckets: Vec<BucketDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionTarget {
    pub option_id: String,
    pub target: u32,
}

/// One bucket row.
///
/// `quotaType` is only written when the row differs from its question, so
/// a dimension mixing count and percentage targets reloads unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketDocument {
    #[serde(default)]
    pub label: String,
    pub operator: BucketOperator,
    pub value: BucketValue,
    pub target: u32,
    #[serde(rename = "quotaType", default, skip_serializing_if = "Option::is_none")]
    pub quota_type: Option<QuotaType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketOperator {
    Between,
    Gte,
    Equals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BucketValue {
    Range([u32; 2]),
    Number(u32),
    Text(String),
}

impl QuotaDocument {
    /// Document for `model`.
    ///
    /// Every active dimension is written, and so are location and category
    /// rows that are configured but still empty.
    pub fn from_model(model: &QuotaModel, vendor: Option<&VendorContext>) -> Self {
        let screeningquestions = model
            .dimensions()
            .filter(|d| d.is_active() || (!d.kind.has_fixed_taxonomy() && !d.items.is_empty()))
            .map(|d| QuestionDocument::from_dimension(d, model))
            .collect();

        Self {
            enabled: Some(model.enabled),
            totaltarget: model.total_target,
            screeningquestions,
            vendor_id: vendor.map(|v| v.vendor_id.clone()),
            country_code: vendor.and_then(|v| v.country_code.clone()),
            language: vendor.and_then(|v| v.language.clone()),
        }
    }

    /// Rebuild the model and vendor context.
    ///
    /// The screening questionnaire is re-synthesized from the targets, so
    /// only question texts are taken from the document.
    pub fn into_parts(self) -> Result<(QuotaModel, Option<VendorContext>), DomainError> {
        let mut model = QuotaModel::new();
        model.total_target = self.totaltarget;
        model.enabled = self.enabled.unwrap_or(self.totaltarget > 0);

        for question in self.screeningquestions {
            let kind = question
                .dimension
                .or_else(|| Dimension::from_question_id(&question.question_id))
                .ok_or_else(|| DomainError::UnknownDimension(question.question_id.clone()))?;

            for (bucket, target) in question.targets(kind)? {
                model.set_target(bucket, target);
            }
            if let Some(text) = question.question_text {
                model
                    .screening_questions
                    .push(ScreeningQuestion::new(kind, Vec::new()).with_text(text));
            }
        }

        model.normalize(None);
        screening::apply(&mut model, &[]);

        let vendor = self.vendor_id.map(|vendor_id| VendorContext {
            vendor_id,
            country_code: self.country_code,
            language: self.language,
        });
        Ok((model, vendor))
    }
}

impl QuestionDocument {
    fn from_dimension(dimension: &QuotaDimension, model: &QuotaModel) -> Self {
        let question_id = dimension.kind.question_id();
        let question_text = model
            .screening_questions
            .iter()
            .find(|q| q.id == question_id)
            .map(|q| q.question_text.clone());

        let option_targets = dimension
            .items
            .iter()
            .map(|item| OptionTarget {
                option_id: format!("{}:{}", question_id, item.bucket.value()),
                target: item.target.value(),
            })
            .collect();
        let quota_type = dimension.quota_type();
        let buckets = dimension
            .items
            .iter()
            .map(|item| BucketDocument::from_bucket(&item.bucket, item.target, quota_type))
            .collect();

        Self {
            question_id,
            dimension: Some(dimension.kind),
            question_text,
            quota_type,
            option_targets,
            buckets,
        }
    }

    fn targets(&self, kind: Dimension) -> Result<Vec<(BucketKey, QuotaTarget)>, DomainError> {
        if !self.buckets.is_empty() {
            return self
                .buckets
                .iter()
                .map(|b| {
                    let quota_type = b.quota_type.unwrap_or(self.quota_type);
                    Ok((b.to_bucket(kind)?, QuotaTarget::of(quota_type, b.target)))
                })
                .collect();
        }

        let prefix = format!("{}:", self.question_id);
        self.option_targets
            .iter()
            .map(|t| {
                let value = t.option_id.strip_prefix(&prefix).unwrap_or(&t.option_id);
                let target = QuotaTarget::of(self.quota_type, t.target);
                Ok((BucketKey::parse(kind, value)?, target))
            })
            .collect()
    }
}

impl BucketDocument {
    fn from_bucket(bucket: &BucketKey, target: QuotaTarget, question_type: QuotaType) -> Self {
        let (label, operator, value) = match bucket {
            BucketKey::Age(range) => match range.max {
                Some(max) => (
                    range.label(),
                    BucketOperator::Between,
                    BucketValue::Range([range.min, max.saturating_sub(1)]),
                ),
                None => (
                    range.label(),
                    BucketOperator::Gte,
                    BucketValue::Number(range.min),
                ),
            },
            BucketKey::Gender(gender) => (
                gender.label().to_string(),
                BucketOperator::Equals,
                BucketValue::Text(bucket.value()),
            ),
            BucketKey::Location(location) => (
                location.label(),
                BucketOperator::Equals,
                BucketValue::Text(bucket.value()),
            ),
            BucketKey::Category(id) => (
                id.clone(),
                BucketOperator::Equals,
                BucketValue::Text(id.clone()),
            ),
        };
        Self {
            label,
            operator,
            value,
            target: target.value(),
            quota_type: (target.quota_type() != question_type).then(|| target.quota_type()),
        }
    }

    fn to_bucket(&self, kind: Dimension) -> Result<BucketKey, DomainError> {
        let invalid = || DomainError::invalid_bucket(kind.as_str(), self.label.clone());
        match (kind, self.operator, &self.value) {
            (Dimension::Age, BucketOperator::Between, BucketValue::Range([min, max])) => {
                if max < min {
                    return Err(invalid());
                }
                let end = max.checked_add(1).ok_or_else(invalid)?;
                Ok(BucketKey::Age(AgeRange::new(*min, Some(end))))
            }
            (Dimension::Age, BucketOperator::Gte, BucketValue::Number(min)) => {
                Ok(BucketKey::Age(AgeRange::new(*min, None)))
            }
            (_, BucketOperator::Equals, BucketValue::Text(value)) => BucketKey::parse(kind, value),
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quota_gate_domain::{Gender, Location};
    use serde_json::json;

    fn sample_model() -> QuotaModel {
        let mut model = QuotaModel::new()
            .with_total_target(100)
            .with_target(
                BucketKey::Age(AgeRange::BRACKETS[0]),
                QuotaTarget::Count(40),
            )
            .with_target(
                BucketKey::Age(AgeRange::BRACKETS[5]),
                QuotaTarget::Count(60),
            )
            .with_target(
                BucketKey::Gender(Gender::Female),
                QuotaTarget::Percentage(100),
            );
        model.add_location(Location::new("US").with_state("TX"));
        screening::apply(&mut model, &[]);
        model
    }

    #[test]
    fn test_document_shape() {
        let vendor = VendorContext {
            vendor_id: "cint".to_string(),
            country_code: Some("US".to_string()),
            language: None,
        };
        let doc = QuotaDocument::from_model(&sample_model(), Some(&vendor));
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["totaltarget"], 100);
        assert_eq!(value["vendorId"], "cint");
        assert_eq!(value["countryCode"], "US");
        assert!(value.get("language").is_none());

        let age = &value["screeningquestions"][0];
        assert_eq!(age["questionId"], "screening_age");
        assert_eq!(age["quotaType"], "COUNT");
        assert_eq!(
            age["buckets"][0],
            json!({"label": "18-24", "operator": "between", "value": [18, 24], "target": 40})
        );
        assert_eq!(
            age["buckets"][5],
            json!({"label": "65+", "operator": "gte", "value": 65, "target": 60})
        );
        assert_eq!(age["optionTargets"][0]["optionId"], "screening_age:18-24");

        let gender = &value["screeningquestions"][1];
        assert_eq!(gender["quotaType"], "PERCENTAGE");
        assert_eq!(gender["buckets"][1]["operator"], "equals");
    }

    #[test]
    fn test_empty_location_rows_are_kept() {
        let doc = QuotaDocument::from_model(&sample_model(), None);
        let ids: Vec<_> = doc
            .screeningquestions
            .iter()
            .map(|q| q.question_id.as_str())
            .collect();
        assert_eq!(ids, ["screening_age", "screening_gender", "screening_location"]);

        let (model, vendor) = doc.into_parts().unwrap();
        assert!(vendor.is_none());
        assert_eq!(model.location.items.len(), 1);
        assert!(!model.location.is_active());
    }

    #[test]
    fn test_reload_keeps_targets_and_questions() {
        let original = sample_model();
        let doc = QuotaDocument::from_model(&original, None);
        let (reloaded, _) = doc.into_parts().unwrap();
        assert_eq!(reloaded.total_target, 100);
        assert_eq!(reloaded.age, original.age);
        assert_eq!(reloaded.gender.quota_type(), QuotaType::Percentage);
        assert_eq!(reloaded.gender.percentage_sum(), 100);
        assert_eq!(reloaded.screening_questions, original.screening_questions);
    }

    #[test]
    fn test_mixed_target_types_survive_reload() {
        let male = BucketKey::Gender(Gender::Male);
        let female = BucketKey::Gender(Gender::Female);
        let original = QuotaModel::new()
            .with_total_target(100)
            .with_target(male.clone(), QuotaTarget::Count(30))
            .with_target(female.clone(), QuotaTarget::Percentage(60));

        let doc = QuotaDocument::from_model(&original, None);
        let json = serde_json::to_string(&doc).unwrap();
        let gender = &serde_json::from_str::<serde_json::Value>(&json).unwrap()
            ["screeningquestions"][0];
        let typed_rows = gender["buckets"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|b| b.get("quotaType").is_some())
            .count();
        assert_eq!(typed_rows, 1);

        let reloaded: QuotaDocument = serde_json::from_str(&json).unwrap();
        let (model, _) = reloaded.into_parts().unwrap();
        assert_eq!(
            model.gender.item(&male).map(|i| i.target),
            Some(QuotaTarget::Count(30))
        );
        assert_eq!(
            model.gender.item(&female).map(|i| i.target),
            Some(QuotaTarget::Percentage(60))
        );
    }

    #[test]
    fn test_bucket_quota_type_overrides_question() {
        let doc: QuotaDocument = serde_json::from_value(json!({
            "totaltarget": 100,
            "screeningquestions": [{
                "questionId": "screening_gender",
                "quotaType": "COUNT",
                "buckets": [
                    {"label": "Male", "operator": "equals", "value": "male", "target": 40},
                    {"label": "Female", "operator": "equals", "value": "female",
                     "target": 50, "quotaType": "PERCENTAGE"}
                ]
            }]
        }))
        .unwrap();

        let (model, _) = doc.into_parts().unwrap();
        assert_eq!(model.gender.count_sum(), 40);
        assert_eq!(model.gender.percentage_sum(), 50);
    }

    #[test]
    fn test_option_targets_fallback() {
        let doc: QuotaDocument = serde_json::from_value(json!({
            "totaltarget": 50,
            "screeningquestions": [{
                "questionId": "screening_gender",
                "questionText": "Which best describes you?",
                "optionTargets": [
                    {"optionId": "screening_gender:male", "target": 25},
                    {"optionId": "screening_gender:female", "target": 25}
                ]
            }]
        }))
        .unwrap();

        let (model, _) = doc.into_parts().unwrap();
        assert!(model.enabled);
        assert_eq!(model.gender.count_sum(), 50);
        assert_eq!(model.screening_questions.len(), 1);
        assert_eq!(
            model.screening_questions[0].question_text,
            "Which best describes you?"
        );
        assert_eq!(model.screening_questions[0].options.len(), 4);
    }

    #[test]
    fn test_unknown_question_id_rejected() {
        let doc: QuotaDocument = serde_json::from_value(json!({
            "totaltarget": 10,
            "screeningquestions": [{"questionId": "screening_income", "optionTargets": []}]
        }))
        .unwrap();
        assert!(matches!(
            doc.into_parts(),
            Err(DomainError::UnknownDimension(_))
        ));
    }

    #[test]
    fn test_inverted_age_range_rejected() {
        let doc: QuotaDocument = serde_json::from_value(json!({
            "totaltarget": 10,
            "screeningquestions": [{
                "questionId": "screening_age",
                "buckets": [{"label": "x", "operator": "between", "value": [40, 30], "target": 10}]
            }]
        }))
        .unwrap();
        assert!(doc.into_parts().is_err());
    }

    #[test]
    fn test_age_range_ending_at_u32_max_rejected() {
        let doc: QuotaDocument = serde_json::from_value(json!({
            "totaltarget": 10,
            "screeningquestions": [{
                "questionId": "screening_age",
                "buckets": [{"label": "x", "operator": "between", "value": [0, 4294967295u32], "target": 10}]
            }]
        }))
        .unwrap();
        assert!(matches!(
            doc.into_parts(),
            Err(DomainError::InvalidBucket { .. })
        ));
    }
}
