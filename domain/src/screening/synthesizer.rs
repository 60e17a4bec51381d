//! Screening questionnaire synthesis
//!
//! Derives one screening question per active quota dimension. Every option
//! list enumerates the dimension's full canonical bucket universe, not just
//! the targeted buckets, so that a respondent can answer into a
//! non-qualifying bucket too.
//!
//! Synthesis is an explicit pure function. Callers run [`reconcile`] after
//! each model mutation and commit only when it returns `Some`, which makes the
//! recomputation converge in one pass: feeding the output back in yields
//! `None`.

use crate::core::error::DomainError;
use crate::quota::bucket::{AgeRange, BucketKey, Category, Dimension, Gender};
use crate::quota::model::QuotaModel;
use crate::screening::question::{ScreeningOption, ScreeningQuestion};

/// Build the screening questionnaire for `model`.
///
/// Questions previously stored on the model are merged by id: the operator's
/// `question_text` is kept verbatim, the options are always recomputed.
pub fn synthesize(model: &QuotaModel, categories: &[Category]) -> Vec<ScreeningQuestion> {
    model
        .active_dimensions()
        .map(|dimension| {
            let fresh = ScreeningQuestion::new(
                dimension.kind,
                canonical_options(model, dimension.kind, categories),
            );
            match model
                .screening_questions
                .iter()
                .find(|previous| previous.id == fresh.id)
            {
                Some(previous) => fresh.with_text(previous.question_text.clone()),
                None => fresh,
            }
        })
        .collect()
}

/// Synthesize and compare against the model's current questions.
///
/// Returns `None` when nothing structurally changed, so no state update
/// should be emitted.
pub fn reconcile(model: &QuotaModel, categories: &[Category]) -> Option<Vec<ScreeningQuestion>> {
    let next = synthesize(model, categories);
    if next == model.screening_questions {
        None
    } else {
        Some(next)
    }
}

/// Run [`reconcile`] and commit the result. Returns whether the model changed.
pub fn apply(model: &mut QuotaModel, categories: &[Category]) -> bool {
    match reconcile(model, categories) {
        Some(questions) => {
            model.screening_questions = questions;
            true
        }
        None => false,
    }
}

/// Options for every canonical bucket of `dimension`
pub fn canonical_options(
    model: &QuotaModel,
    dimension: Dimension,
    categories: &[Category],
) -> Vec<ScreeningOption> {
    let question_id = dimension.question_id();
    let option = |bucket: BucketKey, label: String| {
        ScreeningOption::for_bucket(&question_id, &bucket, label)
    };

    match dimension {
        Dimension::Age => AgeRange::BRACKETS
            .iter()
            .map(|range| option(BucketKey::Age(*range), range.label()))
            .collect(),
        Dimension::Gender => Gender::ALL
            .iter()
            .map(|gender| option(BucketKey::Gender(*gender), gender.label().to_string()))
            .collect(),
        Dimension::Location => model
            .location
            .items
            .iter()
            .filter_map(|item| match &item.bucket {
                BucketKey::Location(location) => Some(option(item.bucket.clone(), location.label())),
                _ => None,
            })
            .collect(),
        Dimension::Category if categories.is_empty() => model
            .category
            .items
            .iter()
            .map(|item| option(item.bucket.clone(), item.bucket.value()))
            .collect(),
        Dimension::Category => categories
            .iter()
            .map(|c| option(BucketKey::Category(c.id.clone()), c.name.clone()))
            .collect(),
    }
}

/// Resolve a respondent's answer back to the quota bucket it selects
pub fn match_answer(
    questions: &[ScreeningQuestion],
    question_id: &str,
    option_id: &str,
) -> Result<BucketKey, DomainError> {
    let question = questions
        .iter()
        .find(|q| q.id == question_id)
        .ok_or_else(|| DomainError::UnknownQuestion(question_id.to_string()))?;
    let option = question
        .option(option_id)
        .ok_or_else(|| DomainError::UnknownOption {
            question_id: question_id.to_string(),
            option_id: option_id.to_string(),
        })?;
    BucketKey::parse(question.dimension, &option.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quota::bucket::Location;
    use crate::quota::model::QuotaTarget;

    fn age_model() -> QuotaModel {
        QuotaModel::new().with_total_target(100).with_target(
            BucketKey::Age(AgeRange::new(25, Some(35))),
            QuotaTarget::Count(100),
        )
    }

    fn catalog() -> Vec<Category> {
        vec![
            Category::new("c1", "Technology"),
            Category::new("c2", "Food"),
            Category::new("c3", "Travel"),
        ]
    }

    #[test]
    fn test_inactive_model_has_no_questions() {
        assert!(synthesize(&QuotaModel::new().with_total_target(10), &[]).is_empty());
    }

    #[test]
    fn test_age_question_lists_all_six_brackets() {
        let questions = synthesize(&age_model(), &[]);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, "screening_age");
        assert_eq!(questions[0].options.len(), 6);
        assert_eq!(questions[0].options[5].value, "65+");
    }

    #[test]
    fn test_gender_question_lists_all_four_values() {
        let model = QuotaModel::new()
            .with_total_target(10)
            .with_target(BucketKey::Gender(Gender::Female), QuotaTarget::Percentage(100));
        let questions = synthesize(&model, &[]);
        assert_eq!(questions[0].options.len(), 4);
    }

    #[test]
    fn test_location_uses_configured_rows_only() {
        let mut model = QuotaModel::new().with_total_target(10);
        model.add_location(Location::new("US").with_state("TX"));
        model.add_location(Location::new("US").with_state("CA"));
        model.set_target(
            BucketKey::Location(Location::new("US").with_state("TX")),
            QuotaTarget::Count(10),
        );
        let questions = synthesize(&model, &[]);
        assert_eq!(questions[0].options.len(), 2);
        assert_eq!(questions[0].options[1].value, "US|CA|");
        assert_eq!(questions[0].options[1].label, "CA, US");
    }

    #[test]
    fn test_category_uses_full_catalog() {
        let model = QuotaModel::new()
            .with_total_target(10)
            .with_target(BucketKey::Category("c2".to_string()), QuotaTarget::Count(10));
        let questions = synthesize(&model, &catalog());
        assert_eq!(questions[0].options.len(), 3);
        assert_eq!(questions[0].options[0].label, "Technology");
    }

    #[test]
    fn test_edited_text_survives_resynthesis() {
        let mut model = age_model();
        assert!(apply(&mut model, &[]));
        let original_options = model.screening_questions[0].options.clone();

        model.screening_questions[0].question_text = "How old are you?".to_string();
        // Text edit alone does not change the synthesized output
        assert!(reconcile(&model, &[]).is_none());

        let questions = synthesize(&model, &[]);
        assert_eq!(questions[0].question_text, "How old are you?");
        assert_eq!(questions[0].options, original_options);
    }

    #[test]
    fn test_apply_is_a_fixed_point() {
        let mut model = age_model();
        assert!(apply(&mut model, &[]));
        assert!(!apply(&mut model, &[]));
        assert!(reconcile(&model, &[]).is_none());
    }

    #[test]
    fn test_options_follow_model_changes_but_keep_text() {
        let mut model = QuotaModel::new().with_total_target(10);
        model.add_location(Location::new("US"));
        model.set_target(BucketKey::Location(Location::new("US")), QuotaTarget::Count(10));
        apply(&mut model, &[]);
        model.screening_questions[0].question_text = "Country?".to_string();

        model.add_location(Location::new("CA"));
        let next = reconcile(&model, &[]).unwrap();
        assert_eq!(next[0].question_text, "Country?");
        assert_eq!(next[0].options.len(), 2);
    }

    #[test]
    fn test_deactivated_dimension_drops_question() {
        let mut model = age_model();
        apply(&mut model, &[]);
        model.set_target(BucketKey::Age(AgeRange::new(25, Some(35))), QuotaTarget::Count(0));
        assert!(apply(&mut model, &[]));
        assert!(model.screening_questions.is_empty());
    }

    #[test]
    fn test_match_answer_resolves_bucket() {
        let questions = synthesize(&age_model(), &[]);
        let option_id = questions[0].options[2].id.clone();
        let bucket = match_answer(&questions, "screening_age", &option_id).unwrap();
        assert_eq!(bucket, BucketKey::Age(AgeRange::new(35, Some(45))));

        assert!(matches!(
            match_answer(&questions, "screening_gender", &option_id),
            Err(DomainError::UnknownQuestion(_))
        ));
        assert!(matches!(
            match_answer(&questions, "screening_age", "nope"),
            Err(DomainError::UnknownOption { .. })
        ));
    }
}
