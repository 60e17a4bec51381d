//! Edit Quota use case.
//!
//! [`QuotaEditor`] owns a survey's [`QuotaModel`] while an operator edits it.
//! After every mutation the screening questionnaire is re-synthesized, and
//! the result is committed only when it differs structurally, so repeated
//! edits settle in one pass.
//!
//! COUNT ⇄ PERCENTAGE conversion is lossy. The editor keeps the targets a
//! dimension had before its first conversion and restores them when the
//! operator converts back at the same total; any direct edit of the
//! dimension (or of the total) discards them.

use quota_gate_domain::quota::{ConversionSnapshot, convert_dimension};
use quota_gate_domain::screening;
use quota_gate_domain::{
    BucketKey, Category, Dimension, DomainError, Location, QuotaIssue, QuotaModel, QuotaTarget,
    QuotaType,
};
use std::collections::HashMap;
use tracing::debug;

/// Editing session over one quota model.
pub struct QuotaEditor {
    model: QuotaModel,
    categories: Vec<Category>,
    snapshots: HashMap<Dimension, ConversionSnapshot>,
    revision: u64,
}

impl QuotaEditor {
    /// Start editing `model` against the category catalog.
    ///
    /// An empty catalog leaves the model's category rows as loaded.
    pub fn new(mut model: QuotaModel, categories: Vec<Category>) -> Self {
        model.normalize((!categories.is_empty()).then_some(categories.as_slice()));
        let mut editor = Self {
            model,
            categories,
            snapshots: HashMap::new(),
            revision: 0,
        };
        editor.resync();
        editor
    }

    pub fn model(&self) -> &QuotaModel {
        &self.model
    }

    pub fn into_model(self) -> QuotaModel {
        self.model
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Number of screening updates committed so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn issues(&self) -> Vec<QuotaIssue> {
        quota_gate_domain::quota::validate(&self.model)
    }

    pub fn can_save(&self) -> bool {
        quota_gate_domain::quota::can_proceed(&self.model)
    }

    /// Whether converting `kind` back would restore exact targets
    pub fn has_snapshot(&self, kind: Dimension) -> bool {
        self.snapshots.contains_key(&kind)
    }

    // ==================== Mutations ====================

    pub fn set_enabled(&mut self, enabled: bool) {
        self.model.set_enabled(enabled);
        self.resync();
    }

    pub fn set_total_target(&mut self, total: u32) {
        self.model.set_total_target(total);
        self.snapshots.clear();
        self.resync();
    }

    /// Set a bucket's target in its dimension's current quota type
    pub fn set_target(&mut self, bucket: BucketKey, value: u32) -> Result<(), DomainError> {
        let kind = bucket.dimension();
        if let BucketKey::Category(id) = &bucket
            && !self.categories.is_empty()
            && !self.categories.iter().any(|c| &c.id == id)
        {
            return Err(DomainError::invalid_bucket(kind.as_str(), id.clone()));
        }

        let quota_type = self.model.dimension(kind).quota_type();
        self.model
            .set_target(bucket, QuotaTarget::of(quota_type, value));
        self.snapshots.remove(&kind);
        self.resync();
        Ok(())
    }

    /// Add a location row. Returns `false` for duplicates.
    pub fn add_location(&mut self, location: Location) -> bool {
        let added = self.model.add_location(location);
        if added {
            self.snapshots.remove(&Dimension::Location);
            self.resync();
        }
        added
    }

    pub fn remove_location(&mut self, location: &Location) -> bool {
        let removed = self.model.remove_location(location);
        if removed {
            self.snapshots.remove(&Dimension::Location);
            self.resync();
        }
        removed
    }

    /// Replace the category catalog and realign the category dimension
    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
        self.model.normalize(Some(&self.categories));
        self.snapshots.remove(&Dimension::Category);
        self.resync();
    }

    /// Convert a whole dimension to `to`.
    ///
    /// Returns `false` when the dimension already uses `to` throughout.
    pub fn convert(&mut self, kind: Dimension, to: QuotaType) -> bool {
        let total = self.model.total_target;
        if self
            .model
            .dimension(kind)
            .items
            .iter()
            .all(|i| i.target.quota_type() == to)
        {
            return false;
        }

        match self.snapshots.remove(&kind) {
            Some(snapshot) if snapshot.restores(to, total) => {
                debug!("Restoring {} targets from snapshot", kind);
                snapshot.apply(self.model.dimension_mut(kind));
            }
            Some(snapshot) => {
                convert_dimension(self.model.dimension_mut(kind), to, total);
                self.snapshots.insert(kind, snapshot);
            }
            None => {
                let snapshot = ConversionSnapshot::capture(self.model.dimension(kind), total);
                convert_dimension(self.model.dimension_mut(kind), to, total);
                self.snapshots.insert(kind, snapshot);
            }
        }
        self.resync();
        true
    }

    /// Replace the operator-facing text of a screening question
    pub fn set_question_text(
        &mut self,
        question_id: &str,
        text: impl Into<String>,
    ) -> Result<(), DomainError> {
        let question = self
            .model
            .screening_questions
            .iter_mut()
            .find(|q| q.id == question_id)
            .ok_or_else(|| DomainError::UnknownQuestion(question_id.to_string()))?;
        question.question_text = text.into();
        self.revision += 1;
        Ok(())
    }

    fn resync(&mut self) -> bool {
        let changed = screening::apply(&mut self.model, &self.categories);
        if changed {
            self.revision += 1;
            debug!(
                "Screening questionnaire updated ({} question(s))",
                self.model.screening_questions.len()
            );
        }
        changed
    }
}
