//! Qualify Respondent use case.
//!
//! [`QualificationProtocol`] drives one respondent arriving through a share
//! link from screening to a recorded completion:
//!
//! 1. Resolve the share token into the survey and its screening questions
//! 2. Screen one question at a time (forward and back)
//! 3. Ask the quota oracle for a verdict (fail-closed)
//! 4. Collect the survey answers and submit them
//! 5. Mark the completion with the oracle, at most once, best effort
//!
//! Every transition is checked against
//! [`QualificationPhase::can_transition_to`] and reported to `tracing`, the
//! [`ProtocolEventLogger`] and the [`QualificationProgress`] notifier.

use crate::config::ProtocolParams;
use crate::ports::progress::{NoProgress, QualificationProgress};
use crate::ports::protocol_logger::{NoProtocolLogger, ProtocolEvent, ProtocolEventLogger};
use crate::ports::quota_oracle::{OracleError, QualificationRequest, QuotaOracle};
use crate::ports::survey_api::{SurveyApi, SurveyApiError};
use crate::ports::vendor_notifier::VendorNotifier;
use quota_gate_domain::screening;
use quota_gate_domain::{
    DomainError, QualificationPhase, QualificationVerdict, Respondent, ScreeningQuestion,
    SharedSurvey, SurveyAnswer, SurveyQuestion,
};
use serde_json::json;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors returned by protocol operations.
///
/// Terminal outcomes (not qualified, quota full, load error) are phases,
/// not errors; these are refusals of an operation.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        from: QualificationPhase,
        to: QualificationPhase,
    },

    #[error("Operation requires phase {expected}, but the protocol is in {actual}")]
    WrongPhase {
        expected: QualificationPhase,
        actual: QualificationPhase,
    },

    #[error("Question {0} must be answered before continuing")]
    Unanswered(String),

    #[error("Already at the first screening question")]
    AtFirstQuestion,

    #[error("No screening question to answer")]
    NoScreeningQuestion,

    #[error("A qualification check is already in flight")]
    CheckInFlight,

    #[error("Unknown survey question: {0}")]
    UnknownSurveyQuestion(String),

    #[error("\"{value}\" is not a choice of question {question_id}")]
    InvalidChoice { question_id: String, value: String },

    #[error("Required questions unanswered: {}", .0.join(", "))]
    MissingAnswers(Vec<String>),

    #[error("Submission failed: {0}")]
    Submission(#[source] SurveyApiError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Explicit one-at-a-time guard for qualification checks.
///
/// Clones share the same flag, so a UI can hold one to disable its
/// "continue" control while a check runs.
#[derive(Debug, Clone, Default)]
pub struct CheckGate {
    in_flight: Arc<AtomicBool>,
}

impl CheckGate {
    /// Claim the gate; `None` while another check holds it
    pub fn try_enter(&self) -> Option<CheckPermit> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CheckPermit {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Held for the duration of one check; releases the gate on drop
pub struct CheckPermit {
    in_flight: Arc<AtomicBool>,
}

impl Drop for CheckPermit {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

struct ScheduledRestart {
    delay: Duration,
    cancel: CancellationToken,
}

/// Run a remote call under a hard cutoff. No retry.
async fn bounded<T, E>(
    timeout: Duration,
    call: impl Future<Output = Result<T, E>>,
    on_timeout: E,
) -> Result<T, E> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout),
    }
}

/// State machine for one respondent.
pub struct QualificationProtocol<A, O, V>
where
    A: SurveyApi + 'static,
    O: QuotaOracle + 'static,
    V: VendorNotifier + 'static,
{
    survey_api: Arc<A>,
    oracle: Arc<O>,
    notifier: Arc<V>,
    params: ProtocolParams,
    progress: Arc<dyn QualificationProgress>,
    logger: Arc<dyn ProtocolEventLogger>,

    share_token: String,
    phase: QualificationPhase,
    survey: Option<SharedSurvey>,
    screening: Vec<ScreeningQuestion>,
    respondent: Respondent,
    question_index: usize,
    survey_answers: HashMap<String, String>,
    verdict: Option<QualificationVerdict>,
    response_id: Option<String>,
    load_error: Option<String>,

    check_gate: CheckGate,
    completion_requested: bool,
    abandoned: bool,
    scheduled_restart: Option<ScheduledRestart>,
}

impl<A, O, V> QualificationProtocol<A, O, V>
where
    A: SurveyApi + 'static,
    O: QuotaOracle + 'static,
    V: VendorNotifier + 'static,
{
    pub fn new(
        survey_api: Arc<A>,
        oracle: Arc<O>,
        notifier: Arc<V>,
        share_token: impl Into<String>,
    ) -> Self {
        let share_token = share_token.into();
        Self {
            survey_api,
            oracle,
            notifier,
            params: ProtocolParams::default(),
            progress: Arc::new(NoProgress),
            logger: Arc::new(NoProtocolLogger),
            respondent: Respondent::new(share_token.clone()),
            share_token,
            phase: QualificationPhase::Loading,
            survey: None,
            screening: Vec::new(),
            question_index: 0,
            survey_answers: HashMap::new(),
            verdict: None,
            response_id: None,
            load_error: None,
            check_gate: CheckGate::default(),
            completion_requested: false,
            abandoned: false,
            scheduled_restart: None,
        }
    }

    pub fn with_params(mut self, params: ProtocolParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn QualificationProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ProtocolEventLogger>) -> Self {
        self.logger = logger;
        self
    }

    // ==================== Accessors ====================

    pub fn phase(&self) -> QualificationPhase {
        self.phase
    }

    pub fn share_token(&self) -> &str {
        &self.share_token
    }

    pub fn survey(&self) -> Option<&SharedSurvey> {
        self.survey.as_ref()
    }

    pub fn screening_questions(&self) -> &[ScreeningQuestion] {
        &self.screening
    }

    pub fn respondent(&self) -> &Respondent {
        &self.respondent
    }

    pub fn verdict(&self) -> Option<&QualificationVerdict> {
        self.verdict.as_ref()
    }

    pub fn response_id(&self) -> Option<&str> {
        self.response_id.as_deref()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn check_gate(&self) -> CheckGate {
        self.check_gate.clone()
    }

    /// Zero-based position in the screening questionnaire
    pub fn question_index(&self) -> usize {
        self.question_index
    }

    /// Screening question being shown, while screening
    pub fn current_question(&self) -> Option<&ScreeningQuestion> {
        if self.phase != QualificationPhase::Screening {
            return None;
        }
        self.screening.get(self.question_index)
    }

    /// Whether `next()` would be accepted right now
    pub fn can_advance(&self) -> bool {
        self.current_question()
            .is_some_and(|q| self.respondent.has_answered(&q.id))
            && !self.check_gate.is_in_flight()
    }

    /// Ordinary survey questions, available once qualified
    pub fn survey_questions(&self) -> &[SurveyQuestion] {
        self.survey
            .as_ref()
            .map(|s| s.questions.as_slice())
            .unwrap_or_default()
    }

    pub fn survey_answer(&self, question_id: &str) -> Option<&str> {
        self.survey_answers.get(question_id).map(String::as_str)
    }

    pub fn restart_pending(&self) -> bool {
        self.scheduled_restart.is_some()
    }

    /// Token that cancels the pending restart, if one is scheduled
    pub fn restart_cancel_token(&self) -> Option<CancellationToken> {
        self.scheduled_restart.as_ref().map(|r| r.cancel.clone())
    }

    // ==================== Loading ====================

    /// Resolve the share token.
    ///
    /// Ends in `Screening`, or goes straight through the oracle check when
    /// the survey has no screening questions. `AlreadySubmitted` and
    /// `LoadError` are terminal.
    pub async fn load(&mut self) -> Result<QualificationPhase, ProtocolError> {
        self.expect_phase(QualificationPhase::Loading)?;
        info!("Resolving share token {}", self.share_token);

        let resolved = bounded(
            self.params.request_timeout,
            self.survey_api.resolve_share_token(&self.share_token),
            SurveyApiError::Timeout,
        )
        .await;

        let survey = match resolved {
            Ok(survey) => survey,
            Err(SurveyApiError::AlreadySubmitted) => {
                self.transition(QualificationPhase::AlreadySubmitted)?;
                return Ok(self.phase);
            }
            Err(e) => {
                warn!("Failed to resolve share token {}: {}", self.share_token, e);
                self.load_error = Some(e.to_string());
                self.transition(QualificationPhase::LoadError)?;
                return Ok(self.phase);
            }
        };

        self.screening = self.resolve_screening(&survey).await;
        debug!(
            "Survey {} loaded with {} screening question(s)",
            survey.survey_id,
            self.screening.len()
        );
        self.survey = Some(survey);

        if self.screening.is_empty() {
            self.run_check().await
        } else {
            self.transition(QualificationPhase::Screening)?;
            Ok(self.phase)
        }
    }

    /// Screening questions shipped with the survey, else fetched, else
    /// synthesized from the survey's quota
    async fn resolve_screening(&self, survey: &SharedSurvey) -> Vec<ScreeningQuestion> {
        if !survey.screening_questions.is_empty() {
            return survey.screening_questions.clone();
        }

        let fetched = bounded(
            self.params.request_timeout,
            self.survey_api.fetch_screening_questions(&survey.survey_id),
            SurveyApiError::Timeout,
        )
        .await;

        match fetched {
            Ok(questions) if !questions.is_empty() => questions,
            Ok(_) => Self::synthesized_screening(survey),
            Err(e) => {
                warn!(
                    "Failed to fetch screening questions for {}: {}",
                    survey.survey_id, e
                );
                Self::synthesized_screening(survey)
            }
        }
    }

    fn synthesized_screening(survey: &SharedSurvey) -> Vec<ScreeningQuestion> {
        survey
            .quota
            .as_ref()
            .filter(|quota| quota.enabled)
            .map(|quota| screening::synthesize(quota, &[]))
            .unwrap_or_default()
    }

    // ==================== Screening ====================

    /// Answer the current screening question
    pub fn answer(&mut self, option_id: &str) -> Result<(), ProtocolError> {
        self.expect_phase(QualificationPhase::Screening)?;
        let question = self
            .screening
            .get(self.question_index)
            .ok_or(ProtocolError::NoScreeningQuestion)?;
        self.respondent.answer(question, option_id)?;
        debug!("Answered {} with {}", question.id, option_id);
        Ok(())
    }

    /// Move to the next question; on the last one, run the oracle check
    pub async fn next(&mut self) -> Result<QualificationPhase, ProtocolError> {
        self.expect_phase(QualificationPhase::Screening)?;
        let question = self
            .screening
            .get(self.question_index)
            .ok_or(ProtocolError::NoScreeningQuestion)?;
        if !self.respondent.has_answered(&question.id) {
            return Err(ProtocolError::Unanswered(question.id.clone()));
        }

        if self.question_index + 1 < self.screening.len() {
            self.question_index += 1;
            return Ok(self.phase);
        }
        self.run_check().await
    }

    pub fn back(&mut self) -> Result<(), ProtocolError> {
        self.expect_phase(QualificationPhase::Screening)?;
        if self.question_index == 0 {
            return Err(ProtocolError::AtFirstQuestion);
        }
        self.question_index -= 1;
        Ok(())
    }

    // ==================== Checking ====================

    async fn run_check(&mut self) -> Result<QualificationPhase, ProtocolError> {
        let Some(_permit) = self.check_gate.try_enter() else {
            return Err(ProtocolError::CheckInFlight);
        };
        self.transition(QualificationPhase::Checking)?;
        self.progress.on_check_start();

        let survey_id = self.survey_id().to_string();
        let request = QualificationRequest {
            vendor_respondent_id: self.share_token.clone(),
            screening_answers: self.respondent.answers_for(&self.screening),
        };
        info!(
            "Checking qualification for survey {} with {} answer(s)",
            survey_id,
            request.screening_answers.len()
        );

        let checked = bounded(
            self.params.request_timeout,
            self.oracle.check_qualification(&survey_id, &request),
            OracleError::Timeout,
        )
        .await;

        let verdict = match checked {
            Ok(response) => QualificationVerdict::from_oracle(
                response.qualified,
                response.respondent_id,
                response.status.as_deref(),
            ),
            Err(e) => {
                warn!("Qualification check failed, treating as not qualified: {}", e);
                QualificationVerdict::failed(e.to_string())
            }
        };

        self.apply_verdict(verdict)
    }

    fn apply_verdict(
        &mut self,
        verdict: QualificationVerdict,
    ) -> Result<QualificationPhase, ProtocolError> {
        self.progress.on_check_complete(&verdict);
        self.logger.log(ProtocolEvent::new(
            "verdict",
            json!({
                "share_token": self.share_token,
                "verdict": verdict,
            }),
        ));

        match &verdict {
            QualificationVerdict::Qualified { respondent_id } => {
                self.respondent.qualified = Some(true);
                self.respondent.respondent_id = respondent_id.clone();
            }
            _ => self.respondent.qualified = Some(false),
        }

        let next = verdict.phase();
        self.verdict = Some(verdict);
        self.transition(next)?;
        if next == QualificationPhase::Qualified {
            self.transition(QualificationPhase::TakingSurvey)?;
        }
        Ok(self.phase)
    }

    // ==================== Taking the survey ====================

    /// Record the answer to an ordinary survey question
    pub fn answer_survey(
        &mut self,
        question_id: &str,
        value: impl Into<String>,
    ) -> Result<(), ProtocolError> {
        self.expect_phase(QualificationPhase::TakingSurvey)?;
        let value = value.into();
        let question = self
            .survey_questions()
            .iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| ProtocolError::UnknownSurveyQuestion(question_id.to_string()))?;
        if !question.choices.is_empty() && !question.choices.contains(&value) {
            return Err(ProtocolError::InvalidChoice {
                question_id: question_id.to_string(),
                value,
            });
        }
        self.survey_answers.insert(question_id.to_string(), value);
        Ok(())
    }

    /// Respondent left the survey without submitting.
    ///
    /// Fires the "incomplete" beacon once; returns whether it fired.
    pub fn abandon(&mut self) -> bool {
        if self.phase != QualificationPhase::TakingSurvey || self.abandoned {
            return false;
        }
        self.abandoned = true;
        info!("Respondent abandoned survey {}", self.survey_id());
        self.fire_beacon(false);
        true
    }

    /// Submit the survey answers.
    ///
    /// A failed submission returns to `TakingSurvey` with the answers kept.
    pub async fn submit(&mut self) -> Result<QualificationPhase, ProtocolError> {
        self.expect_phase(QualificationPhase::TakingSurvey)?;

        let missing: Vec<String> = self
            .survey_questions()
            .iter()
            .filter(|q| q.required)
            .filter(|q| {
                self.survey_answers
                    .get(&q.id)
                    .is_none_or(|v| v.trim().is_empty())
            })
            .map(|q| q.id.clone())
            .collect();
        if !missing.is_empty() {
            return Err(ProtocolError::MissingAnswers(missing));
        }

        self.transition(QualificationPhase::Submitting)?;
        let answers = self.collected_answers();
        let submitted = bounded(
            self.params.request_timeout,
            self.survey_api.submit_response(&self.share_token, &answers),
            SurveyApiError::Timeout,
        )
        .await;

        let response = match submitted {
            Ok(response) => response,
            Err(e) => {
                warn!("Survey submission failed: {}", e);
                self.transition(QualificationPhase::TakingSurvey)?;
                return Err(ProtocolError::Submission(e));
            }
        };

        info!("Response {} submitted", response.id);
        self.respondent.completed = true;
        self.response_id = Some(response.id.clone());
        self.transition(QualificationPhase::Submitted)?;
        self.fire_beacon(true);
        self.mark_completed(&response.id).await?;
        self.schedule_restart();
        Ok(self.phase)
    }

    fn collected_answers(&self) -> Vec<SurveyAnswer> {
        self.survey_questions()
            .iter()
            .filter_map(|q| {
                self.survey_answers.get(&q.id).map(|value| SurveyAnswer {
                    question_id: q.id.clone(),
                    value: value.clone(),
                })
            })
            .collect()
    }

    /// Best-effort completion marking, at most once per respondent
    async fn mark_completed(&mut self, response_id: &str) -> Result<(), ProtocolError> {
        let Some(respondent_id) = self.respondent.respondent_id.clone() else {
            debug!("No oracle respondent id, skipping completion marking");
            return Ok(());
        };
        if self.completion_requested {
            return Ok(());
        }
        self.completion_requested = true;

        let survey_id = self.survey_id().to_string();
        let marked = bounded(
            self.params.request_timeout,
            self.oracle
                .mark_completed(&survey_id, &respondent_id, response_id),
            OracleError::Timeout,
        )
        .await;

        match marked {
            Ok(()) => {
                self.logger.log(ProtocolEvent::new(
                    "completion_marked",
                    json!({
                        "survey_id": survey_id,
                        "respondent_id": respondent_id,
                        "response_id": response_id,
                    }),
                ));
                self.transition(QualificationPhase::CompletionMarked)?;
            }
            Err(e) => warn!(
                "Failed to mark respondent {} completed: {}",
                respondent_id, e
            ),
        }
        Ok(())
    }

    fn fire_beacon(&self, completed: bool) {
        self.notifier.fire_redirect(&self.share_token, completed);
        self.logger.log(ProtocolEvent::new(
            "beacon",
            json!({
                "share_token": self.share_token,
                "completed": completed,
            }),
        ));
    }

    // ==================== Restart ====================

    fn schedule_restart(&mut self) {
        let Some(delay) = self
            .survey
            .as_ref()
            .and_then(|s| self.params.restart_delay_for(&s.settings))
        else {
            return;
        };
        info!("Restart scheduled in {}s", delay.as_secs());
        self.progress.on_restart_scheduled(delay.as_secs());
        self.scheduled_restart = Some(ScheduledRestart {
            delay,
            cancel: CancellationToken::new(),
        });
    }

    pub fn cancel_restart(&mut self) {
        if let Some(scheduled) = self.scheduled_restart.take() {
            scheduled.cancel.cancel();
        }
    }

    /// Wait out a scheduled restart, then reset.
    ///
    /// Returns `None` when nothing was scheduled or the restart was
    /// cancelled through its token.
    pub async fn await_restart(&mut self) -> Result<Option<QualificationPhase>, ProtocolError> {
        let Some(scheduled) = self.scheduled_restart.take() else {
            return Ok(None);
        };

        tokio::select! {
            _ = scheduled.cancel.cancelled() => {
                info!("Scheduled restart cancelled");
                Ok(None)
            }
            _ = tokio::time::sleep(scheduled.delay) => self.restart().await.map(Some),
        }
    }

    /// Reset screening and survey state for the next respondent.
    ///
    /// The resolved survey and its screening questions are kept.
    pub async fn restart(&mut self) -> Result<QualificationPhase, ProtocolError> {
        let target = if self.screening.is_empty() {
            QualificationPhase::Checking
        } else {
            QualificationPhase::Screening
        };
        if !self.phase.can_transition_to(target) {
            return Err(ProtocolError::InvalidTransition {
                from: self.phase,
                to: target,
            });
        }

        self.cancel_restart();
        self.respondent.reset();
        self.question_index = 0;
        self.survey_answers.clear();
        self.verdict = None;
        self.response_id = None;
        self.completion_requested = false;
        self.abandoned = false;
        self.logger.log(ProtocolEvent::new(
            "restarted",
            json!({ "share_token": self.share_token }),
        ));

        if self.screening.is_empty() {
            self.run_check().await
        } else {
            self.transition(QualificationPhase::Screening)?;
            Ok(self.phase)
        }
    }

    // ==================== Helpers ====================

    fn survey_id(&self) -> &str {
        self.survey
            .as_ref()
            .map(|s| s.survey_id.as_str())
            .unwrap_or_default()
    }

    fn expect_phase(&self, expected: QualificationPhase) -> Result<(), ProtocolError> {
        if self.phase != expected {
            return Err(ProtocolError::WrongPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    fn transition(&mut self, to: QualificationPhase) -> Result<(), ProtocolError> {
        let from = self.phase;
        if !from.can_transition_to(to) {
            return Err(ProtocolError::InvalidTransition { from, to });
        }
        self.phase = to;

        info!("Qualification phase: {} -> {}", from, to);
        self.logger.log(ProtocolEvent::new(
            "phase_changed",
            json!({
                "share_token": self.share_token,
                "from": from.as_str(),
                "to": to.as_str(),
            }),
        ));
        self.progress.on_phase_change(from, to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::quota_oracle::QualificationResponse;
    use crate::ports::survey_api::{QuotaSaveRequest, SubmittedResponse};
    use async_trait::async_trait;
    use quota_gate_domain::{
        AgeRange, BucketKey, Dimension, Gender, QuotaModel, QuotaTarget, ScreeningOption,
        SurveySettings,
    };
    use std::sync::Mutex;

    // ==================== Test Mocks ====================

    fn question_for(dimension: Dimension) -> ScreeningQuestion {
        let id = dimension.question_id();
        let options = BucketKey::canonical(dimension)
            .iter()
            .map(|b| ScreeningOption::for_bucket(&id, b, b.value()))
            .collect();
        ScreeningQuestion::new(dimension, options)
    }

    fn survey_with_screening() -> SharedSurvey {
        SharedSurvey::new("s1", "Coffee habits")
            .with_screening(vec![
                question_for(Dimension::Age),
                question_for(Dimension::Gender),
            ])
            .with_questions(vec![
                SurveyQuestion {
                    id: "q1".to_string(),
                    text: "How many cups a day?".to_string(),
                    required: true,
                    choices: vec!["0".to_string(), "1-2".to_string(), "3+".to_string()],
                },
                SurveyQuestion {
                    id: "q2".to_string(),
                    text: "Anything else?".to_string(),
                    required: false,
                    choices: vec![],
                },
            ])
    }

    #[derive(Default)]
    struct MockSurveyApi {
        survey: Option<SharedSurvey>,
        already_submitted: bool,
        fetched_screening: Vec<ScreeningQuestion>,
        fail_submit: AtomicBool,
        submissions: Mutex<Vec<Vec<SurveyAnswer>>>,
    }

    impl MockSurveyApi {
        fn serving(survey: SharedSurvey) -> Self {
            Self {
                survey: Some(survey),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl SurveyApi for MockSurveyApi {
        async fn resolve_share_token(&self, token: &str) -> Result<SharedSurvey, SurveyApiError> {
            if self.already_submitted {
                return Err(SurveyApiError::AlreadySubmitted);
            }
            self.survey
                .clone()
                .ok_or_else(|| SurveyApiError::NotFound(token.to_string()))
        }

        async fn fetch_screening_questions(
            &self,
            _survey_id: &str,
        ) -> Result<Vec<ScreeningQuestion>, SurveyApiError> {
            Ok(self.fetched_screening.clone())
        }

        async fn submit_response(
            &self,
            _token: &str,
            answers: &[SurveyAnswer],
        ) -> Result<SubmittedResponse, SurveyApiError> {
            if self.fail_submit.load(Ordering::SeqCst) {
                return Err(SurveyApiError::Status(500));
            }
            let mut submissions = self.submissions.lock().unwrap();
            submissions.push(answers.to_vec());
            Ok(SubmittedResponse {
                id: format!("resp-{}", submissions.len()),
            })
        }

        async fn save_quota(
            &self,
            _survey_id: &str,
            _request: QuotaSaveRequest<'_>,
        ) -> Result<(), SurveyApiError> {
            Ok(())
        }

        async fn create_share_link(&self, _survey_id: &str) -> Result<String, SurveyApiError> {
            Ok(String::new())
        }
    }

    enum OracleBehavior {
        Respond(QualificationResponse),
        Fail,
        Hang,
    }

    struct MockOracle {
        behavior: OracleBehavior,
        fail_completion: bool,
        checks: Mutex<Vec<QualificationRequest>>,
        completions: Mutex<Vec<(String, String)>>,
    }

    impl MockOracle {
        fn new(behavior: OracleBehavior) -> Self {
            Self {
                behavior,
                fail_completion: false,
                checks: Mutex::new(Vec::new()),
                completions: Mutex::new(Vec::new()),
            }
        }

        fn qualifying(respondent_id: Option<&str>) -> Self {
            Self::new(OracleBehavior::Respond(QualificationResponse {
                qualified: Some(true),
                respondent_id: respondent_id.map(str::to_string),
                status: None,
            }))
        }

        fn declining() -> Self {
            Self::new(OracleBehavior::Respond(QualificationResponse {
                qualified: Some(false),
                ..Default::default()
            }))
        }
    }

    #[async_trait]
    impl QuotaOracle for MockOracle {
        async fn check_qualification(
            &self,
            _survey_id: &str,
            request: &QualificationRequest,
        ) -> Result<QualificationResponse, OracleError> {
            self.checks.lock().unwrap().push(request.clone());
            match &self.behavior {
                OracleBehavior::Respond(response) => Ok(response.clone()),
                OracleBehavior::Fail => Err(OracleError::Status(502)),
                OracleBehavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Err(OracleError::Timeout)
                }
            }
        }

        async fn mark_completed(
            &self,
            _survey_id: &str,
            respondent_id: &str,
            response_id: &str,
        ) -> Result<(), OracleError> {
            self.completions
                .lock()
                .unwrap()
                .push((respondent_id.to_string(), response_id.to_string()));
            if self.fail_completion {
                return Err(OracleError::ConnectionError("refused".to_string()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockNotifier {
        beacons: Mutex<Vec<bool>>,
    }

    #[async_trait]
    impl VendorNotifier for MockNotifier {
        fn fire_redirect(&self, _share_token: &str, completed: bool) {
            self.beacons.lock().unwrap().push(completed);
        }

        async fn update_job_status(
            &self,
            _vendor_id: &str,
            _survey_id: &str,
            _status_code: u32,
        ) -> Result<(), crate::ports::vendor_notifier::BeaconError> {
            Ok(())
        }
    }

    struct Harness {
        api: Arc<MockSurveyApi>,
        oracle: Arc<MockOracle>,
        notifier: Arc<MockNotifier>,
    }

    impl Harness {
        fn new(api: MockSurveyApi, oracle: MockOracle) -> Self {
            Self {
                api: Arc::new(api),
                oracle: Arc::new(oracle),
                notifier: Arc::new(MockNotifier::default()),
            }
        }

        fn protocol(&self) -> QualificationProtocol<MockSurveyApi, MockOracle, MockNotifier> {
            QualificationProtocol::new(
                self.api.clone(),
                self.oracle.clone(),
                self.notifier.clone(),
                "tok-1",
            )
        }
    }

    async fn screen_through(
        protocol: &mut QualificationProtocol<MockSurveyApi, MockOracle, MockNotifier>,
    ) -> QualificationPhase {
        protocol.answer("screening_age:25-34").unwrap();
        protocol.next().await.unwrap();
        protocol.answer("screening_gender:female").unwrap();
        protocol.next().await.unwrap()
    }

    // ==================== Loading ====================

    #[tokio::test]
    async fn test_load_enters_screening() {
        let h = Harness::new(
            MockSurveyApi::serving(survey_with_screening()),
            MockOracle::declining(),
        );
        let mut protocol = h.protocol();
        assert_eq!(protocol.load().await.unwrap(), QualificationPhase::Screening);
        assert_eq!(protocol.current_question().unwrap().id, "screening_age");
        assert!(h.oracle.checks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_screening_questions_still_checks() {
        let survey = SharedSurvey::new("s1", "No screening");
        let h = Harness::new(MockSurveyApi::serving(survey), MockOracle::qualifying(None));
        let mut protocol = h.protocol();

        assert_eq!(
            protocol.load().await.unwrap(),
            QualificationPhase::TakingSurvey
        );
        let checks = h.oracle.checks.lock().unwrap();
        assert_eq!(checks.len(), 1);
        assert!(checks[0].screening_answers.is_empty());
        assert_eq!(checks[0].vendor_respondent_id, "tok-1");
    }

    #[tokio::test]
    async fn test_already_submitted_is_terminal() {
        let api = MockSurveyApi {
            already_submitted: true,
            ..Default::default()
        };
        let h = Harness::new(api, MockOracle::declining());
        let mut protocol = h.protocol();
        assert_eq!(
            protocol.load().await.unwrap(),
            QualificationPhase::AlreadySubmitted
        );
        assert!(protocol.phase().is_terminal());
    }

    #[tokio::test]
    async fn test_unknown_token_is_load_error() {
        let h = Harness::new(MockSurveyApi::default(), MockOracle::declining());
        let mut protocol = h.protocol();
        assert_eq!(protocol.load().await.unwrap(), QualificationPhase::LoadError);
        assert!(protocol.load_error().unwrap().contains("tok-1"));
    }

    #[tokio::test]
    async fn test_fetched_screening_used_when_survey_has_none() {
        let api = MockSurveyApi {
            survey: Some(SharedSurvey::new("s1", "Fetched")),
            fetched_screening: vec![question_for(Dimension::Gender)],
            ..Default::default()
        };
        let h = Harness::new(api, MockOracle::declining());
        let mut protocol = h.protocol();
        protocol.load().await.unwrap();
        assert_eq!(protocol.screening_questions().len(), 1);
        assert_eq!(protocol.phase(), QualificationPhase::Screening);
    }

    #[tokio::test]
    async fn test_screening_synthesized_from_quota_as_fallback() {
        let quota = QuotaModel::new()
            .with_total_target(100)
            .with_target(BucketKey::Gender(Gender::Male), QuotaTarget::Count(50))
            .with_target(BucketKey::Gender(Gender::Female), QuotaTarget::Count(50));
        let mut survey = SharedSurvey::new("s1", "Quota only");
        survey.quota = Some(quota);

        let h = Harness::new(MockSurveyApi::serving(survey), MockOracle::declining());
        let mut protocol = h.protocol();
        protocol.load().await.unwrap();
        assert_eq!(protocol.screening_questions().len(), 1);
        assert_eq!(
            protocol.screening_questions()[0].dimension,
            Dimension::Gender
        );
    }

    // ==================== Screening ====================

    #[tokio::test]
    async fn test_next_refused_until_answered() {
        let h = Harness::new(
            MockSurveyApi::serving(survey_with_screening()),
            MockOracle::declining(),
        );
        let mut protocol = h.protocol();
        protocol.load().await.unwrap();

        assert!(!protocol.can_advance());
        assert!(matches!(
            protocol.next().await,
            Err(ProtocolError::Unanswered(id)) if id == "screening_age"
        ));
        protocol.answer("screening_age:18-24").unwrap();
        assert!(protocol.can_advance());
    }

    #[tokio::test]
    async fn test_back_and_forth_keeps_answers() {
        let h = Harness::new(
            MockSurveyApi::serving(survey_with_screening()),
            MockOracle::declining(),
        );
        let mut protocol = h.protocol();
        protocol.load().await.unwrap();

        assert!(matches!(protocol.back(), Err(ProtocolError::AtFirstQuestion)));
        protocol.answer("screening_age:35-44").unwrap();
        protocol.next().await.unwrap();
        assert_eq!(protocol.question_index(), 1);
        protocol.back().unwrap();
        assert_eq!(protocol.question_index(), 0);
        assert!(protocol.can_advance());
    }

    #[tokio::test]
    async fn test_answer_rejects_foreign_option() {
        let h = Harness::new(
            MockSurveyApi::serving(survey_with_screening()),
            MockOracle::declining(),
        );
        let mut protocol = h.protocol();
        protocol.load().await.unwrap();
        assert!(matches!(
            protocol.answer("screening_gender:male"),
            Err(ProtocolError::Domain(_))
        ));
    }

    #[tokio::test]
    async fn test_check_refused_while_in_flight() {
        let h = Harness::new(
            MockSurveyApi::serving(survey_with_screening()),
            MockOracle::declining(),
        );
        let mut protocol = h.protocol();
        protocol.load().await.unwrap();
        protocol.answer("screening_age:25-34").unwrap();
        protocol.next().await.unwrap();
        protocol.answer("screening_gender:male").unwrap();

        let gate = protocol.check_gate();
        let permit = gate.try_enter().unwrap();
        assert!(!protocol.can_advance());
        assert!(matches!(
            protocol.next().await,
            Err(ProtocolError::CheckInFlight)
        ));
        assert_eq!(protocol.phase(), QualificationPhase::Screening);
        assert!(h.oracle.checks.lock().unwrap().is_empty());

        drop(permit);
        assert_eq!(
            protocol.next().await.unwrap(),
            QualificationPhase::NotQualified
        );
    }

    // ==================== Checking ====================

    #[tokio::test]
    async fn test_check_sends_answers_in_order() {
        let h = Harness::new(
            MockSurveyApi::serving(survey_with_screening()),
            MockOracle::declining(),
        );
        let mut protocol = h.protocol();
        protocol.load().await.unwrap();
        screen_through(&mut protocol).await;

        let checks = h.oracle.checks.lock().unwrap();
        let answers = &checks[0].screening_answers;
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].screening_question_id, "screening_age");
        assert_eq!(answers[0].answer_value, AgeRange::BRACKETS[1].label());
        assert_eq!(answers[1].screening_option_id, "screening_gender:female");
    }

    #[tokio::test]
    async fn test_declined_is_not_qualified() {
        let h = Harness::new(
            MockSurveyApi::serving(survey_with_screening()),
            MockOracle::declining(),
        );
        let mut protocol = h.protocol();
        protocol.load().await.unwrap();
        assert_eq!(
            screen_through(&mut protocol).await,
            QualificationPhase::NotQualified
        );
        assert_eq!(protocol.respondent().qualified, Some(false));
    }

    #[tokio::test]
    async fn test_quota_full_is_distinguished() {
        let oracle = MockOracle::new(OracleBehavior::Respond(QualificationResponse {
            qualified: Some(false),
            respondent_id: None,
            status: Some("QUOTA_FULL".to_string()),
        }));
        let h = Harness::new(MockSurveyApi::serving(survey_with_screening()), oracle);
        let mut protocol = h.protocol();
        protocol.load().await.unwrap();
        assert_eq!(
            screen_through(&mut protocol).await,
            QualificationPhase::QuotaFull
        );
    }

    #[tokio::test]
    async fn test_oracle_failure_fails_closed() {
        let h = Harness::new(
            MockSurveyApi::serving(survey_with_screening()),
            MockOracle::new(OracleBehavior::Fail),
        );
        let mut protocol = h.protocol();
        protocol.load().await.unwrap();
        assert_eq!(
            screen_through(&mut protocol).await,
            QualificationPhase::NotQualified
        );
        assert_eq!(h.oracle.checks.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_oracle_timeout_fails_closed() {
        let h = Harness::new(
            MockSurveyApi::serving(survey_with_screening()),
            MockOracle::new(OracleBehavior::Hang),
        );
        let mut protocol = h
            .protocol()
            .with_params(ProtocolParams::default().with_request_timeout(Duration::from_millis(20)));
        protocol.load().await.unwrap();
        assert_eq!(
            screen_through(&mut protocol).await,
            QualificationPhase::NotQualified
        );
        assert!(!protocol.check_gate().is_in_flight());
    }

    // ==================== Submission ====================

    #[tokio::test]
    async fn test_submit_marks_completion_once() {
        let h = Harness::new(
            MockSurveyApi::serving(survey_with_screening()),
            MockOracle::qualifying(Some("r1")),
        );
        let mut protocol = h.protocol();
        protocol.load().await.unwrap();
        assert_eq!(
            screen_through(&mut protocol).await,
            QualificationPhase::TakingSurvey
        );

        protocol.answer_survey("q1", "1-2").unwrap();
        assert_eq!(
            protocol.submit().await.unwrap(),
            QualificationPhase::CompletionMarked
        );

        let completions = h.oracle.completions.lock().unwrap();
        assert_eq!(
            *completions,
            vec![("r1".to_string(), "resp-1".to_string())]
        );
        assert_eq!(*h.notifier.beacons.lock().unwrap(), vec![true]);
        assert!(protocol.respondent().completed);
    }

    #[tokio::test]
    async fn test_completion_failure_is_swallowed() {
        let mut oracle = MockOracle::qualifying(Some("r1"));
        oracle.fail_completion = true;
        let h = Harness::new(MockSurveyApi::serving(survey_with_screening()), oracle);
        let mut protocol = h.protocol();
        protocol.load().await.unwrap();
        screen_through(&mut protocol).await;
        protocol.answer_survey("q1", "3+").unwrap();

        assert_eq!(
            protocol.submit().await.unwrap(),
            QualificationPhase::Submitted
        );
        assert_eq!(h.oracle.completions.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_respondent_id_skips_completion() {
        let h = Harness::new(
            MockSurveyApi::serving(survey_with_screening()),
            MockOracle::qualifying(None),
        );
        let mut protocol = h.protocol();
        protocol.load().await.unwrap();
        screen_through(&mut protocol).await;
        protocol.answer_survey("q1", "0").unwrap();

        assert_eq!(
            protocol.submit().await.unwrap(),
            QualificationPhase::Submitted
        );
        assert!(h.oracle.completions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_requires_required_answers() {
        let h = Harness::new(
            MockSurveyApi::serving(survey_with_screening()),
            MockOracle::qualifying(None),
        );
        let mut protocol = h.protocol();
        protocol.load().await.unwrap();
        screen_through(&mut protocol).await;

        assert!(matches!(
            protocol.submit().await,
            Err(ProtocolError::MissingAnswers(ids)) if ids == vec!["q1".to_string()]
        ));
        assert!(matches!(
            protocol.answer_survey("q1", "lots"),
            Err(ProtocolError::InvalidChoice { .. })
        ));
        assert_eq!(protocol.phase(), QualificationPhase::TakingSurvey);
    }

    #[tokio::test]
    async fn test_failed_submission_returns_to_survey() {
        let api = MockSurveyApi::serving(survey_with_screening());
        api.fail_submit.store(true, Ordering::SeqCst);
        let h = Harness::new(api, MockOracle::qualifying(Some("r1")));
        let mut protocol = h.protocol();
        protocol.load().await.unwrap();
        screen_through(&mut protocol).await;
        protocol.answer_survey("q1", "1-2").unwrap();

        assert!(matches!(
            protocol.submit().await,
            Err(ProtocolError::Submission(_))
        ));
        assert_eq!(protocol.phase(), QualificationPhase::TakingSurvey);
        assert_eq!(protocol.survey_answer("q1"), Some("1-2"));
        assert!(h.oracle.completions.lock().unwrap().is_empty());

        h.api.fail_submit.store(false, Ordering::SeqCst);
        assert_eq!(
            protocol.submit().await.unwrap(),
            QualificationPhase::CompletionMarked
        );
    }

    #[tokio::test]
    async fn test_abandon_fires_incomplete_beacon_once() {
        let h = Harness::new(
            MockSurveyApi::serving(survey_with_screening()),
            MockOracle::qualifying(None),
        );
        let mut protocol = h.protocol();
        protocol.load().await.unwrap();
        assert!(!protocol.abandon());
        screen_through(&mut protocol).await;

        assert!(protocol.abandon());
        assert!(!protocol.abandon());
        assert_eq!(*h.notifier.beacons.lock().unwrap(), vec![false]);
    }

    // ==================== Restart ====================

    fn auto_restart_survey(delay_seconds: u64) -> SharedSurvey {
        survey_with_screening().with_settings(SurveySettings {
            auto_restart: true,
            restart_delay_seconds: delay_seconds,
        })
    }

    #[tokio::test]
    async fn test_auto_restart_clears_state() {
        let h = Harness::new(
            MockSurveyApi::serving(auto_restart_survey(0)),
            MockOracle::qualifying(Some("r1")),
        );
        let mut protocol = h.protocol();
        protocol.load().await.unwrap();
        screen_through(&mut protocol).await;
        protocol.answer_survey("q1", "0").unwrap();
        protocol.submit().await.unwrap();
        assert!(protocol.restart_pending());

        assert_eq!(
            protocol.await_restart().await.unwrap(),
            Some(QualificationPhase::Screening)
        );
        assert_eq!(protocol.question_index(), 0);
        assert!(protocol.respondent().screening_answers.is_empty());
        assert_eq!(protocol.respondent().vendor_respondent_id, "tok-1");
        assert_eq!(protocol.survey_answer("q1"), None);
        assert_eq!(protocol.screening_questions().len(), 2);
    }

    #[tokio::test]
    async fn test_restart_can_be_cancelled() {
        let h = Harness::new(
            MockSurveyApi::serving(auto_restart_survey(60)),
            MockOracle::qualifying(None),
        );
        let mut protocol = h.protocol();
        protocol.load().await.unwrap();
        screen_through(&mut protocol).await;
        protocol.answer_survey("q1", "0").unwrap();
        protocol.submit().await.unwrap();

        protocol.restart_cancel_token().unwrap().cancel();
        assert_eq!(protocol.await_restart().await.unwrap(), None);
        assert_eq!(protocol.phase(), QualificationPhase::Submitted);
    }

    #[tokio::test]
    async fn test_no_restart_without_setting() {
        let h = Harness::new(
            MockSurveyApi::serving(survey_with_screening()),
            MockOracle::qualifying(None),
        );
        let mut protocol = h.protocol();
        protocol.load().await.unwrap();
        screen_through(&mut protocol).await;
        protocol.answer_survey("q1", "0").unwrap();
        protocol.submit().await.unwrap();

        assert!(!protocol.restart_pending());
        assert_eq!(protocol.await_restart().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_restart_refused_mid_screening() {
        let h = Harness::new(
            MockSurveyApi::serving(survey_with_screening()),
            MockOracle::declining(),
        );
        let mut protocol = h.protocol();
        protocol.load().await.unwrap();
        assert!(matches!(
            protocol.restart().await,
            Err(ProtocolError::InvalidTransition { .. })
        ));
    }

    // ==================== CheckGate ====================

    #[test]
    fn test_check_gate_single_permit() {
        let gate = CheckGate::default();
        let permit = gate.try_enter().unwrap();
        assert!(gate.is_in_flight());
        assert!(gate.clone().try_enter().is_none());
        drop(permit);
        assert!(!gate.is_in_flight());
        assert!(gate.try_enter().is_some());
    }
}
