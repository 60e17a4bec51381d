//! Integration tests for the reqwest adapters against a mock survey backend

use quota_gate_application::{
    InMemoryStore, KeyValueStore, OracleError, ProtocolParams, PublishInput,
    PublishSurveyUseCase, QualificationProtocol, QualificationRequest, QuotaOracle,
    QuotaSaveRequest, SurveyApi, SurveyApiError, VendorContext, VendorNotifier,
    take_last_published,
};
use quota_gate_domain::{
    AgeRange, BucketKey, QualificationPhase, QualificationVerdict, QuotaModel, QuotaTarget,
    ScreeningAnswer,
};
use quota_gate_infrastructure::{ApiClient, HttpQuotaOracle, HttpSurveyApi, HttpVendorNotifier};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

fn protocol(
    server: &MockServer,
    token: &str,
) -> QualificationProtocol<HttpSurveyApi, HttpQuotaOracle, HttpVendorNotifier> {
    QualificationProtocol::new(
        Arc::new(HttpSurveyApi::new(client(server))),
        Arc::new(HttpQuotaOracle::new(client(server))),
        Arc::new(HttpVendorNotifier::new(client(server))),
        token,
    )
}

async fn mount_unscreened_survey(server: &MockServer, token: &str, survey_id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/surveys/share/{}", token)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "survey": {"id": survey_id, "title": "Commute"}
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/surveys/{}/screening-questions", survey_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

fn age_answer() -> ScreeningAnswer {
    ScreeningAnswer {
        screening_question_id: "screening_age".to_string(),
        screening_option_id: "screening_age:25-34".to_string(),
        answer_value: "25-34".to_string(),
    }
}

// ==================== Quota oracle ====================

#[tokio::test]
async fn test_check_sends_answers_and_reads_verdict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/quotas/s1/check"))
        .and(body_json(json!({
            "screeningAnswers": [{
                "screeningQuestionId": "screening_age",
                "screeningOptionId": "screening_age:25-34",
                "answerValue": "25-34"
            }],
            "vendor_respondent_id": "tok-1"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"qualified": true, "respondent_id": "r-7"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let oracle = HttpQuotaOracle::new(client(&server));
    let response = oracle
        .check_qualification(
            "s1",
            &QualificationRequest {
                vendor_respondent_id: "tok-1".to_string(),
                screening_answers: vec![age_answer()],
            },
        )
        .await
        .unwrap();

    assert_eq!(response.qualified, Some(true));
    assert_eq!(response.respondent_id.as_deref(), Some("r-7"));
}

#[tokio::test]
async fn test_client_timeout_maps_to_oracle_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/quotas/s1/check"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"qualified": true}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri(), Duration::from_millis(100)).unwrap();
    let oracle = HttpQuotaOracle::new(client);
    let result = oracle
        .check_qualification(
            "s1",
            &QualificationRequest {
                vendor_respondent_id: "tok-1".to_string(),
                screening_answers: Vec::new(),
            },
        )
        .await;

    assert!(matches!(result, Err(OracleError::Timeout)));
}

#[tokio::test]
async fn test_server_error_maps_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/quotas/s1/respondents/r-7/complete"))
        .and(body_json(json!({"responseId": "resp-1"})))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let oracle = HttpQuotaOracle::new(client(&server));
    let result = oracle.mark_completed("s1", "r-7", "resp-1").await;
    assert!(matches!(result, Err(OracleError::Status(503))));
}

// ==================== Qualification flow ====================

#[tokio::test]
async fn test_slow_oracle_fails_closed() {
    let server = MockServer::start().await;
    mount_unscreened_survey(&server, "tok-slow", "s2").await;
    Mock::given(method("POST"))
        .and(path("/quotas/s2/check"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"qualified": true}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let mut protocol = protocol(&server, "tok-slow").with_params(
        ProtocolParams::default().with_request_timeout(Duration::from_millis(200)),
    );
    let phase = protocol.load().await.unwrap();

    assert_eq!(phase, QualificationPhase::NotQualified);
    assert!(matches!(
        protocol.verdict(),
        Some(QualificationVerdict::NotQualified { .. })
    ));
    assert_eq!(protocol.respondent().qualified, Some(false));
}

#[tokio::test]
async fn test_quota_full_status_is_distinguished() {
    let server = MockServer::start().await;
    mount_unscreened_survey(&server, "tok-full", "s3").await;
    Mock::given(method("POST"))
        .and(path("/quotas/s3/check"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"qualified": false, "status": "QUOTA_FULL"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut protocol = protocol(&server, "tok-full");
    let phase = protocol.load().await.unwrap();

    assert_eq!(phase, QualificationPhase::QuotaFull);
    assert_eq!(protocol.verdict(), Some(&QualificationVerdict::QuotaFull));
}

#[tokio::test]
async fn test_conflict_means_already_submitted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/surveys/share/tok-used"))
        .respond_with(ResponseTemplate::new(409).set_body_string("already submitted"))
        .mount(&server)
        .await;

    let api = HttpSurveyApi::new(client(&server));
    assert!(matches!(
        api.resolve_share_token("tok-used").await,
        Err(SurveyApiError::AlreadySubmitted)
    ));

    let mut protocol = protocol(&server, "tok-used");
    assert_eq!(
        protocol.load().await.unwrap(),
        QualificationPhase::AlreadySubmitted
    );
}

#[tokio::test]
async fn test_full_respondent_flow() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/surveys/share/tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "survey": {
                "id": "s1",
                "title": "Coffee habits",
                "questions": [
                    {"id": "q1", "text": "Favourite drink?", "required": true,
                     "choices": ["Espresso", "Latte"]}
                ]
            },
            "quota": {
                "totaltarget": 100,
                "screeningquestions": [{
                    "questionId": "screening_gender",
                    "optionTargets": [{"optionId": "screening_gender:female", "target": 100}]
                }]
            },
            "settings": {"autoRestart": false}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/surveys/s1/screening-questions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/quotas/s1/check"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"qualified": true, "respondentId": "r-9"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/surveys/share/tok-1/responses"))
        .and(body_json(json!({"answers": [{"questionId": "q1", "value": "Latte"}]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "resp-1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/quotas/s1/respondents/r-9/complete"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut protocol = protocol(&server, "tok-1");
    assert_eq!(protocol.load().await.unwrap(), QualificationPhase::Screening);
    assert_eq!(protocol.screening_questions().len(), 1);

    protocol.answer("screening_gender:female").unwrap();
    assert_eq!(
        protocol.next().await.unwrap(),
        QualificationPhase::TakingSurvey
    );

    protocol.answer_survey("q1", "Latte").unwrap();
    assert_eq!(
        protocol.submit().await.unwrap(),
        QualificationPhase::CompletionMarked
    );
    assert_eq!(protocol.response_id(), Some("resp-1"));
    assert!(!protocol.restart_pending());
}

// ==================== Vendor callbacks ====================

#[tokio::test]
async fn test_redirect_beacon_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vendors/redirect"))
        .and(query_param("shareTokenId", "tok 1"))
        .and(query_param("isCompleted", "false"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = HttpVendorNotifier::new(client(&server));
    notifier.fire_redirect("tok 1", false);

    for _ in 0..50 {
        let received = server.received_requests().await.unwrap_or_default();
        if !received.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let received = server.received_requests().await.unwrap_or_default();
    assert_eq!(received.len(), 1);
}

#[tokio::test]
async fn test_job_status_update_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/vendors/cint/surveys/s1/status"))
        .and(body_json(json!({"statusCode": 22})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = HttpVendorNotifier::new(client(&server));
    notifier.update_job_status("cint", "s1", 22).await.unwrap();
}

// ==================== Publishing ====================

fn publishable_quota() -> QuotaModel {
    QuotaModel::new()
        .with_total_target(100)
        .with_target(BucketKey::Age(AgeRange::BRACKETS[0]), QuotaTarget::Count(60))
        .with_target(BucketKey::Age(AgeRange::BRACKETS[1]), QuotaTarget::Count(40))
}

#[tokio::test]
async fn test_save_quota_document_shape() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/surveys/s1/quota"))
        .and(body_partial_json(json!({
            "totaltarget": 100,
            "vendorId": "cint",
            "screeningquestions": [{"questionId": "screening_age", "quotaType": "COUNT"}]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpSurveyApi::new(client(&server));
    let vendor = VendorContext {
        vendor_id: "cint".to_string(),
        country_code: None,
        language: None,
    };
    api.save_quota(
        "s1",
        QuotaSaveRequest {
            model: &publishable_quota(),
            vendor: Some(&vendor),
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_publish_records_share_link() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/surveys/s1/quota"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/surveys/s1/share-links"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"url": "https://surveys.example/s/abc"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
    let use_case = PublishSurveyUseCase::new(
        Arc::new(HttpSurveyApi::new(client(&server))),
        Arc::new(HttpVendorNotifier::new(client(&server))),
        store.clone(),
    );
    let output = use_case
        .execute(PublishInput::new("s1", publishable_quota()))
        .await
        .unwrap();

    assert!(!output.local_link);
    assert_eq!(output.record.share_url, "https://surveys.example/s/abc");

    let record = take_last_published(store.as_ref()).unwrap().unwrap();
    assert_eq!(record.survey_id, "s1");
    assert!(take_last_published(store.as_ref()).unwrap().is_none());
}

#[tokio::test]
async fn test_publish_falls_back_to_local_link() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/surveys/s1/quota"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/surveys/s1/share-links"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let use_case = PublishSurveyUseCase::new(
        Arc::new(HttpSurveyApi::new(client(&server))),
        Arc::new(HttpVendorNotifier::new(client(&server))),
        Arc::new(InMemoryStore::new()),
    );
    let output = use_case
        .execute(PublishInput::new("s1", publishable_quota()))
        .await
        .unwrap();

    assert!(output.local_link);
    assert_eq!(output.record.share_url, "http://localhost:3000/survey/s1");
}
