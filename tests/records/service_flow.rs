use super::support::{MockProvider, params, png_base64, result, sentinel};
use serde_json::json;
use skinsight::{AnalysisError, Config};
use skinsight::analysis::{Analyzer, InferenceInvoker, RetryController};
use skinsight::auth::FileCredentialStore;
use skinsight::llm::Provider;
use skinsight::records::{JsonFileRecordStore, RecordStore};
use skinsight::service::{AnalysisService, ServiceRequest};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Fixture {
    root: TempDir,
    provider: Arc<MockProvider>,
    service: Arc<AnalysisService>,
}

async fn fixture(provider: MockProvider) -> Fixture {
    let root = TempDir::new().unwrap();
    let users = FileCredentialStore::new(root.path().join("users")).with_cost(4);
    users.create_user("alice", "segreta").await.unwrap();

    let data = root.path().join("user_data").join("alice");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(
        data.join("anagrafiche.json"),
        json!([{"id": "p1", "nome": "Lia"}, {"id": "p2", "nome": "Teo"}]).to_string(),
    )
    .unwrap();

    let provider = Arc::new(provider);
    let analyzer = Analyzer::new(
        InferenceInvoker::new(
            Arc::clone(&provider) as Arc<dyn Provider>,
            params(),
            Duration::from_secs(5),
        ),
        RetryController::default(),
    );
    let records = Arc::new(JsonFileRecordStore::new(
        root.path().join("user_data"),
        "anagrafiche.json",
    ));
    let service = AnalysisService::new(Arc::new(users), analyzer, records);

    Fixture {
        root,
        provider,
        service: Arc::new(service),
    }
}

fn request(password: &str, entity_id: &str) -> ServiceRequest {
    ServiceRequest {
        username: "alice".into(),
        password: password.into(),
        entity_id: entity_id.into(),
        images: vec![png_base64(4, 4)],
        body_zone: None,
        max_attempts: None,
    }
}

fn store(f: &Fixture) -> JsonFileRecordStore {
    JsonFileRecordStore::new(f.root.path().join("user_data"), "anagrafiche.json")
}

#[tokio::test]
async fn verified_request_lands_in_history() {
    let f = fixture(MockProvider::always(&sentinel(48))).await;
    let response = f.service.handle(&request("segreta", "p1")).await.unwrap();
    assert_eq!(response.outcome.result, result(48));
    assert_eq!(f.provider.calls(), 1);

    let records = store(&f).load("alice").await.unwrap();
    assert_eq!(records[0].history().len(), 1);
    assert_eq!(records[0].history()[0].analysis(), Some(result(48)));
    assert_eq!(records[0].fields["nome"], "Lia");
}

#[tokio::test]
async fn bad_password_is_unauthorized() {
    let f = fixture(MockProvider::always(&sentinel(48))).await;
    let err = f.service.handle(&request("sbagliata", "p1")).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Unauthorized { .. }));
    assert_eq!(f.provider.calls(), 0);
}

#[tokio::test]
async fn analyzer_ceiling_applies_by_default() {
    let f = fixture(MockProvider::always("solo testo")).await;
    let err = f.service.handle(&request("segreta", "p1")).await.unwrap_err();
    assert!(matches!(err, AnalysisError::ExhaustedRetries { attempts: 3, .. }));
    assert_eq!(f.provider.calls(), 3);
    assert!(store(&f).load("alice").await.unwrap()[0].history().is_empty());
}

#[tokio::test]
async fn request_budget_overrides_the_configured_one() {
    let f = fixture(MockProvider::always("solo testo")).await;
    let mut req = request("segreta", "p1");
    req.max_attempts = Some(7);
    let err = f.service.handle(&req).await.unwrap_err();
    assert!(matches!(err, AnalysisError::ExhaustedRetries { attempts: 7, .. }));
    assert_eq!(f.provider.calls(), 7);
}

#[tokio::test]
async fn configured_max_attempts_reaches_the_service_built_from_config() {
    let root = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "nessun blocco"}}]
        })))
        .expect(5)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.provider.base_url = server.uri();
    config.provider.api_key = Some("sk-test".into());
    config.provider.request_timeout_secs = 5;
    config.analysis.max_attempts = 5;
    config.storage.users_dir = root.path().join("users").display().to_string();
    config.storage.data_dir = root.path().join("user_data").display().to_string();

    FileCredentialStore::new(config.storage.users_path())
        .with_cost(4)
        .create_user("alice", "segreta")
        .await
        .unwrap();
    let data = root.path().join("user_data").join("alice");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(data.join("anagrafiche.json"), json!([{"id": "p1"}]).to_string()).unwrap();

    let service = AnalysisService::from_config(&config).unwrap();
    let err = service.handle(&request("segreta", "p1")).await.unwrap_err();
    assert!(matches!(err, AnalysisError::ExhaustedRetries { attempts: 5, .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_for_one_user_all_persist() {
    let f = fixture(MockProvider::always(&sentinel(77))).await;
    let tasks: Vec<_> = ["p1", "p2", "p1", "p2", "p1"]
        .into_iter()
        .map(|id| {
            let service = Arc::clone(&f.service);
            tokio::spawn(async move { service.handle(&request("segreta", id)).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let records = store(&f).load("alice").await.unwrap();
    assert_eq!(records[0].history().len(), 3);
    assert_eq!(records[1].history().len(), 2);
}
