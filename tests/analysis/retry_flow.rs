use super::support::{MockProvider, params, png_base64, result, sentinel};
use skinsight::AnalysisError;
use skinsight::analysis::{AnalysisRequest, Analyzer, InferenceInvoker, RetryController};
use skinsight::error::LlmError;
use skinsight::llm::Provider;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn analyzer(provider: &Arc<MockProvider>, attempts: u32) -> Analyzer {
    Analyzer::new(
        InferenceInvoker::new(
            Arc::clone(provider) as Arc<dyn Provider>,
            params(),
            Duration::from_secs(5),
        ),
        RetryController::new(attempts).unwrap(),
    )
}

#[tokio::test]
async fn call_count_stays_within_budget_and_stops_at_first_success() {
    for budget in 1..=5u32 {
        for succeed_on in 1..=budget {
            let mut replies: Vec<_> = (1..succeed_on)
                .map(|_| Ok("testo libero".to_string()))
                .collect();
            replies.push(Ok(sentinel(80)));
            let provider = Arc::new(MockProvider::new(replies));

            let outcome = analyzer(&provider, budget)
                .run(
                    &AnalysisRequest::new(vec![png_base64(2, 2)]),
                    &CancellationToken::new(),
                )
                .await
                .unwrap();
            assert_eq!(outcome.attempts, succeed_on);
            assert_eq!(provider.calls(), succeed_on as usize);
            assert_eq!(outcome.result, result(80));
        }
    }
}

#[tokio::test]
async fn failing_every_attempt_reports_the_budget() {
    for budget in [1u32, 3, 10] {
        let provider = Arc::new(MockProvider::always("nessuna struttura"));
        let err = analyzer(&provider, budget)
            .analyze(&[png_base64(2, 2)], None)
            .await
            .unwrap_err();
        match err {
            AnalysisError::ExhaustedRetries { attempts, .. } => assert_eq!(attempts, budget),
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert_eq!(provider.calls(), budget as usize);
    }
}

#[tokio::test]
async fn inference_errors_are_retried_like_format_errors() {
    let provider = Arc::new(MockProvider::new(vec![
        Err(LlmError::Status {
            provider: "mock".into(),
            status: 503,
            body: "overloaded".into(),
        }),
        Err(LlmError::EmptyResponse {
            provider: "mock".into(),
        }),
        Ok(sentinel(30)),
    ]));
    let analyzed = analyzer(&provider, 3)
        .analyze(&[png_base64(2, 2)], Some("Guancia"))
        .await
        .unwrap();
    assert_eq!(analyzed, result(30));
}

#[tokio::test]
async fn last_error_is_carried_on_exhaustion() {
    let provider = Arc::new(MockProvider::new(vec![
        Ok("prosa".into()),
        Err(LlmError::Timeout {
            provider: "mock".into(),
            secs: 120,
        }),
    ]));
    let err = analyzer(&provider, 2)
        .analyze(&[png_base64(2, 2)], None)
        .await
        .unwrap_err();
    match err {
        AnalysisError::ExhaustedRetries { last_error, .. } => {
            assert!(last_error.contains("timed out"));
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
}

#[tokio::test]
async fn bad_image_fails_fast_without_model_calls() {
    let provider = Arc::new(MockProvider::always(&sentinel(50)));
    let err = analyzer(&provider, 10)
        .analyze(&[png_base64(2, 2), "bm90IGFuIGltYWdl".into()], None)
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Decode(_)));
    assert!(err.is_client_error());
    assert_eq!(provider.calls(), 0);
}
