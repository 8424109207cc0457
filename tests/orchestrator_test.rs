use std::sync::Arc;
use std::time::Duration;

use marlin::social::orchestrator::TIMEOUT;
use marlin::social::providers::mock::MockProvider;
use marlin::social::providers::{AUTH, Provider, UNSUPPORTED};
use marlin::social::store::memory::InMemoryStore;
use marlin::social::{
    ChannelStatus, IdempotencyStore, OrchestratorConfig, OverallStatus, PostOrchestrator,
    PostRequest, PostResponse, ProviderRegistry, SocialChannel,
};

const FB: SocialChannel = SocialChannel::Facebook;
const IG: SocialChannel = SocialChannel::Instagram;

fn orchestrator_with(
    providers: Vec<Arc<dyn Provider>>,
    config: OrchestratorConfig,
) -> (PostOrchestrator, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let registry = Arc::new(ProviderRegistry::from_providers(providers));
    let orchestrator = PostOrchestrator::new(registry, store.clone(), config);
    (orchestrator, store)
}

fn orchestrator(providers: Vec<Arc<dyn Provider>>) -> (PostOrchestrator, Arc<InMemoryStore>) {
    orchestrator_with(providers, OrchestratorConfig::default())
}

#[tokio::test]
async fn empty_post_calls_no_adapter() {
    let fb = MockProvider::succeeding(FB, "fb_1");
    let (orch, store) = orchestrator(vec![fb.clone()]);

    let request = PostRequest {
        text: Some("   ".to_string()),
        ..PostRequest::default()
    }
    .with_channels(&["FACEBOOK"])
    .with_idempotency_key("k-empty");

    let response = orch.submit(request).await.unwrap();
    assert_eq!(response.overall_status, OverallStatus::Failed);
    assert!(response.results.is_empty());
    assert_eq!(fb.calls(), 0);
    assert!(store.is_empty().await.unwrap());
}

#[tokio::test]
async fn all_channels_succeed() {
    let fb = MockProvider::succeeding(FB, "fb_1");
    let ig = MockProvider::succeeding(IG, "ig_1");
    let (orch, _) = orchestrator(vec![fb.clone(), ig.clone()]);

    let response = orch
        .submit(PostRequest::text("hello").with_channels(&["FACEBOOK", "INSTAGRAM"]))
        .await
        .unwrap();

    assert_eq!(response.overall_status, OverallStatus::Success);
    assert_eq!(response.results[&FB].external_id.as_deref(), Some("fb_1"));
    assert_eq!(response.results[&IG].external_id.as_deref(), Some("ig_1"));
    assert_eq!((fb.calls(), ig.calls()), (1, 1));
}

#[tokio::test]
async fn launch_day_is_partial_success() {
    let fb = MockProvider::succeeding(FB, "fb_1");
    let ig = MockProvider::failing(IG, AUTH, "Missing Instagram credentials");
    let (orch, _) = orchestrator(vec![fb, ig]);

    let response = orch
        .submit(PostRequest::text("Launch day!").with_channels(&["FACEBOOK", "INSTAGRAM"]))
        .await
        .unwrap();

    assert_eq!(response.overall_status, OverallStatus::PartialSuccess);
    assert_eq!(response.results.len(), 2);

    let fb = &response.results[&FB];
    assert_eq!(fb.status, ChannelStatus::Success);
    assert_eq!(fb.external_id.as_deref(), Some("fb_1"));

    let ig = &response.results[&IG];
    assert_eq!(ig.status, ChannelStatus::Failed);
    assert_eq!(ig.error_code.as_deref(), Some(AUTH));
    assert!(ig.external_id.is_none());
}

#[tokio::test]
async fn all_channels_fail() {
    let fb = MockProvider::failing(FB, "ERR_FACEBOOK", "boom");
    let ig = MockProvider::failing(IG, "ERR_INSTAGRAM", "boom");
    let (orch, _) = orchestrator(vec![fb, ig]);

    let response = orch
        .submit(PostRequest::text("hi").with_channels(&["FACEBOOK", "INSTAGRAM"]))
        .await
        .unwrap();
    assert_eq!(response.overall_status, OverallStatus::Failed);
    assert_eq!(response.results.len(), 2);
}

#[tokio::test]
async fn duplicate_channels_post_once() {
    let fb = MockProvider::succeeding(FB, "fb_1");
    let (orch, _) = orchestrator(vec![fb.clone()]);

    let response = orch
        .submit(PostRequest::text("hi").with_channels(&["FACEBOOK", "facebook"]))
        .await
        .unwrap();
    assert_eq!(response.results.len(), 1);
    assert_eq!(fb.calls(), 1);
}

#[tokio::test]
async fn media_only_post_is_accepted() {
    let ig = MockProvider::succeeding(IG, "ig_1");
    let (orch, _) = orchestrator(vec![ig.clone()]);

    let request = PostRequest::default()
        .with_channels(&["INSTAGRAM"])
        .with_media(&["https://cdn.example.com/a.jpg"]);
    let response = orch.submit(request).await.unwrap();
    assert_eq!(response.overall_status, OverallStatus::Success);
    assert_eq!(ig.calls(), 1);
}

#[tokio::test]
async fn replay_returns_stored_response_without_calling_adapters() {
    let fb = MockProvider::succeeding(FB, "fb_1");
    let (orch, store) = orchestrator(vec![fb.clone()]);
    let request = PostRequest::text("hi")
        .with_channels(&["FACEBOOK"])
        .with_idempotency_key("k1");

    let first = orch.submit(request.clone()).await.unwrap();
    let second = orch.submit(request).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.correlation_id.as_deref(), Some("k1"));
    assert_eq!(fb.calls(), 1);
    assert_eq!(store.len().await.unwrap(), 1);
}

#[tokio::test]
async fn replay_ignores_a_different_body_under_the_same_key() {
    let fb = MockProvider::succeeding(FB, "fb_1");
    let ig = MockProvider::succeeding(IG, "ig_1");
    let (orch, _) = orchestrator(vec![fb.clone(), ig.clone()]);

    let first = orch
        .submit(
            PostRequest::text("one")
                .with_channels(&["FACEBOOK"])
                .with_idempotency_key("k1"),
        )
        .await
        .unwrap();
    let second = orch
        .submit(
            PostRequest::text("two")
                .with_channels(&["INSTAGRAM"])
                .with_idempotency_key("k1"),
        )
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(ig.calls(), 0);
}

#[tokio::test]
async fn concurrent_identical_keys_fan_out_once() {
    let fb = MockProvider::succeeding(FB, "fb_1").with_delay(Duration::from_millis(50));
    let (orch, _) = orchestrator(vec![fb.clone()]);
    let orch = Arc::new(orch);

    let request = PostRequest::text("race")
        .with_channels(&["FACEBOOK"])
        .with_idempotency_key("same");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let orch = Arc::clone(&orch);
            let request = request.clone();
            tokio::spawn(async move { orch.submit(request).await.unwrap() })
        })
        .collect();

    let mut responses = Vec::new();
    for handle in handles {
        responses.push(handle.await.unwrap());
    }

    assert_eq!(fb.calls(), 1);
    assert!(responses.windows(2).all(|w| w[0] == w[1]));
}

#[tokio::test]
async fn unkeyed_posts_are_not_stored() {
    let fb = MockProvider::succeeding(FB, "fb_1");
    let (orch, store) = orchestrator(vec![fb.clone()]);

    let request = PostRequest::text("hi").with_channels(&["FACEBOOK"]);
    let response = orch.submit(request.clone()).await.unwrap();
    orch.submit(request).await.unwrap();

    assert!(response.correlation_id.is_none());
    assert_eq!(fb.calls(), 2);
    assert!(store.is_empty().await.unwrap());
}

#[tokio::test]
async fn get_status_unknown_and_seeded() {
    let (orch, store) = orchestrator(vec![]);
    assert!(orch.get_status("missing").await.unwrap().is_none());

    let seeded = PostResponse::from_results(
        vec![marlin::social::ChannelResult::success(FB, "fb_seed")],
        Some("seeded".to_string()),
    );
    store.insert_if_absent("seeded", seeded.clone()).await.unwrap();

    assert_eq!(orch.get_status("seeded").await.unwrap(), Some(seeded));
}

#[tokio::test]
async fn get_status_sees_submitted_post() {
    let fb = MockProvider::succeeding(FB, "fb_1");
    let (orch, _) = orchestrator(vec![fb]);
    let response = orch
        .submit(
            PostRequest::text("hi")
                .with_channels(&["FACEBOOK"])
                .with_idempotency_key("k-status"),
        )
        .await
        .unwrap();

    assert_eq!(orch.get_status("k-status").await.unwrap(), Some(response));
}

#[tokio::test]
async fn default_channels_apply_when_none_requested() {
    let fb = MockProvider::succeeding(FB, "fb_1");
    let ig = MockProvider::succeeding(IG, "ig_1");
    let (orch, _) = orchestrator_with(
        vec![fb.clone(), ig.clone()],
        OrchestratorConfig {
            default_channels: vec!["FACEBOOK".to_string()],
            channel_timeout: None,
        },
    );

    let response = orch.submit(PostRequest::text("hi")).await.unwrap();
    assert_eq!(response.results.keys().copied().collect::<Vec<_>>(), vec![FB]);
    assert_eq!((fb.calls(), ig.calls()), (1, 0));
}

#[tokio::test]
async fn unknown_only_channels_do_not_fall_back() {
    let fb = MockProvider::succeeding(FB, "fb_1");
    let (orch, _) = orchestrator_with(
        vec![fb.clone()],
        OrchestratorConfig {
            default_channels: vec!["FACEBOOK".to_string()],
            channel_timeout: None,
        },
    );

    let response = orch
        .submit(PostRequest::text("hi").with_channels(&["TWITTER"]))
        .await
        .unwrap();
    assert_eq!(response.overall_status, OverallStatus::Failed);
    assert!(response.results.is_empty());
    assert_eq!(fb.calls(), 0);
}

#[tokio::test]
async fn slow_channel_times_out_without_blocking_others() {
    let fb = MockProvider::succeeding(FB, "fb_1");
    let ig = MockProvider::hanging(IG);
    let (orch, _) = orchestrator_with(
        vec![fb, ig],
        OrchestratorConfig {
            default_channels: vec![],
            channel_timeout: Some(Duration::from_millis(50)),
        },
    );

    let response = tokio::time::timeout(
        Duration::from_secs(5),
        orch.submit(PostRequest::text("hi").with_channels(&["FACEBOOK", "INSTAGRAM"])),
    )
    .await
    .expect("timeout should bound the fan-out")
    .unwrap();

    assert_eq!(response.overall_status, OverallStatus::PartialSuccess);
    assert_eq!(response.results[&IG].error_code.as_deref(), Some(TIMEOUT));
}

#[tokio::test]
async fn panicking_adapter_becomes_a_failed_result() {
    let fb = MockProvider::panicking(FB);
    let ig = MockProvider::succeeding(IG, "ig_1");
    let (orch, _) = orchestrator(vec![fb, ig]);

    let response = orch
        .submit(PostRequest::text("hi").with_channels(&["FACEBOOK", "INSTAGRAM"]))
        .await
        .unwrap();

    assert_eq!(response.overall_status, OverallStatus::PartialSuccess);
    let fb = &response.results[&FB];
    assert_eq!(fb.error_code.as_deref(), Some("ERR_FACEBOOK"));
    assert!(
        fb.error_message
            .as_deref()
            .unwrap()
            .starts_with("Facebook provider task failed")
    );
}

#[tokio::test]
async fn channel_without_adapter_is_unsupported() {
    let fb = MockProvider::succeeding(FB, "fb_1");
    let (orch, _) = orchestrator(vec![fb]);

    let response = orch
        .submit(PostRequest::text("hi").with_channels(&["FACEBOOK", "INSTAGRAM"]))
        .await
        .unwrap();
    assert_eq!(response.overall_status, OverallStatus::PartialSuccess);
    assert_eq!(response.results[&IG].error_code.as_deref(), Some(UNSUPPORTED));
}

#[tokio::test]
async fn dropped_keyed_submit_still_stores_its_response() {
    let fb = MockProvider::succeeding(FB, "fb_1").with_delay(Duration::from_millis(100));
    let (orch, store) = orchestrator(vec![fb.clone()]);
    let request = PostRequest::text("hi")
        .with_channels(&["FACEBOOK"])
        .with_idempotency_key("k-dropped");

    let first = tokio::time::timeout(Duration::from_millis(20), orch.submit(request.clone())).await;
    assert!(first.is_err());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(store.get("k-dropped").await.unwrap().is_some());

    let retry = orch.submit(request).await.unwrap();
    assert_eq!(retry.results[&FB].external_id.as_deref(), Some("fb_1"));
    assert_eq!(fb.calls(), 1);
}
