use rttm_backend::controllers::{
    content::ContentController,
    delivery::DeliveryController,
    submission::{SubmissionController, TwilioWebhookConfig},
};
use rttm_backend::domain::{
    content::ContentService,
    delivery::DeliveryService,
    pipeline::{PipelineDispatcher, PipelineService, PipelineSettings},
};
use rttm_backend::infrastructure::http::{build_router, AppControllers};
use rttm_backend::infrastructure::repositories::InMemoryRepository;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;

pub mod fakes;
pub mod fixtures;
pub mod postgres;

use api_client::TestClient;
use fakes::{FakeExtractor, FakeSms, FakeStorage, FakeSynthesizer};
use fixtures::TestFixtures;

pub const TWILIO_SID: &str = "AC00000000000000000000000000000000";
pub const TWILIO_NUMBER: &str = "+15550001111";

/// Segment budget of the fake synthesizer; small so tests exercise chunking
pub const SEGMENT_CHARS: usize = 100;

pub struct TestContext {
    pub client: TestClient,
    pub store: Arc<InMemoryRepository>,
    pub extractor: Arc<FakeExtractor>,
    pub synthesizer: Arc<FakeSynthesizer>,
    pub storage: Arc<FakeStorage>,
    pub sms: Arc<FakeSms>,
    pub fixtures: TestFixtures,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl Future<Output = Self> + Send {
        async {
            let store = Arc::new(InMemoryRepository::new());
            let extractor = Arc::new(FakeExtractor::default());
            let synthesizer = Arc::new(FakeSynthesizer::new(SEGMENT_CHARS));
            let storage = Arc::new(FakeStorage::default());
            let sms = Arc::new(FakeSms::default());

            let pipeline_service = Arc::new(PipelineService::new(
                store.clone(),
                store.clone(),
                extractor.clone(),
                synthesizer.clone(),
                storage.clone(),
                sms.clone(),
                PipelineSettings {
                    adapter_timeout: Duration::from_secs(5),
                    synthesis_concurrency: 2,
                },
            ));
            let dispatcher = Arc::new(PipelineDispatcher::new(pipeline_service, 4));

            let controllers = AppControllers {
                content_repo: store.clone(),
                submission_controller: Arc::new(SubmissionController::new(
                    dispatcher,
                    TwilioWebhookConfig {
                        account_sid: TWILIO_SID.to_string(),
                        number: TWILIO_NUMBER.to_string(),
                    },
                )),
                delivery_controller: Arc::new(DeliveryController::new(Arc::new(
                    DeliveryService::new(store.clone()),
                ))),
                // Cache disabled to avoid test pollution
                content_controller: Arc::new(ContentController::new(Arc::new(
                    ContentService::new(store.clone(), false),
                ))),
            };
            let app = build_router(controllers);

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            let client = TestClient::new(&base_url);
            let fixtures = TestFixtures::new(store.clone());

            Self {
                client,
                store,
                extractor,
                synthesizer,
                storage,
                sms,
                fixtures,
            }
        }
    }

    fn teardown(self) -> impl Future<Output = ()> + Send {
        async {}
    }
}

impl TestContext {
    /// Wait until the background runs have recorded `count` requests
    pub async fn wait_for_requests(&self, count: usize) {
        let store = self.store.clone();
        eventually(move || {
            let store = store.clone();
            async move { store.request_count().await >= count }
        })
        .await;
    }
}

/// Poll `condition` until it holds, failing the test after two seconds
pub async fn eventually<F, Fut>(condition: F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if condition().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met within 2s");
}

/// Article text of exactly `chars` characters
pub fn article(chars: usize) -> String {
    "Audio versions of articles make long commutes shorter. "
        .chars()
        .cycle()
        .take(chars)
        .collect()
}
