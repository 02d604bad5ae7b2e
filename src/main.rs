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
use rttm_backend::infrastructure::config::{Config, ExtractorProvider, LogFormat, TtsProvider};
use rttm_backend::infrastructure::db::{check_connection, create_pool, run_migrations};
use rttm_backend::infrastructure::http::{start_http_server, AppControllers};
use rttm_backend::infrastructure::repositories::{
    ContentRepository, DeliveryRepository, EmbedlyExtractionRepository, ExtractionRepository,
    HtmlExtractionRepository, InMemoryRepository, OpenAiTtsRepository, PgContentRepository,
    PgDeliveryRepository, PollyTtsRepository, S3StorageRepository, TtsRepository,
    TwilioSmsRepository,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!("Starting RTTM Backend on {}:{}", config.host, config.port);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Stores: Postgres when configured, process-local otherwise
    let (content_repo, delivery_repo): (Arc<dyn ContentRepository>, Arc<dyn DeliveryRepository>) =
        match &config.database_url {
            Some(database_url) => {
                let pool = create_pool(database_url).await?;
                tracing::info!("Database connection pool created");

                check_connection(&pool).await?;
                tracing::info!("Database connection verified");

                run_migrations(&pool).await?;
                tracing::info!("Database migrations applied");

                let pool = Arc::new(pool);
                (
                    Arc::new(PgContentRepository::new(pool.clone())),
                    Arc::new(PgDeliveryRepository::new(pool)),
                )
            }
            None => {
                if !config.is_development() {
                    return Err("DATABASE_URL is required outside development".into());
                }
                tracing::warn!("DATABASE_URL not set, using in-memory stores; data is lost on restart");
                let store = Arc::new(InMemoryRepository::new());
                (store.clone(), store)
            }
        };

    // 2. External adapters
    tracing::info!("Initializing AWS clients with region: {}", config.aws_region);
    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.aws_region.clone()))
        .load()
        .await;
    tracing::info!(region = ?aws_config.region(), "AWS configuration loaded");

    let http_client = reqwest::Client::builder()
        .timeout(config.adapter_timeout())
        .build()?;

    let tts_repo: Arc<dyn TtsRepository> = match config.tts_provider {
        TtsProvider::Polly => Arc::new(PollyTtsRepository::new(Arc::new(
            aws_sdk_polly::Client::new(&aws_config),
        ))),
        TtsProvider::OpenAi => {
            let api_key = config.openai_api_key.clone().unwrap_or_default();
            let openai_client = async_openai::Client::with_config(
                async_openai::config::OpenAIConfig::new().with_api_key(api_key),
            );
            Arc::new(OpenAiTtsRepository::new(
                Arc::new(openai_client),
                config.openai_tts_model.clone(),
                config.openai_tts_voice.clone(),
            ))
        }
    };
    tracing::info!(
        provider = tts_repo.provider(),
        max_segment_chars = tts_repo.max_segment_chars(),
        "Speech synthesizer initialized"
    );

    let extraction_repo: Arc<dyn ExtractionRepository> = match config.extractor_provider {
        ExtractorProvider::Html => Arc::new(HtmlExtractionRepository::new(http_client.clone())),
        ExtractorProvider::Embedly => Arc::new(EmbedlyExtractionRepository::new(
            config.embedly_api_key.clone().unwrap_or_default(),
            http_client.clone(),
        )),
    };
    tracing::info!(provider = extraction_repo.provider(), "Content extractor initialized");

    let storage_repo = Arc::new(S3StorageRepository::new(
        Arc::new(aws_sdk_s3::Client::new(&aws_config)),
        config.s3_bucket_name.clone(),
        config.aws_region.clone(),
        config.s3_public_base_url.clone(),
    ));
    let sms_repo = Arc::new(TwilioSmsRepository::new(
        config.twilio_account_sid.clone(),
        config.twilio_auth_token.clone(),
        config.twilio_number.clone(),
        http_client,
    ));

    // 3. Services
    tracing::info!("Instantiating services...");
    let pipeline_service = Arc::new(PipelineService::new(
        content_repo.clone(),
        delivery_repo.clone(),
        extraction_repo,
        tts_repo,
        storage_repo,
        sms_repo,
        PipelineSettings {
            adapter_timeout: config.adapter_timeout(),
            synthesis_concurrency: config.synthesis_concurrency,
        },
    ));
    let dispatcher = Arc::new(PipelineDispatcher::new(
        pipeline_service,
        config.max_in_flight_pipelines,
    ));
    let content_service = Arc::new(ContentService::new(
        content_repo.clone(),
        config.content_cache_enabled,
    ));
    let delivery_service = Arc::new(DeliveryService::new(delivery_repo));

    // 4. Controllers
    tracing::info!("Instantiating controllers...");
    let controllers = AppControllers {
        content_repo,
        submission_controller: Arc::new(SubmissionController::new(
            dispatcher,
            TwilioWebhookConfig {
                account_sid: config.twilio_account_sid.clone(),
                number: config.twilio_number.clone(),
            },
        )),
        delivery_controller: Arc::new(DeliveryController::new(delivery_service)),
        content_controller: Arc::new(ContentController::new(content_service)),
    };

    // Start HTTP server with all routes
    start_http_server(Arc::new(config), controllers).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rttm_backend=debug,tower_http=debug".into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
