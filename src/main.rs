use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voicify::controllers::{session::SessionController, tts::TtsController};
use voicify::domain::session::SessionState;
use voicify::domain::tts::TtsService;
use voicify::infrastructure::audio::{Mp3SpeedAdjuster, SpeedAdjuster};
use voicify::infrastructure::cache::DiskAudioCache;
use voicify::infrastructure::config::{Config, LogFormat, TtsProvider};
use voicify::infrastructure::http::{create_router, start_http_server};
use voicify::infrastructure::repositories::{
    GoogleTtsRepository, OpenAiTtsRepository, PollyTtsRepository, TtsRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting Voicify on {}:{}",
        config.host,
        config.port
    );

    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate the TTS provider
    tracing::info!(provider = ?config.tts_provider, "Instantiating TTS provider...");
    let tts_repo = build_tts_repository(&config).await?;

    // 2. Open the audio cache
    let cache = if config.tts_cache_enabled {
        match DiskAudioCache::open(&config.tts_cache_dir, config.max_cache_size_bytes()).await {
            Ok(cache) => Some(Arc::new(cache)),
            Err(e) => {
                tracing::warn!(
                    dir = %config.tts_cache_dir.display(),
                    error = %e,
                    "Audio cache unavailable, continuing without cache"
                );
                None
            }
        }
    } else {
        tracing::info!("Audio cache disabled");
        None
    };

    // 3. Instantiate services
    tracing::info!("Instantiating services...");
    let speed_adjuster: Arc<dyn SpeedAdjuster> = Arc::new(Mp3SpeedAdjuster::new());
    let tts_service = Arc::new(TtsService::new(
        tts_repo,
        speed_adjuster,
        cache,
        config.generation_settings(),
    ));
    let session = Arc::new(RwLock::new(SessionState::new()));

    // 4. Instantiate controllers (inject services)
    tracing::info!("Instantiating controllers...");
    let tts_controller = Arc::new(TtsController::new(tts_service.clone(), session.clone()));
    let session_controller = Arc::new(SessionController::new(session));

    // Start HTTP server with all routes
    let app = create_router(&config, tts_service, tts_controller, session_controller);
    start_http_server(config, app).await?;

    Ok(())
}

async fn build_tts_repository(config: &Config) -> anyhow::Result<Arc<dyn TtsRepository>> {
    let repo: Arc<dyn TtsRepository> = match config.tts_provider {
        TtsProvider::Google => {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(config.tts_synthesis_timeout_secs))
                .build()?;
            Arc::new(GoogleTtsRepository::new(client))
        }
        TtsProvider::Polly => {
            tracing::info!("Initializing AWS Polly client with region: {}", config.aws_region);

            // Check for AWS credentials in environment (for debugging)
            let has_access_key = std::env::var("AWS_ACCESS_KEY_ID").is_ok();
            let has_secret_key = std::env::var("AWS_SECRET_ACCESS_KEY").is_ok();
            if !has_access_key || !has_secret_key {
                tracing::warn!("AWS credentials not found in environment variables. Will attempt to use other credential providers (instance metadata, etc.)");
            }

            let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(config.aws_region.clone()))
                .load()
                .await;
            tracing::info!(region = ?aws_config.region(), "AWS configuration loaded");

            Arc::new(PollyTtsRepository::new(Arc::new(aws_sdk_polly::Client::new(&aws_config))))
        }
        TtsProvider::OpenAi => {
            let api_key = config
                .openai_api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY is required for the openai provider"))?;
            let client = async_openai::Client::with_config(
                async_openai::config::OpenAIConfig::new().with_api_key(api_key),
            );

            Arc::new(OpenAiTtsRepository::new(
                Arc::new(client),
                config.openai_tts_model.clone(),
                config.openai_tts_voice.clone(),
            ))
        }
    };

    tracing::info!(provider = repo.provider_name(), "TTS provider initialized");
    Ok(repo)
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "voicify=debug,tower_http=debug".into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
