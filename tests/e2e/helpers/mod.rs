use std::path::Path;
use std::sync::Arc;
use parking_lot::RwLock;
use tempfile::TempDir;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;
use voicify::controllers::{session::SessionController, tts::TtsController};
use voicify::domain::session::SessionState;
use voicify::domain::tts::TtsService;
use voicify::infrastructure::audio::Mp3SpeedAdjuster;
use voicify::infrastructure::cache::DiskAudioCache;
use voicify::infrastructure::config::Config;
use voicify::infrastructure::http::create_router;

pub mod api_client;
pub mod tts_mocks;

use api_client::TestClient;
use tts_mocks::MockTtsRepository;

pub struct TestContext {
    pub client: TestClient,
    #[allow(dead_code)]
    pub config: Config,
    pub tts_repo: Arc<MockTtsRepository>,
    cache_dir: TempDir,
}

impl TestContext {
    #[allow(dead_code)]
    pub fn cache_dir(&self) -> &Path {
        self.cache_dir.path()
    }

    #[allow(dead_code)]
    pub fn cached_files(&self) -> usize {
        std::fs::read_dir(self.cache_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let cache_dir = tempfile::tempdir().expect("Failed to create cache dir");

            // Create test configuration: defaults plus an isolated cache
            let cache_path = cache_dir.path().to_string_lossy().into_owned();
            let config = Config::from_source(|name| match name {
                "HOST" => Some("127.0.0.1".to_string()),
                "PORT" => Some("0".to_string()), // Will be assigned by the OS
                "TTS_CACHE_DIR" => Some(cache_path.clone()),
                _ => None,
            })
            .expect("Failed to build test config");

            let tts_repo = Arc::new(MockTtsRepository::default());
            let cache = DiskAudioCache::open(&config.tts_cache_dir, config.max_cache_size_bytes())
                .await
                .expect("Failed to open cache");

            let tts_service = Arc::new(TtsService::new(
                tts_repo.clone(),
                Arc::new(Mp3SpeedAdjuster::new()),
                Some(Arc::new(cache)),
                config.generation_settings(),
            ));
            let session = Arc::new(RwLock::new(SessionState::new()));
            let tts_controller = Arc::new(TtsController::new(tts_service.clone(), session.clone()));
            let session_controller = Arc::new(SessionController::new(session));

            let app = create_router(&config, tts_service, tts_controller, session_controller);

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            Self {
                client: TestClient::new(&base_url),
                config,
                tts_repo,
                cache_dir,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // Cache directory is removed when the TempDir drops
        }
    }
}
