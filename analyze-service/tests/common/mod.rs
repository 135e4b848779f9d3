use analyze_service::config::{AnalyzeConfig, CorsConfig, ObservabilityConfig, OpenAiConfig};
use analyze_service::startup::Application;
use secrecy::Secret;
use service_core::config::Config as CoreConfig;

pub struct TestApp {
    pub address: String,
}

pub fn test_config(api_key: Option<&str>) -> AnalyzeConfig {
    AnalyzeConfig {
        common: CoreConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        openai: OpenAiConfig {
            api_key: api_key.map(|k| Secret::new(k.to_string())),
        },
        cors: CorsConfig {
            allowed_origins: Vec::new(),
        },
        observability: ObservabilityConfig {
            log_level: "info".to_string(),
            otlp_endpoint: None,
        },
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config(None)).await
    }

    pub async fn spawn_with(config: AnalyzeConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to accept connections
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address }
    }

    pub fn analyze_url(&self) -> String {
        format!("{}/api/analyze", self.address)
    }
}
