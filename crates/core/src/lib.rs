pub mod chart;
pub mod error;
pub mod market;
pub mod pipeline;
pub mod sarima;
pub mod series;
pub mod stats;

pub mod config {
    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub quote_base_url: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                quote_base_url: std::env::var("QUOTE_BASE_URL").ok(),
            })
        }
    }
}
