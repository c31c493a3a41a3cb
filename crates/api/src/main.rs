use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockcast_core::error::ForecastError;
use stockcast_core::market::{QuoteProvider, YahooChartClient};
use stockcast_core::pipeline::{self, ForecastParams};

mod render;

const COMPANIES: &[&str] = &[
    "AAPL", "MSFT", "GOOG", "GOOGL", "META", "TSLA", "NVDA", "ADBE", "PYPL", "INTC", "CMCSA",
    "NFLX", "PEP",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stockcast_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let provider: Arc<dyn QuoteProvider> = Arc::new(YahooChartClient::from_settings(&settings)?);
    let state = AppState { provider };

    let app = Router::new()
        .route("/", get(index).post(index))
        .route("/forecast", post(forecast))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "stockcast listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[derive(Clone)]
struct AppState {
    provider: Arc<dyn QuoteProvider>,
}

async fn index() -> Html<String> {
    Html(render::index_page(COMPANIES))
}

#[derive(Debug, Deserialize)]
struct ForecastRequest {
    ticker: String,
    start: NaiveDate,
    end: NaiveDate,
    column: String,
    forecast_days: usize,
    p: usize,
    d: usize,
    q: usize,
    seasonal_p: usize,
}

async fn forecast(
    State(state): State<AppState>,
    Form(form): Form<ForecastRequest>,
) -> Response {
    let params = ForecastParams {
        ticker: form.ticker,
        start: form.start,
        end: form.end,
        column: form.column,
        forecast_days: form.forecast_days,
        p: form.p,
        d: form.d,
        q: form.q,
        seasonal_p: form.seasonal_p,
    };

    match pipeline::run(state.provider.as_ref(), &params).await {
        Ok(report) => Html(render::result_page(&report)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: anyhow::Error) -> Response {
    match err.downcast_ref::<ForecastError>() {
        // Legacy contract: a missing column answers 200 with the bare
        // message as the whole body.
        Some(domain @ ForecastError::ColumnNotFound(_)) => domain.to_string().into_response(),
        // Bad inputs or not enough data: the client can fix these.
        Some(domain @ (ForecastError::TooShort { .. } | ForecastError::InvalidOrder(_))) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(render::error_page(&domain.to_string())),
        )
            .into_response(),
        _ => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "forecast request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render::error_page(&format!("{err:#}"))),
            )
                .into_response()
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &stockcast_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_answers_200_with_the_bare_message() {
        let err = anyhow::Error::new(ForecastError::ColumnNotFound("Foo".to_string()));
        let response = error_response(err);
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn domain_errors_are_unprocessable() {
        let err = anyhow::Error::new(ForecastError::TooShort { needed: 24, got: 3 });
        let response = error_response(err);
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn transport_errors_are_internal() {
        let err = anyhow::anyhow!("connection refused");
        let response = error_response(err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
