//! Worker Host operational HTTP surface (§10.4): liveness, readiness,
//! Prometheus metrics exposition, and a per-room translation-stats proxy.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

use crate::host::WorkerHost;

#[derive(Clone)]
pub struct AppState {
    pub host: Arc<WorkerHost>,
    pub metrics_handle: PrometheusHandle,
    pub persistence: Option<Arc<interlingo_persistence::PersistenceLayer>>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .route("/rooms/:room_id/translation-stats", get(translation_stats))
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

#[derive(Serialize)]
struct ReadinessBody {
    ready: bool,
    checks: serde_json::Value,
}

async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let mut checks = serde_json::Map::new();
    let mut ready = true;

    checks.insert(
        "profile_cache".to_string(),
        serde_json::json!({ "status": "ok", "active_rooms": state.host.active_room_count() }),
    );

    if let Some(persistence) = &state.persistence {
        let timeout = Duration::from_millis(500);
        let probe = tokio::time::timeout(timeout, persistence.rooms.fetch_room("__readiness_probe__")).await;
        // A `NotFound`-shaped `Ok(None)` still proves the connection is
        // live; only a timeout or a query error marks persistence down.
        let persistence_ok = matches!(probe, Ok(Ok(_)));
        checks.insert(
            "persistence".to_string(),
            serde_json::json!({ "status": if persistence_ok { "ok" } else { "unreachable" } }),
        );
        ready &= persistence_ok;
    } else {
        checks.insert("persistence".to_string(), serde_json::json!({ "status": "disabled" }));
    }

    let status = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(ReadinessBody { ready, checks: checks.into() }))
}

async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.metrics_handle.render()
}

async fn translation_stats(State(state): State<AppState>, Path(room_id): Path<String>) -> impl IntoResponse {
    match state.host.stats(&room_id).await {
        Ok(stats) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "room_id": stats.room_id,
                "participant_count": stats.participant_count,
                "active_pipeline_count": stats.active_pipeline_count,
                "suppressed_pair_count": stats.suppressed_pair_count,
            })),
        )
            .into_response(),
        Err(err) => (StatusCode::from(&err), Json(serde_json::json!({ "error": err.to_string() }))).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::WorkerHost;
    use axum::body::Body;
    use axum::http::Request;
    use interlingo_config::{BufferConfig, CoordinatorConfig};
    use interlingo_core::{Language, Result as CoreResult, SpeechToText, TextToSpeech, Translator, VoiceAvatar};
    use interlingo_coordinator::ProviderFactory;
    use tower::ServiceExt;

    struct DummyStt;
    #[async_trait::async_trait]
    impl SpeechToText for DummyStt {
        async fn open(
            &self,
            _source_language: Language,
            _options: &interlingo_core::SttOptions,
        ) -> CoreResult<(
            tokio::sync::mpsc::Sender<interlingo_core::AudioFrame>,
            std::pin::Pin<Box<dyn futures::Stream<Item = CoreResult<interlingo_core::SttResult>> + Send>>,
        )> {
            unreachable!("not exercised by these tests")
        }
        fn supported_languages(&self) -> &[Language] {
            &[]
        }
        fn provider_name(&self) -> &str {
            "dummy-stt"
        }
    }

    struct DummyTranslator;
    #[async_trait::async_trait]
    impl Translator for DummyTranslator {
        async fn translate(
            &self,
            text: &str,
            _source: Language,
            _target: Language,
            _preferences: interlingo_core::Preferences,
            _cancel: tokio_util::sync::CancellationToken,
        ) -> CoreResult<String> {
            Ok(text.to_string())
        }
        fn supports_pair(&self, _source: Language, _target: Language) -> bool {
            true
        }
        fn provider_name(&self) -> &str {
            "dummy-translator"
        }
    }

    struct DummyTts;
    #[async_trait::async_trait]
    impl TextToSpeech for DummyTts {
        async fn synthesize(
            &self,
            _text: &str,
            _voice: &VoiceAvatar,
            _sink: tokio::sync::mpsc::Sender<interlingo_core::AudioFrame>,
        ) -> CoreResult<interlingo_core::TtsHandle> {
            unreachable!("not exercised by these tests")
        }
        fn provider_name(&self) -> &str {
            "dummy-tts"
        }
    }

    struct DummyProviderFactory;
    impl ProviderFactory for DummyProviderFactory {
        fn build_stt(&self, _source_language: Language) -> Arc<dyn SpeechToText> {
            Arc::new(DummyStt)
        }
        fn build_translator(&self, _source_language: Language, _target_language: Language) -> Arc<dyn Translator> {
            Arc::new(DummyTranslator)
        }
        fn build_tts(&self, _voice: &VoiceAvatar) -> Arc<dyn TextToSpeech> {
            Arc::new(DummyTts)
        }
    }

    fn test_state() -> AppState {
        let host = Arc::new(WorkerHost::without_persistence(
            Arc::new(DummyProviderFactory),
            CoordinatorConfig::default(),
            BufferConfig::default(),
        ));
        let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
            .build_recorder()
            .handle();
        AppState { host, metrics_handle, persistence: None }
    }

    #[tokio::test]
    async fn health_check_reports_ok() {
        let app = create_router(test_state());
        let response =
            app.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_check_is_ready_with_persistence_disabled() {
        let app = create_router(test_state());
        let response = app.oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn translation_stats_for_unknown_room_is_not_found() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/rooms/ghost/translation-stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
