//! Placeholder translation endpoint.
//!
//! `POST /api/translation` echoes a templated string; every other verb gets
//! `405`. None of the pipeline stages call it unless the translation provider
//! is configured as `Http`.

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use crate::error::Result;
use crate::translate::http::{TranslationRequest, TranslationResponse};

pub fn router() -> Router {
    Router::new().route(
        "/api/translation",
        post(translate).fallback(method_not_allowed),
    )
}

async fn translate(Json(request): Json<TranslationRequest>) -> Json<TranslationResponse> {
    Json(TranslationResponse {
        translated_text: format!(
            "Translated \"{}\" to {}",
            request.text, request.target_language
        ),
    })
}

async fn method_not_allowed() -> (StatusCode, Json<Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
}

/// Bind `addr` and serve until the process exits.
pub async fn serve(addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_on(listener).await
}

pub async fn serve_on(listener: TcpListener) -> Result<()> {
    info!("Translation endpoint listening on {}", listener.local_addr()?);
    axum::serve(listener, router()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TranslateConfig, TranslationProvider};
    use crate::translate::{HttpTranslator, Translator};

    async fn spawn_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve_on(listener));
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_post_echoes_templated_string() {
        let base = spawn_server().await;
        let response = reqwest::Client::new()
            .post(format!("{}/api/translation", base))
            .json(&json!({ "text": "Hello there", "targetLanguage": "fr" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["translatedText"], "Translated \"Hello there\" to fr");
    }

    #[tokio::test]
    async fn test_other_verbs_are_rejected() {
        let base = spawn_server().await;
        let client = reqwest::Client::new();
        let url = format!("{}/api/translation", base);

        let response = client.get(&url).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 405);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Method not allowed");

        let response = client.put(&url).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 405);
    }

    #[tokio::test]
    async fn test_http_translator_round_trips_through_endpoint() {
        let base = spawn_server().await;
        let config = TranslateConfig {
            provider: TranslationProvider::Http,
            endpoint: format!("{}/", base),
            timeout_secs: 5,
        };

        let translator = HttpTranslator::new(&config).unwrap();
        let out = translator.translate("Good morning", "ja").await.unwrap();
        assert_eq!(out, "Translated \"Good morning\" to ja");
    }
}
