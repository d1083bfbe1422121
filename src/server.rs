use anyhow::Error;
use axum::{extract::State, http::StatusCode, routing::post, Router};
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::lights::{CommandPayload, LightController};
use crate::pins::PinBank;

/// The controller behind one async mutex, so dispatches run one at a time.
pub type SharedController<B> = Arc<Mutex<LightController<B>>>;

/// Builds the router. The whole wire surface is one route: POST a JSON
/// object mapping LED names to command tags.
pub fn router<B: PinBank + 'static>(controller: SharedController<B>) -> Router {
    Router::new()
        .route("/", post(handle_command::<B>))
        .with_state(controller)
}

/// Decodes the body as a command payload and applies it. A body that is not
/// valid JSON gets a 400 instead of taking the handler down with it.
async fn handle_command<B: PinBank + 'static>(
    State(controller): State<SharedController<B>>,
    body: String,
) -> StatusCode {
    let payload: CommandPayload = match serde_json::from_str(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Rejecting malformed payload: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };

    info!("Received: {}", body.trim());
    controller.lock().await.dispatch(&payload).await;
    StatusCode::OK
}

/// Binds the listener and serves until the process exits.
pub async fn serve<B: PinBank + 'static>(
    config: &Config,
    controller: SharedController<B>,
) -> Result<(), Error> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    axum::serve(listener, router(controller)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::{Level, MemoryBank};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn test_router() -> (Router, MemoryBank) {
        let bank = MemoryBank::new();
        let controller = LightController::init(&Config::default(), bank.clone())
            .await
            .unwrap();
        (router(Arc::new(Mutex::new(controller))), bank)
    }

    fn command_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_payload_returns_ok() {
        let (router, bank) = test_router().await;
        let response = router
            .oneshot(command_request(
                r#"{"green": "TurnOn", "purple": "TurnOff"}"#,
            ))
            .await
            .unwrap();

        // The unknown LED is ignored, not an error
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(bank.level(1), Level::High);
    }

    #[tokio::test]
    async fn test_empty_object_is_a_no_op() {
        let (router, bank) = test_router().await;
        let response = router.oneshot(command_request("{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        for pin in 0..4 {
            assert_eq!(bank.level(pin), Level::Low);
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected_and_server_survives() {
        let (router, bank) = test_router().await;

        let response = router
            .clone()
            .oneshot(command_request("{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // The listener still answers the next request
        let response = router
            .oneshot(command_request(r#"{"red": "TurnOn"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(bank.level(2), Level::High);
    }

    #[tokio::test]
    async fn test_other_paths_and_methods_are_not_commands() {
        let (router, _bank) = test_router().await;

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/lights")
                    .body(Body::from(r#"{"red": "TurnOn"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
