/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! HTTP exposure of the endpoint registry.
//!
//! ```text
//! GET {base}                   discovery links for registered endpoints
//! GET {base}/{id}              full endpoint payload
//! GET {base}/{id}/{selector}   one entry of the payload
//! ```
//!
//! Endpoints are looked up per request, so an endpoint registered or removed
//! after the router is built is reflected immediately.

use crate::endpoint::EndpointRegistry;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use ironfix_core::error::{ActuatorError, FixError};
use serde_json::{Map, Value, json};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};

/// Default base path of the management routes.
pub const DEFAULT_BASE_PATH: &str = "/actuator";

#[derive(Clone)]
struct ActuatorState {
    registry: EndpointRegistry,
    base_path: Arc<str>,
}

struct ApiError(ActuatorError);

impl From<ActuatorError> for ApiError {
    fn from(err: ActuatorError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            ActuatorError::InvalidSelector(_) => StatusCode::BAD_REQUEST,
            ActuatorError::DuplicateEndpoint(_) => StatusCode::CONFLICT,
            ActuatorError::NotFound(_) | ActuatorError::UnknownEndpoint(_) => StatusCode::NOT_FOUND,
        };
        let body = json!({
            "status": status.as_u16(),
            "error": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

/// Builds the management router.
///
/// `base_path` is normalized to a leading slash and no trailing slash; an
/// empty path serves discovery at `/`.
#[must_use]
pub fn router(registry: EndpointRegistry, base_path: &str) -> Router {
    let base = normalize_base(base_path);
    let discovery = if base.is_empty() { "/" } else { base.as_str() };
    let state = ActuatorState {
        registry,
        base_path: Arc::from(base.as_str()),
    };
    Router::new()
        .route(discovery, get(discover))
        .route(&format!("{base}/{{id}}"), get(read_endpoint))
        .route(&format!("{base}/{{id}}/{{selector}}"), get(read_selector))
        .with_state(state)
}

/// Serves `router` on `bind` until `shutdown` resolves.
///
/// # Errors
/// Returns `FixError::Io` if the address cannot be bound or the server fails.
pub async fn serve(
    bind: &str,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), FixError> {
    let listener = TcpListener::bind(bind).await?;
    info!(bind = %listener.local_addr()?, "actuator listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("actuator shut down");
    Ok(())
}

fn normalize_base(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

fn link(href: String, templated: bool) -> Value {
    json!({ "href": href, "templated": templated })
}

async fn discover(State(state): State<ActuatorState>) -> Json<Value> {
    let base = &state.base_path;
    let mut links = Map::new();
    let self_href = if base.is_empty() { "/".to_string() } else { base.to_string() };
    links.insert("self".to_string(), link(self_href, false));
    for id in state.registry.ids() {
        links.insert(format!("{id}-selector"), link(format!("{base}/{id}/{{selector}}"), true));
        links.insert(id.clone(), link(format!("{base}/{id}"), false));
    }
    Json(json!({ "_links": links }))
}

async fn read_endpoint(
    State(state): State<ActuatorState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    debug!(endpoint = %id, "read");
    Ok(Json(state.registry.invoke(&id)?))
}

async fn read_selector(
    State(state): State<ActuatorState>,
    Path((id, selector)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    debug!(endpoint = %id, %selector, "read selector");
    let endpoint = state
        .registry
        .get(&id)
        .ok_or(ActuatorError::UnknownEndpoint(id))?;
    Ok(Json(endpoint.read_selector(&selector)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Endpoint;
    use crate::sessions::{SERVER_ENDPOINT_ID, SessionsEndpoint};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use ironfix_session::{SessionRegistry, SessionRole, SessionTable};
    use ironfix_settings::SessionSettings;
    use tower::ServiceExt;

    const SETTINGS: &str = "\
[DEFAULT]
SenderCompID=EXEC
TargetCompID=BANZAI

[SESSION]
BeginString=FIX.4.4
SocketAcceptPort=9876
";

    fn sessions_endpoint() -> (Arc<SessionRegistry>, Arc<dyn Endpoint>) {
        let settings: SessionSettings = SETTINGS.parse().unwrap();
        let registry = Arc::new(SessionRegistry::new(SessionRole::Acceptor));
        registry
            .initialize(settings.session_ids().cloned())
            .unwrap();
        let table: Arc<dyn SessionTable> = registry.clone();
        let endpoint = SessionsEndpoint::new(SERVER_ENDPOINT_ID, table, Arc::new(settings));
        (registry, Arc::new(endpoint))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_normalize_base() {
        assert_eq!(normalize_base("/actuator"), "/actuator");
        assert_eq!(normalize_base("manage/"), "/manage");
        assert_eq!(normalize_base("/"), "");
        assert_eq!(normalize_base(""), "");
    }

    #[tokio::test]
    async fn test_discovery_lists_registered_endpoints() {
        let registry = EndpointRegistry::new();
        let (_sessions, endpoint) = sessions_endpoint();
        let _registration = registry.register(endpoint).unwrap();

        let (status, body) = get_json(router(registry, DEFAULT_BASE_PATH), "/actuator").await;
        assert_eq!(status, StatusCode::OK);
        let links = &body["_links"];
        assert_eq!(links["self"]["href"], json!("/actuator"));
        assert_eq!(links["fixserver"]["href"], json!("/actuator/fixserver"));
        assert_eq!(links["fixserver-selector"]["templated"], json!(true));
        assert!(links.get("fixclient").is_none());
    }

    #[tokio::test]
    async fn test_read_sessions() {
        let registry = EndpointRegistry::new();
        let (sessions, endpoint) = sessions_endpoint();
        let _registration = registry.register(endpoint).unwrap();
        let app = router(registry, DEFAULT_BASE_PATH);

        let (status, body) = get_json(app.clone(), "/actuator/fixserver").await;
        assert_eq!(status, StatusCode::OK);
        let session = &body["FIX.4.4:EXEC->BANZAI"];
        assert_eq!(session["connected"], json!(false));
        assert_eq!(session["properties"]["SocketAcceptPort"], json!("9876"));

        let id = sessions.snapshot().unwrap()[0].id.clone();
        sessions.on_connect(&id).unwrap();
        let (status, body) =
            get_json(app, "/actuator/fixserver/FIX.4.4:EXEC-%3EBANZAI").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["connected"], json!(true));
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let registry = EndpointRegistry::new();
        let (_sessions, endpoint) = sessions_endpoint();
        let _registration = registry.register(endpoint).unwrap();
        let app = router(registry, DEFAULT_BASE_PATH);

        let (status, body) = get_json(app.clone(), "/actuator/fixclient").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], json!(404));

        let (status, _) = get_json(app.clone(), "/actuator/fixserver/FIX.4.2:EXEC-%3EBANZAI").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get_json(app, "/actuator/fixserver/garbage").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_deregistered_endpoint_disappears() {
        let registry = EndpointRegistry::new();
        let (_sessions, endpoint) = sessions_endpoint();
        let registration = registry.register(endpoint).unwrap();
        let app = router(registry, "/manage");

        let (status, _) = get_json(app.clone(), "/manage/fixserver").await;
        assert_eq!(status, StatusCode::OK);

        registration.deregister();
        let (status, _) = get_json(app.clone(), "/manage/fixserver").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, body) = get_json(app, "/manage").await;
        assert!(body["_links"].get("fixserver").is_none());
    }
}
