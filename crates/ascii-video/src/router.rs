//! Request routing: health check, redirects, and animation streams.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, instrument};

use ascii_video_core::{Animation, ServerConfig, StreamParams};
use ascii_video_store::{placeholder, AnimationRegistry, Resolved};

use crate::classifier::is_terminal_client;
use crate::http::{Request, Response};

/// Shared, read-only state for request handling.
pub struct AppState {
    registry: Arc<AnimationRegistry>,
    default_animation: String,
    redirect_url: String,
    defaults: StreamParams,
}

impl AppState {
    /// Build state from configuration and a populated registry.
    pub fn new(registry: Arc<AnimationRegistry>, config: &ServerConfig) -> Self {
        Self {
            registry,
            default_animation: config.server.default_animation.clone(),
            redirect_url: config.server.redirect_url.clone(),
            defaults: config.stream_defaults(),
        }
    }
}

/// What to do with a request.
#[derive(Debug)]
pub enum Action {
    /// Send a complete response and close
    Respond(Response),
    /// Send the stream head and play the animation until disconnect
    Stream {
        /// Animation to play
        animation: Arc<Animation>,
        /// Clamped timing parameters
        params: StreamParams,
    },
}

/// Fixed health payload.
pub fn health_response() -> Response {
    Response::json(
        200,
        &json!({ "status": "healthy", "message": "🐦 Parrot server is flying!" }),
    )
}

/// Animation name addressed by `path`: `None` for the root, `Some(Err)` for
/// paths with more than one segment.
fn animation_name(path: &str) -> Option<Result<&str, ()>> {
    let trimmed = path.trim_start_matches('/');
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() {
        None
    } else if trimmed.contains('/') {
        Some(Err(()))
    } else {
        Some(Ok(trimmed))
    }
}

/// Decide how to answer `request`.
#[instrument(skip_all, fields(method = %request.method, path = %request.path))]
pub async fn route(request: &Request, state: &AppState) -> Action {
    if request.method != "GET" {
        return Action::Respond(
            Response::text(405, "Method Not Allowed\n").with_header("Allow", "GET"),
        );
    }

    if request.path == "/health" {
        return Action::Respond(health_response());
    }

    let (name, is_default) = match animation_name(&request.path) {
        None => (state.default_animation.clone(), true),
        Some(Ok(name)) => (name.to_string(), false),
        Some(Err(())) => return Action::Respond(Response::text(404, "Not Found\n")),
    };

    if !is_terminal_client(request.user_agent()) {
        debug!(user_agent = ?request.user_agent(), "Redirecting non-terminal client");
        return Action::Respond(Response::redirect(&state.redirect_url));
    }

    let params = StreamParams::from_query(
        request.query_param("interval"),
        request.query_param("stride"),
        &state.defaults,
    );

    // First use of a name reads its frames from disk.
    let registry = Arc::clone(&state.registry);
    let lookup = name.clone();
    let resolved = match tokio::task::spawn_blocking(move || registry.resolve(&lookup)).await {
        Ok(resolved) => resolved,
        Err(e) => {
            error!(animation = %name, error = %e, "Animation lookup failed");
            return Action::Respond(Response::text(500, "Internal Server Error\n"));
        }
    };

    let animation = match resolved {
        Resolved::Found(animation) => animation,
        // A missing default is an empty load, not an unknown name.
        Resolved::Unknown(_) if is_default => {
            debug!(animation = %name, "Default animation has no frames");
            Arc::new(placeholder(&name))
        }
        Resolved::Unknown(notice) => {
            debug!(animation = %name, "Serving unknown-animation notice");
            notice
        }
    };

    Action::Stream { animation, params }
}
