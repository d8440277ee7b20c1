// handlers/mod.rs - function registry
//
// Public (no session or optional session) → Elevated (admin / moderator role)
//
// Each function takes a platform event and returns a complete response with
// CORS headers; the axum server and the tests call them the same way.

pub mod elevated;
pub mod public;
pub mod utils;

use std::future::Future;
use tracing::Instrument;
use uuid::Uuid;

use crate::api::{ApiResult, Cors, Event, FunctionResponse};
use crate::database::Store;

/// One independently deployable handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Auth,
    AdminUsers,
    AdminTournaments,
    ChessApi,
    GetTournaments,
}

impl Function {
    pub const ALL: [Function; 5] = [
        Function::Auth,
        Function::AdminUsers,
        Function::AdminTournaments,
        Function::ChessApi,
        Function::GetTournaments,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Function::Auth => "auth",
            Function::AdminUsers => "admin-users",
            Function::AdminTournaments => "admin-tournaments",
            Function::ChessApi => "chess-api",
            Function::GetTournaments => "get-tournaments",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.slug() == slug)
    }

    pub async fn handle(self, store: &dyn Store, event: Event) -> FunctionResponse {
        match self {
            Function::Auth => public::auth::handle(store, event).await,
            Function::AdminUsers => elevated::admin::users::handle(store, event).await,
            Function::AdminTournaments => elevated::admin::tournaments::handle(store, event).await,
            Function::ChessApi => public::chess::handle(store, event).await,
            Function::GetTournaments => public::tournaments::handle(store, event).await,
        }
    }
}

/// Shared invocation wrapper: answers preflight without touching the store,
/// otherwise runs `dispatch` inside a span and renders the result.
pub(crate) async fn invoke<F>(function: &'static str, cors: Cors, event: &Event, dispatch: F) -> FunctionResponse
where
    F: Future<Output = ApiResult>,
{
    if event.is_preflight() {
        return cors.preflight();
    }

    let request_id = event
        .request_id()
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let span = tracing::info_span!("function", function, method = %event.method(), request_id = %request_id);

    let result = dispatch.instrument(span.clone()).await;
    match &result {
        Ok(response) => tracing::info!(parent: &span, status = response.status_code.as_u16(), "handled"),
        Err(err) if err.status_code() >= 500 => {
            tracing::error!(parent: &span, status = err.status_code(), "failed: {}", err.message())
        }
        Err(err) => tracing::info!(parent: &span, status = err.status_code(), "rejected: {}", err.message()),
    }

    cors.respond(result)
}
