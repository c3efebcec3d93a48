/// Bearer-token authentication layer
///
/// Runs before every task handler. The `Authorization: Bearer <token>` header
/// is verified by the credential service; on success the caller's
/// [`AuthContext`] goes into the request extensions, on failure the request
/// is answered with 401 and the handler (and its body extractor) never runs.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use todolist_shared::auth::middleware::{bearer_token, AuthContext};

use crate::{app::AppState, error::ApiError};

pub async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth: AuthContext = state.credentials.verify(bearer_token(req.headers()))?;

    tracing::debug!(account_id = auth.account_id, "Authenticated request");
    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
