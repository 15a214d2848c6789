//! Session termination.

use super::{append_cookie, clear_cookie};
use crate::backend::BackendClient;
use crate::gate::{self, LOGIN_STATUS_COOKIE, SESSION_COOKIE, TOKEN_COOKIE, USER_ID_COOKIE};
use crate::store::{TokenStore, ACCESS_TOKEN_KEY};
use crate::vigil::GatewayConfig;
use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::error;

/// `GET /auth/logout`. Backend logout is best effort; the local credential
/// and the whole cookie set are always cleared.
pub async fn logout(
    config: Extension<Arc<GatewayConfig>>,
    backend: Extension<Arc<BackendClient>>,
    store: Extension<Arc<dyn TokenStore>>,
) -> Response {
    if let Err(err) = backend.logout().await {
        error!("Backend logout failed: {err}");
    }

    store.remove(ACCESS_TOKEN_KEY);

    let secure = config.cookie_secure();
    let mut headers = HeaderMap::new();
    for name in [TOKEN_COOKIE, LOGIN_STATUS_COOKIE, USER_ID_COOKIE, SESSION_COOKIE] {
        append_cookie(&mut headers, clear_cookie(name, secure));
    }

    (headers, Redirect::temporary(gate::LOGIN_PATH)).into_response()
}
