use crate::backend::BackendClient;
use crate::cli::actions::Action;
use crate::store::{MemoryStore, TokenStore};
use crate::vigil::{self, GatewayConfig};
use anyhow::{Context, Result};
use std::sync::Arc;
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            backend_url,
            cookie_secure,
        } => {
            // Fail early on an unusable backend URL.
            let backend_url = Url::parse(&backend_url)
                .with_context(|| format!("Invalid backend URL: {backend_url}"))?;

            let config =
                GatewayConfig::new(backend_url.to_string()).with_cookie_secure(cookie_secure);

            let store: Arc<dyn TokenStore> = Arc::new(MemoryStore::new());
            let backend = Arc::new(BackendClient::new(config.backend_url(), store.clone())?);

            vigil::new(port, config, backend, store).await?;
        }
    }

    Ok(())
}
