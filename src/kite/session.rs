//! Session handling from environment variables

use super::{KiteClient, KiteCredentials};
use crate::config::KiteConfig;
use crate::provider::{ProviderError, ProviderResult, SessionProvider};
use async_trait::async_trait;
use std::sync::Arc;

/// Reads the API key and access token from the environment before each cycle
///
/// The token is re-read every time so a refreshed token is picked up without
/// a restart.
pub struct EnvSession {
    client: Arc<KiteClient>,
    api_key_env: String,
    access_token_env: String,
}

impl EnvSession {
    pub fn new(client: Arc<KiteClient>, config: &KiteConfig) -> Self {
        Self {
            client,
            api_key_env: config.api_key_env.clone(),
            access_token_env: config.access_token_env.clone(),
        }
    }

    fn read_var(name: &str) -> ProviderResult<String> {
        match std::env::var(name) {
            Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => Err(ProviderError::Unauthenticated(format!("{name} is not set"))),
        }
    }

    pub fn credentials(&self) -> ProviderResult<KiteCredentials> {
        Ok(KiteCredentials {
            api_key: Self::read_var(&self.api_key_env)?,
            access_token: Self::read_var(&self.access_token_env)?,
        })
    }
}

#[async_trait]
impl SessionProvider for EnvSession {
    async fn ensure_session(&self) -> ProviderResult<()> {
        let credentials = self.credentials()?;
        self.client.set_credentials(credentials).await;
        Ok(())
    }
}
