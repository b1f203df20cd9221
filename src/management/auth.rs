use std::path::{Path, PathBuf};

use crate::{
    config,
    error::{CacheError, Result},
    spotify::auth::Authorizer,
    types::{Credentials, TokenSet},
};

/// Keeps the token set between CLI invocations.
pub struct TokenManager {
    path: PathBuf,
}

impl TokenManager {
    pub fn new() -> Self {
        Self::at(Self::token_path())
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        TokenManager { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<TokenSet, CacheError> {
        let content = async_fs::read_to_string(&self.path).await?;
        let token: TokenSet = serde_json::from_str(&content)?;
        Ok(token)
    }

    pub async fn persist(&self, token: &TokenSet) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(token)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Refreshes the authorizer's token if it is about to expire and stores the
    /// replacement.
    pub async fn ensure_fresh(
        &self,
        authorizer: &mut Authorizer,
        credentials: &Credentials,
    ) -> Result<()> {
        let expired = authorizer.token().is_some_and(TokenSet::is_expired);
        if !expired {
            return Ok(());
        }

        tracing::debug!("cached token expired, refreshing");
        let token = authorizer.refresh(credentials).await?;
        self.persist(&token).await?;
        Ok(())
    }

    fn token_path() -> PathBuf {
        let mut path = config::data_dir();
        path.push("cache/token.json");
        path
    }
}

impl Default for TokenManager {
    fn default() -> Self {
        Self::new()
    }
}
