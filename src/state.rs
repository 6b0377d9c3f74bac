// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::{
    config::{Config, QuestionSpec, load_catalog},
    drafts::DraftStore,
    error::AppError,
    utils::{
        hash::hash_password,
        qr::{ArtifactGenerator, SvgQrGenerator},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub catalog: Arc<Vec<QuestionSpec>>,
    pub drafts: Arc<DraftStore>,
    pub artifacts: Arc<dyn ArtifactGenerator>,
    /// Argon2 hash of the admin password.
    pub admin_password_hash: Arc<String>,
}

impl AppState {
    /// Builds the state with the catalog file and QR directory named in
    /// `config`.
    pub fn new(pool: SqlitePool, config: Config) -> Result<Self, AppError> {
        let catalog = load_catalog(&config.questions_path);
        let artifacts = Arc::new(SvgQrGenerator::new(config.qr_code_dir.clone()));
        Self::with_parts(pool, config, catalog, artifacts)
    }

    pub fn with_parts(
        pool: SqlitePool,
        config: Config,
        catalog: Vec<QuestionSpec>,
        artifacts: Arc<dyn ArtifactGenerator>,
    ) -> Result<Self, AppError> {
        let admin_password_hash = hash_password(&config.admin_password)?;
        let drafts = DraftStore::new(config.jwt_expiration);

        Ok(Self {
            pool,
            config,
            catalog: Arc::new(catalog),
            drafts: Arc::new(drafts),
            artifacts,
            admin_password_hash: Arc::new(admin_password_hash),
        })
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<DraftStore> {
    fn from_ref(state: &AppState) -> Self {
        state.drafts.clone()
    }
}
