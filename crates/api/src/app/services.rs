//! Service wiring: picks a store backend and builds the shared services.

use std::sync::Arc;

use tracing::{info, warn};

use taskflow_auth::{AccountService, AuthGate, PasswordHasher, TokenService, UserStore};
use taskflow_infra::{
    InMemoryProjectStore, InMemoryUserStore, PostgresProjectStore, PostgresUserStore, Settings,
    postgres,
};
use taskflow_projects::{ProjectService, ProjectStore};

/// Everything a handler may reach for.
pub struct AppServices {
    pub accounts: AccountService,
    pub projects: ProjectService,
    pub gate: AuthGate,
}

impl AppServices {
    pub fn new(
        users: Arc<dyn UserStore>,
        projects: Arc<dyn ProjectStore>,
        settings: &Settings,
    ) -> anyhow::Result<Self> {
        let tokens = Arc::new(TokenService::new(&settings.token_settings())?);
        let hasher = PasswordHasher::new(settings.password)?;

        Ok(Self {
            accounts: AccountService::new(users, hasher, tokens.clone())?,
            projects: ProjectService::new(projects),
            gate: AuthGate::new(tokens),
        })
    }
}

pub async fn build_services(settings: &Settings) -> anyhow::Result<AppServices> {
    match settings.database.url.as_deref() {
        Some(url) => {
            let pool = postgres::connect(&settings.database, url).await?;
            info!("using postgres store");
            AppServices::new(
                Arc::new(PostgresUserStore::new(pool.clone())),
                Arc::new(PostgresProjectStore::new(pool)),
                settings,
            )
        }
        None => {
            warn!("database.url is not set; data lives in memory and is lost on exit");
            AppServices::new(
                Arc::new(InMemoryUserStore::new()),
                Arc::new(InMemoryProjectStore::new()),
                settings,
            )
        }
    }
}
