use std::sync::Arc;

use sea_orm::DatabaseConnection;
use service::ai::repo::{SeaOrmActionStore, SeaOrmActionTarget};
use service::ai::ActionDrafts;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::AuthConfig;
use service::auth::AuthService;
use service::currency::{CurrencyApiClient, CurrencyConverter, ExchangeRateCache, RateProvider};

use crate::errors::StartupError;

pub type Drafts = ActionDrafts<SeaOrmActionStore, SeaOrmActionTarget>;

/// Shared handles for every request.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: Arc<str>,
    pub auth: Arc<AuthService<SeaOrmAuthRepository>>,
    pub converter: Arc<CurrencyConverter>,
    pub drafts: Arc<Drafts>,
    /// Whether an exchange-rate API key is present.
    pub rates_configured: bool,
}

impl AppState {
    /// Wire services from the loaded configuration against the real rate API.
    pub fn from_config(
        db: DatabaseConnection,
        cfg: &configs::AppConfig,
    ) -> Result<Self, StartupError> {
        if cfg.auth.jwt_secret.trim().is_empty() {
            return Err(StartupError::InvalidConfig("auth.jwt_secret must be set".into()));
        }
        let client = CurrencyApiClient::from_config(&cfg.currency)?;
        let configured = client.has_key();
        let cache = Arc::new(ExchangeRateCache::from_config(&cfg.currency));
        Ok(Self::with_provider(db, cfg, cache, Arc::new(client), configured))
    }

    /// Same wiring with a caller-supplied rate provider.
    pub fn with_provider(
        db: DatabaseConnection,
        cfg: &configs::AppConfig,
        cache: Arc<ExchangeRateCache>,
        provider: Arc<dyn RateProvider>,
        rates_configured: bool,
    ) -> Self {
        let auth_repo = Arc::new(SeaOrmAuthRepository { db: db.clone() });
        let auth = AuthService::new(auth_repo, AuthConfig::from_settings(&cfg.auth));
        let drafts = ActionDrafts::new(
            Arc::new(SeaOrmActionStore { db: db.clone() }),
            Arc::new(SeaOrmActionTarget { db: db.clone() }),
        );
        Self {
            db,
            jwt_secret: Arc::from(cfg.auth.jwt_secret.as_str()),
            auth: Arc::new(auth),
            converter: Arc::new(CurrencyConverter::new(cache, provider)),
            drafts: Arc::new(drafts),
            rates_configured,
        }
    }
}
