use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::{Config, Result, ServerError};
use crate::live::OrderHub;
use crate::offers::{OfferEngine, OfferService};
use crate::orders::{OrdersManager, TransitionPolicy};
use crate::storage::Store;

/// Shared server state
///
/// Cheap to clone: every service holds `Arc`s internally.
///
/// | Field | Description |
/// |-------|-------------|
/// | config | Immutable configuration |
/// | store | redb storage for offers and orders |
/// | hub | Notification fan-out (`order:<id>`, `admin-dashboard`) |
/// | orders | Checkout and stage updates |
/// | offers | Offer administration |
/// | offer_engine | Coupon validation rules (preview endpoint) |
/// | jwt_service | Bearer token validation |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: Store,
    pub hub: OrderHub,
    pub orders: OrdersManager,
    pub offers: OfferService,
    pub offer_engine: OfferEngine,
    pub jwt_service: Arc<JwtService>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("offer_engine", &self.offer_engine)
            .finish_non_exhaustive()
    }
}

impl ServerState {
    /// Wire services around an already-open store
    pub fn new(config: Config, store: Store) -> Self {
        let hub = OrderHub::new();
        let offer_engine = OfferEngine::new(config.admin_guest_coupon_bypass);
        let policy = TransitionPolicy {
            strict_stepping: config.strict_stage_stepping,
        };
        let orders = OrdersManager::new(store.clone(), hub.clone(), offer_engine, policy);
        let offers = OfferService::new(store.clone());
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Self {
            config,
            store,
            hub,
            orders,
            offers,
            offer_engine,
            jwt_service,
        }
    }

    /// Validate config, create the work dir and open the database
    pub fn initialize(config: &Config) -> Result<Self> {
        config.validate().map_err(ServerError::Config)?;

        std::fs::create_dir_all(&config.work_dir)?;
        let db_path = config.database_path();
        let store = Store::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "Database opened");

        Ok(Self::new(config.clone(), store))
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }
}
