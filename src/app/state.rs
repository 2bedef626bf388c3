use std::sync::Arc;

use crate::{api::payments::PaymentGateway, app::config::AppConfig, store::Store};

/// Shared handles injected into every handler through `State`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub payments: Arc<dyn PaymentGateway>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        payments: Arc<dyn PaymentGateway>,
        config: AppConfig,
    ) -> Self {
        Self {
            store,
            payments,
            config: Arc::new(config),
        }
    }
}
