use crate::charts::ChartBoard;
use crate::config::Config;
use crate::gateway::Gateway;
use crate::storage::{ADMIN_FLAG_KEY, LocalStore};
use crate::visitor::Visitor;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: Gateway,
    pub store: LocalStore,
    pub charts: Arc<Mutex<ChartBoard>>,
}

impl AppState {
    pub fn new(config: Config, gateway: Gateway, store: LocalStore) -> Self {
        Self {
            config: Arc::new(config),
            gateway,
            store,
            charts: Arc::new(Mutex::new(ChartBoard::default())),
        }
    }

    pub async fn is_admin(&self, visitor: &Visitor) -> bool {
        self.store.is_set(visitor, ADMIN_FLAG_KEY).await
    }
}
