use std::sync::Arc;

pub use figaro_core::config::*;
use figaro_core::error::CoreError;
use salvo::{Depot, FlowCtrl, Handler, Request, Response, async_trait};

use crate::error::AppResult;

/// Makes the loaded [`Settings`] available to every handler.
pub struct ConfigHandler {
    pub settings: Arc<Settings>,
}

impl ConfigHandler {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }
}

#[async_trait]
impl Handler for ConfigHandler {
    async fn handle(&self, _req: &mut Request, depot: &mut Depot, _res: &mut Response, _ctrl: &mut FlowCtrl) {
        depot.inject(Arc::clone(&self.settings));
    }
}

/// ## Errors
/// Fails when [`ConfigHandler`] is not on the route.
pub fn get_config_from_depot(depot: &Depot) -> AppResult<Arc<Settings>> {
    depot
        .obtain::<Arc<Settings>>()
        .cloned()
        .map_err(|_err| CoreError::MissingFromDepot("Settings").into())
}
