use std::sync::Arc;

use figaro_core::error::CoreError;
use figaro_service::services::Services;
use salvo::async_trait;

use crate::error::AppResult;

/// Hands the shared service graph to every request.
pub struct ServicesHandler {
    pub services: Arc<Services>,
}

#[async_trait]
impl salvo::Handler for ServicesHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.services));
    }
}

/// ## Summary
/// Retrieves the service graph from the depot.
///
/// ## Errors
/// Returns an error if the services were not injected.
pub fn get_services_from_depot(depot: &salvo::Depot) -> AppResult<Arc<Services>> {
    depot
        .obtain::<Arc<Services>>()
        .cloned()
        .map_err(|_err| CoreError::MissingFromDepot("Services").into())
}
