use salvo::Depot;
use salvo::writing::Redirect;

use figaro_core::constants::PERMISSION_DENIED_FLASH;
use figaro_service::auth::{get_identity_from_depot, has_access};

/// ## Summary
/// Capability gate for browser routes; runs after `SessionMiddleware`.
///
/// A denied request is redirected to `/` with a flash message.
pub struct RequirePermission(pub &'static str);

#[salvo::async_trait]
impl salvo::Handler for RequirePermission {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        capability = self.0,
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        if has_access(get_identity_from_depot(depot), self.0) {
            return;
        }

        tracing::info!("Capability missing, request denied");
        res.render(Redirect::found(denied_location()));
        ctrl.skip_rest();
    }
}

fn denied_location() -> String {
    format!("/?flash={}", urlencoding::encode(PERMISSION_DENIED_FLASH))
}
