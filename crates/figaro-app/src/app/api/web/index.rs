use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Response, Router, handler};
use serde_json::json;

use figaro_service::auth::get_web_context_from_depot;

/// ## Summary
/// GET / - The signed-in user, their permissions and the current session id.
#[handler]
async fn index(res: &mut Response, depot: &Depot) {
    let context = match get_web_context_from_depot(depot) {
        Ok(context) => context,
        Err(e) => {
            tracing::error!(error = %e, "Index reached without a session");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    res.render(Json(json!({
        "user": context.identity.user,
        "permissions": context.identity.permissions,
        "session_id": context.session.id,
    })));
}

#[must_use]
pub fn routes() -> Router {
    Router::new().get(index)
}
