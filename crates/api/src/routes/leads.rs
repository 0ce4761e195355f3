use axum::routing::get;
use axum::Router;

use crate::handlers::leads;
use crate::state::AppState;

/// Routes mounted at `/crm/leads`.
///
/// ```text
/// GET    /       -> list_leads (leads.read)
/// POST   /       -> create_lead (leads.write)
/// GET    /{id}   -> get_lead (leads.read)
/// PUT    /{id}   -> update_lead (leads.write)
/// DELETE /{id}   -> delete_lead (leads.write)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(leads::list_leads).post(leads::create_lead))
        .route(
            "/{id}",
            get(leads::get_lead)
                .put(leads::update_lead)
                .delete(leads::delete_lead),
        )
}
