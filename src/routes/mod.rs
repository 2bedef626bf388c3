use utoipa_axum::router::OpenApiRouter;

use crate::app::state::AppState;

pub mod addresses;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod feedback;
pub mod orders;
pub mod payments;
pub mod reference;
pub mod refunds;
pub mod saved;
pub mod users;

/// Every route of the service, with its OpenAPI description.
pub fn router() -> OpenApiRouter<AppState> {
    catalog::routes_with_openapi()
        .merge(reference::routes_with_openapi())
        .merge(feedback::routes_with_openapi())
        .merge(cart::routes_with_openapi())
        .merge(orders::routes_with_openapi())
        .merge(checkout::routes_with_openapi())
        .merge(addresses::routes_with_openapi())
        .merge(saved::routes_with_openapi())
        .merge(refunds::routes_with_openapi())
        .merge(payments::routes_with_openapi())
        .merge(users::routes_with_openapi())
}
