use axum::Router;

use crate::app::resource::crud_router;

pub mod auth;
pub mod categories;
pub mod customers;
pub mod products;
pub mod purchase_orders;
pub mod rbac;
pub mod suppliers;
pub mod system;
pub mod units;
pub mod users;

/// Router for every endpoint behind identity resolution.
pub fn router() -> Router {
    Router::new()
        .merge(auth::router())
        .nest("/users", users::router())
        .nest("/units", crud_router::<units::Units>())
        .nest("/categories", crud_router::<categories::Categories>())
        .nest("/products", crud_router::<products::Products>())
        .nest("/suppliers", crud_router::<suppliers::Suppliers>())
        .nest("/customers", crud_router::<customers::Customers>())
        .nest("/purchase-orders", crud_router::<purchase_orders::PurchaseOrders>())
        .nest("/rbac", rbac::router())
}
