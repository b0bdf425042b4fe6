use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    auth::{login, refresh},
    product::{
        create_product, delete_product, get_product_by_id, get_products, update_product,
    },
    user::{
        delete_user, get_me, get_roles, get_user_by_id, get_users, register_user, update_user,
    },
};
use crate::health::{healthz, readyz};
use crate::state::AppState;
use crate::telemetry::request_id_layer;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Auth
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/me", get(get_me))
        // Users
        .route("/users/roles", get(get_roles))
        .route("/users", get(get_users))
        .route("/users/register", post(register_user))
        .route(
            "/users/{id}",
            get(get_user_by_id).put(update_user).patch(update_user),
        )
        .route("/users/{id}", delete(delete_user))
        // Products
        .route("/products", get(get_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product_by_id)
                .put(update_product)
                .patch(update_product),
        )
        .route("/products/{id}", delete(delete_product))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
