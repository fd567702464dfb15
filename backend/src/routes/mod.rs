//! Route definitions for the Inventory Management System

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (login and refresh are public)
        .nest("/auth", auth_routes(state.clone()))
        // Protected routes
        .merge(protected_routes(state))
}

/// Authentication routes
fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/logout", post(handlers::logout))
        .route("/change-password", post(handlers::change_password))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .merge(protected)
}

/// Everything behind a bearer token
fn protected_routes(state: AppState) -> Router<AppState> {
    let upload_limit = state.config.storage.max_upload_bytes;

    Router::new()
        .route("/dashboard", get(handlers::get_dashboard))
        .nest("/products", product_routes(upload_limit))
        .nest("/categories", category_routes())
        .nest("/suppliers", supplier_routes())
        .route("/stock-levels/report", get(handlers::stock_report))
        .nest("/admin", admin_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Product management routes
fn product_routes(upload_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route("/filter", get(handlers::filter_products))
        .route("/low-stock", get(handlers::low_stock_products))
        .route("/out-of-stock", get(handlers::out_of_stock_products))
        .route("/stock", post(handlers::update_stock))
        .route("/report", get(handlers::removal_report))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/:product_id/stock-levels", get(handlers::product_stock_levels))
        .route(
            "/:product_id/image",
            // Room for the multipart framing around the file
            post(handlers::upload_image).layer(DefaultBodyLimit::max(upload_limit + 64 * 1024)),
        )
}

/// Category management routes
fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_categories).post(handlers::create_category))
        .route(
            "/:category_id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
}

/// Supplier management routes
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_suppliers).post(handlers::create_supplier))
        .route("/report", get(handlers::supplier_report))
        .route(
            "/:supplier_id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
}

/// Role and user administration routes
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/roles", get(handlers::list_roles).post(handlers::create_role))
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route("/users/:user_id", delete(handlers::delete_user))
        .route(
            "/users/:user_id/roles",
            get(handlers::get_user_roles).put(handlers::update_user_roles),
        )
}
