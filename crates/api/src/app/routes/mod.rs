use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post, MethodRouter},
    Router,
};

use coffeeshop_auth::Permission;

use crate::middleware::{require_permission, AuthState, ScopeGuard};

pub mod drinks;
pub mod system;

pub const GET_DRINKS_DETAIL: Permission = Permission::from_static("get:drinks-detail");
pub const POST_DRINKS: Permission = Permission::from_static("post:drinks");
pub const PATCH_DRINKS: Permission = Permission::from_static("patch:drinks");
pub const DELETE_DRINKS: Permission = Permission::from_static("delete:drinks");

/// Router for every endpoint; protected methods carry their own guard.
pub fn router(auth: &AuthState) -> Router {
    Router::new()
        .route("/", get(system::index))
        .route("/health", get(system::health))
        .route(
            "/drinks",
            get(drinks::list_drinks).merge(guarded(auth, POST_DRINKS, post(drinks::create_drink))),
        )
        .route(
            "/drinks-detail",
            guarded(auth, GET_DRINKS_DETAIL, get(drinks::list_drinks_detail)),
        )
        .route(
            "/drinks/:id",
            guarded(auth, PATCH_DRINKS, patch(drinks::update_drink))
                .merge(guarded(auth, DELETE_DRINKS, delete(drinks::delete_drink))),
        )
        .fallback(system::not_found)
}

fn guarded(auth: &AuthState, permission: Permission, route: MethodRouter) -> MethodRouter {
    let guard = ScopeGuard {
        auth: auth.clone(),
        permission,
    };
    route.route_layer(from_fn_with_state(guard, require_permission))
}
