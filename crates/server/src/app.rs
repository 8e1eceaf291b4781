//! Demo application: a public page, a guarded page, and a decision endpoint.
//!
//! The demo guard function trusts `x-role` / `x-permissions` headers. A real
//! deployment supplies its own guard function backed by its session store.

use axum::{Json, Router, extract::Request, routing::get};
use rolegate_auth::User;
use serde_json::json;

use crate::context::GuardContext;
use crate::errors::IdentityError;
use crate::guard::{GuardOptions, build_guard};
use crate::middleware::protect;

pub const ROLE_HEADER: &str = "x-role";
pub const PERMISSIONS_HEADER: &str = "x-permissions";

fn header_value<'a>(
    ctx: &'a GuardContext,
    name: &'static str,
) -> Result<Option<&'a str>, IdentityError> {
    match ctx.headers().get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(Some)
            .map_err(|_| IdentityError::MalformedHeader(name)),
    }
}

/// Read the caller's identity from request headers.
///
/// `x-permissions` is comma-separated; blank entries are skipped. A header
/// that is present but not UTF-8 is an error, not an anonymous user.
pub fn user_from_headers(ctx: &GuardContext) -> Result<User, IdentityError> {
    let mut user = User::new();

    if let Some(role) = header_value(ctx, ROLE_HEADER)?
        .map(str::trim)
        .filter(|r| !r.is_empty())
    {
        user = user.with_role(role.to_string());
    }

    if let Some(raw) = header_value(ctx, PERMISSIONS_HEADER)? {
        user = user.with_permissions(
            raw.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
        );
    }

    Ok(user)
}

pub async fn header_guard_fn(ctx: GuardContext) -> Result<User, IdentityError> {
    user_from_headers(&ctx)
}

pub fn build_app(options: GuardOptions) -> Router {
    let guard = build_guard(header_guard_fn, options);

    let protected = protect(
        Router::new().route("/protected", get(protected_page)),
        guard.clone(),
    );

    Router::new()
        .route("/", get(home))
        .route(
            "/decision",
            get(move |req: Request| {
                let guard = guard.clone();
                async move { guard.handle(GuardContext::from_request(&req)).await }
            }),
        )
        .merge(protected)
}

async fn home() -> &'static str {
    "rolegate demo"
}

async fn protected_page() -> Json<serde_json::Value> {
    Json(json!({ "page": "protected" }))
}
