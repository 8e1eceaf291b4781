//! axum adapter for [`Guard`].
//!
//! Redirect decisions short-circuit with `307 Temporary Redirect`; continue
//! decisions run the inner route. Guard-function errors become responses
//! through the error type's own `IntoResponse`. A destination that cannot be
//! sent as a `Location` header is answered with a 500.

use std::future::Future;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{Next, from_fn_with_state},
    response::{IntoResponse, Response},
};
use rolegate_auth::User;

use crate::context::GuardContext;
use crate::errors::json_error;
use crate::guard::{Guard, GuardDecision};

impl IntoResponse for GuardDecision {
    fn into_response(self) -> Response {
        match self {
            GuardDecision::Redirect(redirect) => {
                match HeaderValue::try_from(redirect.destination.as_str()) {
                    Ok(location) => {
                        (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)])
                            .into_response()
                    }
                    Err(_) => {
                        tracing::error!(
                            destination = ?redirect.destination,
                            "redirect destination is not a valid Location header"
                        );
                        json_error(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "invalid_redirect",
                            "guard redirect destination is misconfigured",
                        )
                    }
                }
            }
            props @ GuardDecision::Props(_) => Json(props).into_response(),
        }
    }
}

pub async fn guard_middleware<F, Fut, E>(
    State(guard): State<Arc<Guard<F>>>,
    req: Request,
    next: Next,
) -> Response
where
    F: Fn(GuardContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<User, E>> + Send + 'static,
    E: IntoResponse + Send + 'static,
{
    let ctx = GuardContext::from_request(&req);

    let decision = match guard.handle(ctx).await {
        Ok(decision) => decision,
        Err(err) => return err.into_response(),
    };

    match decision {
        GuardDecision::Props(_) => next.run(req).await,
        redirect @ GuardDecision::Redirect(_) => redirect.into_response(),
    }
}

/// Put every route currently in `router` behind `guard`.
pub fn protect<S, F, Fut, E>(router: Router<S>, guard: Guard<F>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    F: Fn(GuardContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<User, E>> + Send + 'static,
    E: IntoResponse + Send + 'static,
{
    router.route_layer(from_fn_with_state(
        Arc::new(guard),
        guard_middleware::<F, Fut, E>,
    ))
}
