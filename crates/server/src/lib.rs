//! HTTP side of rolegate: a route guard that resolves the caller and either
//! continues or redirects, plus its axum adapter and a demo app.

pub mod app;
pub mod config;
pub mod context;
pub mod errors;
pub mod guard;
pub mod middleware;

pub use config::{ConfigError, GuardConfig};
pub use context::GuardContext;
pub use errors::IdentityError;
pub use guard::{DEFAULT_REDIRECT, Guard, GuardDecision, GuardOptions, Redirect, build_guard};
pub use middleware::{guard_middleware, protect};
