//! `rolegate-auth`: user model, resolver contract and pure permission checks.
//!
//! This crate is intentionally decoupled from UI hosts and HTTP.

pub mod authorize;
pub mod permissions;
pub mod resolver;
pub mod roles;
pub mod user;

pub use authorize::{AuthzError, authorize};
pub use permissions::Permission;
pub use resolver::{
    ResolveError, ResolveFuture, Resolver, SharedResolver, resolver_fn, resolver_from_user,
    same_resolver,
};
pub use roles::Role;
pub use user::User;
