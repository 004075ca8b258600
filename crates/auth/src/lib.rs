//! `meshguard-auth`: token validation, request identity and the
//! authorization decision engine.
//!
//! This crate is intentionally decoupled from HTTP and transport.

pub mod args;
pub mod authorize;
pub mod claims;
pub mod identity;
pub mod roles;
pub mod rules;
pub mod token;

pub use args::OperationArgs;
pub use authorize::{AuthzError, Grant, authorize, check_ownership, check_role};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use identity::IdentityContext;
pub use roles::Role;
pub use rules::{AuthorizationRule, OwnershipRule, RoleRule};
pub use token::{Hs256TokenValidator, TokenValidator};
