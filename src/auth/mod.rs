//! Session handling.
//!
//! Users sign in with an external identity provider that issues HS256 bearer
//! tokens. This module only validates those tokens and turns their claims into
//! a [`Session`] that handlers pass explicitly into the service layer.

pub mod jwt;
pub mod middleware;
pub mod model;

pub use jwt::*;
pub use middleware::*;
pub use model::*;
