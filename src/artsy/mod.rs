// Artsy API module.
// Provides the route table, authenticated client, token cache, and model types.

pub mod client;
pub mod endpoints;
pub mod routes;
pub mod token;
pub mod types;

pub use client::{ArtsyClient, XAPP_TOKEN_HEADER};
pub use routes::{ArtsyRoute, ShowKind};
pub use token::{TokenStore, XAppToken};
pub use types::*;
