// Emergence: gallery show discovery on top of the Artsy API.
// Typed routes, an XApp-authenticated client, and cached show emitters.

pub mod artsy;
pub mod cache;
pub mod config;
pub mod emitter;
pub mod error;
pub mod locations;
pub mod logging;
pub mod overview;

pub use artsy::{ArtsyClient, ArtsyRoute, ShowKind};
pub use config::{Config, Environment};
pub use emitter::{FetchError, FetchErrorKind, LoadingState, ShowEmitter, ShowScope, ShowSource};
pub use error::{EmergenceError, Result};
pub use locations::LocationsHost;
pub use overview::ShowsOverview;
