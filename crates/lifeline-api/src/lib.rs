pub mod auth;
pub mod blogs;
pub mod contact;
pub mod error;
pub mod extract;
pub mod funds;
pub mod middleware;
pub mod policy;
pub mod requests;
pub mod routes;
pub mod stats;
pub mod state;
pub mod users;

pub use routes::router;
pub use state::{AppState, AppStateInner};
