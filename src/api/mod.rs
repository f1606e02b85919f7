pub mod routes;
mod server;
pub use server::{app, serve};
pub mod public;
mod auth;
pub use auth::AuthUser;
mod state;
pub use state::AppState;
