pub mod public;
mod router;
pub use router::{permission_router, router};
