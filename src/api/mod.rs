mod handlers;
mod routes;
mod state;

pub use handlers::{ContentResponse, UserResponse, WatchedResponse};
pub use routes::create_router;
pub use state::AppState;
