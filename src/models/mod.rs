mod content;
mod user;
mod watch;

pub use content::{Content, ContentType, NewContent, UnknownContentType};
pub use user::{NewUser, User};
pub use watch::WatchEdge;
