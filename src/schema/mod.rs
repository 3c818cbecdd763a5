mod id;
mod user;

pub use id::UserId;
pub use user::{InsertUser, User, UserProfile};
