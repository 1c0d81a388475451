//! Blog domain: models, user store, page handlers and the template renderer.

pub mod handlers;
pub mod models;
pub mod render;
pub mod store;

pub use models::{Blog, Comment, User, next_id};
pub use render::HandlebarsRenderer;
pub use store::{InMemoryUserRepository, UserRepository};
