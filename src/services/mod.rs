//! Business services

pub mod auth;
pub mod chat;
pub mod media;
pub mod system_status;

pub use auth::AuthService;
pub use chat::{ChatService, CompletionError, CompletionProvider, OpenAiCompletionClient};
pub use media::MediaStore;
pub use system_status::SystemMonitor;
