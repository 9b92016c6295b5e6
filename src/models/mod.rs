//! Data models

mod chat;
mod entity;
mod event;
mod media;
mod reservation;
mod stats;
mod suite;
mod system_status;
mod user;
mod venue;

pub use chat::*;
pub use entity::*;
pub use event::*;
pub use media::*;
pub use reservation::*;
pub use stats::*;
pub use suite::*;
pub use system_status::*;
pub use user::*;
pub use venue::*;
