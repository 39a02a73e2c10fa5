//! Database repositories module
//!
//! Data access per aggregate. Repositories own no state beyond the pool.

pub mod user;
pub mod event;
pub mod hosting;
pub mod messaging;

pub use user::UserRepository;
pub use event::EventRepository;
pub use hosting::HostingRepository;
pub use messaging::MessagingRepository;
