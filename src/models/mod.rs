//! Data models

mod announcement;
mod audit;
mod checkin;
mod event;
mod giving;
mod group;
mod household;
mod invitation;
mod rbac;
mod request;
mod session;
mod settings;
mod user;

pub use announcement::*;
pub use audit::*;
pub use checkin::*;
pub use event::*;
pub use giving::*;
pub use group::*;
pub use household::*;
pub use invitation::*;
pub use rbac::*;
pub use request::*;
pub use session::*;
pub use settings::*;
pub use user::*;
