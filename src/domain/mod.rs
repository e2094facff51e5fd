//! Domain model for the repair-ticketing client.
//!
//! Everything here mirrors what the backend returns; the client never owns
//! authoritative state. Enums are closed sets matching the wire values.

pub mod attachment;
pub mod category;
pub mod comment;
pub mod permissions;
pub mod request;
pub mod role;
pub mod settings;
pub mod status;
pub mod user;
pub mod visibility;

pub use attachment::Attachment;
pub use category::Category;
pub use comment::Comment;
pub use permissions::Capabilities;
pub use request::{NewRepairRequest, RepairRequest, UpdateRepairRequest};
pub use role::Role;
pub use settings::Settings;
pub use status::{Priority, RequestStatus};
pub use user::User;
pub use visibility::visible_requests;
