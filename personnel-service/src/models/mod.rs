pub mod role;
pub mod user;

pub use role::{Role, ADMIN_ROLES};
pub use user::{Identity, LifecycleState, NewUser, UserProfile, UserRecord, UserRow};
