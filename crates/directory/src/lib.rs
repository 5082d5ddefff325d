//! `atrium-directory` — the user/role directory: entities, store contracts,
//! and the administrative and self-service mutation executors.

pub mod service;
pub mod store;
pub mod user;

pub use service::{AccountService, CreateUser, UserAdminService};
pub use store::{DirectoryStore, RoleStore};
pub use user::{DirectoryUser, NewUser, Role};
