//! User domain

pub mod entity;
pub mod repository;
pub mod service;

pub use entity::{PublicUser, User, UserPatch};
pub use repository::UserRepository;
pub use service::{SignupData, UserService};
