//! Domain models for the contacts API.
//!
//! These types represent validated domain objects separate from database row types.

pub mod contact;
pub mod user;

pub use contact::{Contact, ContactInput, NewContact, upcoming_birthdays};
pub use user::{PublicUser, User};
