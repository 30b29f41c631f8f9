//! Business logic services for the contacts API.
//!
//! # Services
//!
//! - `auth` - Password login, access tokens, verification and reset flows
//! - `email` - SMTP delivery of verification codes and reset tokens
//! - `cloudinary` - Avatar uploads to the Cloudinary image host

pub mod auth;
pub mod cloudinary;
pub mod email;

pub use auth::{AuthError, AuthService, TokenIssuer};
pub use cloudinary::{CloudinaryClient, CloudinaryError};
pub use email::{EmailError, EmailService};
