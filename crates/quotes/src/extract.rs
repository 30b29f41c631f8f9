//! Extractors whose rejections render the HTML error page.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// URL-encoded form body. Repeated keys collect into `Vec` fields.
#[derive(FromRequest)]
#[from_request(via(axum_extra::extract::Form), rejection(AppError))]
pub struct PageForm<T>(pub T);

/// Path parameters; a malformed id is reported as a missing page.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PagePath<T>(pub T);
