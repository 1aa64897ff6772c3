//! Request extractors whose rejections use the `AppError` JSON envelope.

use axum::extract::FromRequest;

use crate::errors::AppError;

/// `axum::Json` with rejections (bad JSON, wrong types, missing
/// `Content-Type`, oversized body) mapped through `AppError`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
