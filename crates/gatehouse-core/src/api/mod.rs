//! REST API client module for the gatehouse backend.
//!
//! This module provides the `ApiClient` for calling the backend's auth and
//! user endpoints. Every call reads the bearer token from the injected
//! `TokenStore` right before dispatch, so a login or logout elsewhere is
//! picked up by the very next request.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
