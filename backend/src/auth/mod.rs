//! Authentication module for sessions and access control.
//!
//! This module provides the public interface for authentication-related
//! functionality: login, Telegram sign-in, the session manager and the
//! middleware gating private routes.

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
pub mod session;
