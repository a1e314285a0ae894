//! # Taskboard API Server Library
//!
//! Core functionality for the Taskboard API server: a session-cookie
//! authenticated JSON API for managing projects and their ordered tasks.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
