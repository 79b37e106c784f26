//! User module
//!
//! This module handles the user directory: domain types, validation,
//! persistence contract, business rules and the HTTP surface.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
