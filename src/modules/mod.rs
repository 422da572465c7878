//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients and adapters for external services: blob storage and email delivery.

pub mod mail;
pub mod storage;
