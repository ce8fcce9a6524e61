//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate catalog, progress and storage into the drill session.
//! - Keep presentation layers decoupled from storage details.

pub mod deck_builder;
pub mod session;
pub mod store;
pub mod view;
