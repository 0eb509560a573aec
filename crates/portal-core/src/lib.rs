//! # portal-core
//!
//! Core types and error types for the portal search engine.
//!
//! This crate provides the foundational types shared by the portal crates:
//! - The closed set of searchable entity kinds ([`enums::EntityType`])
//! - Entity structs for every searchable domain object (platforms, datasets, genes, ...)
//! - The [`entities::Entity`] tagged variant that carries any of them
//! - Value objects produced for rendering search results
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod value_object;
