//! Core data models for the Totelink inventory API.
//!
//! These entities represent totes, their checklist items, and the image
//! records attached to either. They map cleanly to database tables via
//! `sqlx::FromRow` and serialize naturally as JSON via `serde`.

pub mod image;
pub mod item;
pub mod tote;
