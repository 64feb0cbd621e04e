//! Service layer: the disk blob store for image bytes and the tote service
//! that mediates between resource handlers and the two backing stores.

pub mod blob_store;
pub mod tote_service;
