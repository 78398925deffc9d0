// Adapters layer: concrete implementations for external systems (storage, http).

pub mod local_storage;
pub mod remote;
