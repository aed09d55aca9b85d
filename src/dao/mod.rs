/// Snapshot model definitions.
pub mod models;
/// Snapshot persistence backends.
pub mod snapshot_store;
/// Published round standings.
pub mod standings;
/// Storage abstraction layer for snapshot operations.
pub mod storage;
