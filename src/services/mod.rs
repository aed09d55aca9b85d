/// Contest reads and mutations shared by every transport.
pub mod contest_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Snapshot save, list and load.
pub mod persistence_service;
/// User presence and roles.
pub mod presence_service;
/// Periodic standings poll and automatic save.
pub mod scheduler;
/// Published standings lookup for finished rounds.
pub mod standings_service;
/// Snapshot store supervision and degraded mode.
pub mod storage_supervisor;
/// Version-based round synchronization.
pub mod sync_service;
/// WebSocket connection and message handling service.
pub mod websocket_service;
