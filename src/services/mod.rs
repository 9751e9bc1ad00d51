/// Serialized court mutations and unlocked reads.
pub mod coordinator;
/// OpenAPI documentation generation.
pub mod documentation;
/// Tournament snapshot export.
pub mod export_service;
/// Health check and court integrity service.
pub mod health_service;
/// Storage connection supervisor toggling degraded mode.
pub mod storage_supervisor;
/// Random court data for demos.
pub mod test_data;
