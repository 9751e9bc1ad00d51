/// Court and match archive backends.
pub mod court_store;
/// Court data access with lazy initialisation and score resets.
pub mod courts;
/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
