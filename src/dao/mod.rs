/// Local catalog persistence (MongoDB and in-memory backends).
pub mod catalog_store;
/// Database model definitions.
pub mod models;
/// Gateways to the upstream game-metadata providers.
pub mod providers;
/// Storage abstraction layer for database operations.
pub mod storage;
