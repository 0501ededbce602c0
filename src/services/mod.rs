/// Local game catalog operations, including the merge-on-create rule.
pub mod catalog_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Upstream metadata provider calls.
pub mod provider_service;
/// Catalog store connection supervisor with reconnect backoff.
pub mod storage_supervisor;
/// Platform and genre operations.
pub mod taxonomy_service;
