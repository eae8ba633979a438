//! Infrastructure services

mod response_cache_service;

pub use response_cache_service::ResponseCacheService;
