//! Infrastructure layer - store, index, and service implementations

pub mod logging;
pub mod services;
pub mod similarity;
pub mod store;
