//! Record core: the existence guard, the merge policy, the service that
//! composes them, and the store they run against.

pub mod existence_guard;
pub mod merge_policy;
pub mod record_service;
pub mod store;
