//! Core data model for the pet registry.
//!
//! A registration is a single entity: owner info, pet info and an optional
//! photo. It serializes as JSON via `serde` and maps onto the `records` table.

pub mod record;
