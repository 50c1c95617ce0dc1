//! Transports exposing the catalog.
//!
//! The catalog itself only speaks [`crate::catalog::api::FoodRequest`]s. A
//! transport decodes inbound requests, validates their payloads, hands them to the
//! food API service and encodes the outcome back.

pub mod http;
