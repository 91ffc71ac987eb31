//! Data model shared between the backend and its clients.
//!
//! - `model`: achievement documents, reference rows, merged views and
//!   directory records.
//! - `requests`: payloads the HTTP surface accepts.

pub mod model;
pub mod requests;
