// src/services/mod.rs
//! Business logic and API surface.

pub mod api_server;
pub mod candidate_search;
pub mod credential_issuer;
pub mod extraction_client;
pub mod verifier;
