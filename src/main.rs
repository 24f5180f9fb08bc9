// src/main.rs

//! # Credential Registry Service - Main Entry Point
//!
//! Initializes the core components and starts the API server.
//!
//! ## Architecture Overview
//! 1. **Hashing Core**: canonical JSON + SHA-256 digest engine
//! 2. **Services Layer**: issuance, verification, search, extraction, API
//! 3. **Storage Layer**: in-memory credential registry keyed by digest
//! 4. **Wallet Layer**: issuer key management and message signing
//!
//! ## Environment Variables
//! - `EXTRACTION_API_KEY`: API key for the AI extraction gateway (required)
//! - `EXTRACTION_API_URL`: (Optional) gateway chat-completions endpoint

use crate::hashing::digest::DigestEngine;
use crate::services::api_server::ApiServer;
use crate::services::credential_issuer::CredentialIssuer;
use crate::services::extraction_client::ExtractionClient;
use crate::services::verifier::Verifier;
use crate::storage::registry_store::RegistryStore;
use crate::wallet::key_management::KeyManager;
use dotenv::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;

// Module declarations (organized by functional domain)
mod hashing; // canonicalization and content digests
mod models; // data structures
mod services; // business logic and API
mod storage; // credential registry
mod wallet; // issuer key operations

/// Default extraction gateway endpoint.
const DEFAULT_EXTRACTION_API_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";

/// Main application entry point
///
/// # Initialization Sequence
/// 1. Load environment configuration
/// 2. Build the digest engine, registry, and issuer wallet
/// 3. Initialize service components
/// 4. Start API server
///
/// # Panics
/// - If required environment variables are missing
#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv().ok();
    env_logger::init();

    let extraction_api_key = std::env::var("EXTRACTION_API_KEY")
        .expect("EXTRACTION_API_KEY must be set in .env");
    let extraction_api_url = std::env::var("EXTRACTION_API_URL")
        .unwrap_or_else(|_| DEFAULT_EXTRACTION_API_URL.to_string());

    // Core components, shared across services
    let digest_engine = DigestEngine::sha256();
    let registry = Arc::new(RegistryStore::new());
    let key_manager = Arc::new(KeyManager::new());
    log::info!(
        "issuer wallet {} (digest: {})",
        key_manager.address(),
        digest_engine.algorithm()
    );

    // Credential Issuer Service
    let credential_issuer = CredentialIssuer::new(
        registry.clone(),
        key_manager.clone(),
        digest_engine.clone(),
    );

    // Credential Verifier Service
    let verifier = Verifier::new(registry.clone(), digest_engine);

    // AI extraction gateway client
    let extraction_client = ExtractionClient::new(extraction_api_url, extraction_api_key);

    // Initialize API Server with all dependencies
    let api_server = ApiServer::new(
        credential_issuer,
        verifier,
        extraction_client,
        key_manager,
        registry,
    );

    // Start the HTTP server
    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    log::info!("API server running at http://{}", addr);
    log::info!("Available endpoints:");
    log::info!("- POST /extract-credential");
    log::info!("- POST /issue-credential");
    log::info!("- POST /verify-credential");
    log::info!("- POST /revoke-credential");
    log::info!("- POST /search-candidates");
    log::info!("- GET  /credential/:hash");
    log::info!("- GET  /count-credentials");

    api_server.run(addr).await;
}
