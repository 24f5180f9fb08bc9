// src/services/api_server.rs
//! API Server for the credential registry.
//!
//! REST interface over the issuance pipeline, the verification classifier,
//! the recruiter search, the extraction gateway client, and the issuer
//! wallet. Built with Axum; endpoints:
//! - Credential issuance, verification, and revocation
//! - Certificate image extraction
//! - Candidate search over non-revoked entries
//! - Registry inspection (entry by hash, entry count)
//! - Wallet address derivation and message signing

use crate::models::credential::{CredentialRecord, RegistryEntry, VerificationStatus};
use crate::services::candidate_search::parse_query;
use crate::services::credential_issuer::{CredentialIssuer, IssueError};
use crate::services::extraction_client::{ExtractionClient, ExtractionError};
use crate::services::verifier::Verifier;
use crate::storage::registry_store::{RegistryError, RegistryStore};
use crate::wallet::key_management::KeyManager;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use ethers::utils::hex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

// API request and response structures

/// Request payload for extracting credential data from an image
#[derive(Serialize, Deserialize)]
struct ExtractCredentialRequest {
    image_base64: String,
}

/// Response for the extraction operation
#[derive(Serialize, Deserialize)]
struct ExtractCredentialResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<CredentialRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Response for credential issuance operation
#[derive(Serialize, Deserialize)]
struct IssueCredentialResponse {
    credential_hash: String,
    wallet_address: String,
    transaction_id: String,
}

/// Response for credential verification operation
#[derive(Serialize)]
struct VerifyCredentialResponse {
    status: VerificationStatus,
    is_valid: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    credential: Option<RegistryEntry>,
}

/// Request payload for revoking a credential
#[derive(Serialize, Deserialize)]
struct RevokeCredentialRequest {
    credential_hash: String,
}

/// Response for credential revocation operation
#[derive(Serialize, Deserialize)]
struct RevokeCredentialResponse {
    revoked: bool,
}

/// Request payload for candidate search
#[derive(Serialize, Deserialize)]
struct SearchCandidatesRequest {
    query: String,
}

/// Response containing matching candidates
#[derive(Serialize)]
struct SearchCandidatesResponse {
    count: usize,
    candidates: Vec<RegistryEntry>,
}

/// Response containing the issuer wallet address
#[derive(Serialize, Deserialize)]
struct CreateWalletResponse {
    address: String,
}

/// Request payload for signing a message
#[derive(Serialize, Deserialize)]
struct SignMessageRequest {
    message: String,
}

/// Response containing a message signature
#[derive(Serialize, Deserialize)]
struct SignMessageResponse {
    signature: String,
}

/// API server state containing all service dependencies
pub struct ApiServer {
    /// Service for issuing and revoking credentials
    credential_issuer: Arc<CredentialIssuer>,

    /// Service for verifying credentials
    verifier: Arc<Verifier>,

    /// Client for the AI extraction gateway
    extraction_client: Arc<ExtractionClient>,

    /// Issuer wallet
    key_manager: Arc<KeyManager>,

    /// Shared credential registry
    registry: Arc<RegistryStore>,
}

impl ApiServer {
    /// Creates a new instance of the API server
    pub fn new(
        credential_issuer: CredentialIssuer,
        verifier: Verifier,
        extraction_client: ExtractionClient,
        key_manager: Arc<KeyManager>,
        registry: Arc<RegistryStore>,
    ) -> Self {
        ApiServer {
            credential_issuer: Arc::new(credential_issuer),
            verifier: Arc::new(verifier),
            extraction_client: Arc::new(extraction_client),
            key_manager,
            registry,
        }
    }

    /// Starts the API server and begins listening for requests
    ///
    /// # Arguments
    /// * `addr` - Socket address to bind to (e.g., "127.0.0.1:3000")
    pub async fn run(&self, addr: SocketAddr) {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
        axum::serve(listener, app).await.unwrap();
    }

    /// The configured route table.
    fn router(&self) -> Router {
        Router::new()
            .route("/extract-credential", post(Self::extract_credential_handler))
            .route("/issue-credential", post(Self::issue_credential_handler))
            .route("/verify-credential", post(Self::verify_credential_handler))
            .route("/revoke-credential", post(Self::revoke_credential_handler))
            .route("/search-candidates", post(Self::search_candidates_handler))
            .route("/credential/:hash", get(Self::get_credential_handler))
            .route("/count-credentials", get(Self::count_credentials_handler))
            .route("/create-wallet", post(Self::create_wallet_handler))
            .route("/sign-message", post(Self::sign_message_handler))
            .with_state(Arc::new(self.clone()))
    }

    // =====================
    // Extraction Handler
    // =====================

    /// Extracts credential fields from an uploaded certificate image
    ///
    /// # Endpoint
    /// POST /extract-credential
    ///
    /// # Responses
    /// - 200 OK: Returns the extracted record for review/editing
    /// - 402/429: Gateway credit or rate-limit errors, passed through
    /// - 502 Bad Gateway: Other extraction failures
    async fn extract_credential_handler(
        State(state): State<Arc<ApiServer>>,
        Json(payload): Json<ExtractCredentialRequest>,
    ) -> impl IntoResponse {
        if payload.image_base64.is_empty() {
            return (
                StatusCode::BAD_REQUEST,
                Json(ExtractCredentialResponse {
                    data: None,
                    error: Some("No image data provided".into()),
                }),
            );
        }

        match state.extraction_client.extract(&payload.image_base64).await {
            Ok(record) => (
                StatusCode::OK,
                Json(ExtractCredentialResponse {
                    data: Some(record),
                    error: None,
                }),
            ),
            Err(e) => {
                log::error!("extraction failed: {}", e);
                let status = match e {
                    ExtractionError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                    ExtractionError::CreditsDepleted => StatusCode::PAYMENT_REQUIRED,
                    _ => StatusCode::BAD_GATEWAY,
                };
                (
                    status,
                    Json(ExtractCredentialResponse {
                        data: None,
                        error: Some(e.to_string()),
                    }),
                )
            }
        }
    }

    // =====================
    // Credential Handlers
    // =====================

    /// Issues a new credential
    ///
    /// # Endpoint
    /// POST /issue-credential
    ///
    /// # Request Body
    /// The credential record (all six fields required)
    ///
    /// # Responses
    /// - 200 OK: Returns digest, issuer address, and transaction reference
    /// - 400 Bad Request: Incomplete record
    /// - 409 Conflict: An identical credential is already registered
    /// - 500 Internal Server Error: Digest or registry failure
    async fn issue_credential_handler(
        State(state): State<Arc<ApiServer>>,
        Json(payload): Json<CredentialRecord>,
    ) -> impl IntoResponse {
        match state.credential_issuer.issue(payload) {
            Ok(entry) => (
                StatusCode::OK,
                Json(json!(IssueCredentialResponse {
                    credential_hash: entry.credential_hash,
                    wallet_address: entry.wallet_address,
                    transaction_id: entry.transaction_id,
                })),
            ),
            Err(e) => {
                log::error!("issuance failed: {}", e);
                let status = match &e {
                    IssueError::InvalidRecord(_) => StatusCode::BAD_REQUEST,
                    IssueError::Registry(RegistryError::DuplicateEntry(_)) => StatusCode::CONFLICT,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, Json(json!({ "error": e.to_string() })))
            }
        }
    }

    /// Verifies a credential against the registry
    ///
    /// # Endpoint
    /// POST /verify-credential
    ///
    /// # Request Body
    /// The raw credential JSON, exactly as held by the credential owner
    ///
    /// # Responses
    /// - 200 OK: Returns VALID / REVOKED / NOT_FOUND with the matched entry
    /// - 400 Bad Request: Body is not valid JSON (Axum rejection)
    /// - 500 Internal Server Error: Digest failure
    async fn verify_credential_handler(
        State(state): State<Arc<ApiServer>>,
        Json(payload): Json<serde_json::Value>,
    ) -> impl IntoResponse {
        match state.verifier.verify_value(&payload) {
            Ok(report) => (
                StatusCode::OK,
                Json(json!(VerifyCredentialResponse {
                    status: report.status,
                    is_valid: report.status.is_valid(),
                    message: report.status.describe().to_string(),
                    credential: report.credential,
                })),
            ),
            Err(e) => {
                log::error!("verification failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": e.to_string() })),
                )
            }
        }
    }

    /// Revokes an issued credential
    ///
    /// # Endpoint
    /// POST /revoke-credential
    ///
    /// # Responses
    /// - 200 OK: Revocation flag set
    /// - 404 Not Found: No entry with that digest
    async fn revoke_credential_handler(
        State(state): State<Arc<ApiServer>>,
        Json(payload): Json<RevokeCredentialRequest>,
    ) -> impl IntoResponse {
        if state.credential_issuer.revoke(&payload.credential_hash) {
            (StatusCode::OK, Json(RevokeCredentialResponse { revoked: true }))
        } else {
            (
                StatusCode::NOT_FOUND,
                Json(RevokeCredentialResponse { revoked: false }),
            )
        }
    }

    /// Fetches a registry entry by its digest
    ///
    /// # Endpoint
    /// GET /credential/:hash
    async fn get_credential_handler(
        State(state): State<Arc<ApiServer>>,
        Path(hash): Path<String>,
    ) -> impl IntoResponse {
        match state.registry.lookup(&hash) {
            Some(entry) => Json(entry).into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        }
    }

    /// Returns the number of registered credentials
    ///
    /// # Endpoint
    /// GET /count-credentials
    async fn count_credentials_handler(State(state): State<Arc<ApiServer>>) -> impl IntoResponse {
        let count = state.registry.count();
        Json(json!({ "count": count }))
    }

    // =====================
    // Search Handler
    // =====================

    /// Searches non-revoked candidates with a free-text query
    ///
    /// # Endpoint
    /// POST /search-candidates
    ///
    /// # Responses
    /// - 200 OK: Matching entries, oldest first
    /// - 400 Bad Request: Empty query
    async fn search_candidates_handler(
        State(state): State<Arc<ApiServer>>,
        Json(payload): Json<SearchCandidatesRequest>,
    ) -> impl IntoResponse {
        if payload.query.trim().is_empty() {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Please enter a search query." })),
            );
        }

        let rules = parse_query(&payload.query);
        let candidates = state.registry.scan(&rules, false);
        (
            StatusCode::OK,
            Json(json!(SearchCandidatesResponse {
                count: candidates.len(),
                candidates,
            })),
        )
    }

    // =====================
    // Wallet Handlers
    // =====================

    /// Returns the issuer wallet address
    ///
    /// # Endpoint
    /// POST /create-wallet
    async fn create_wallet_handler(State(state): State<Arc<ApiServer>>) -> impl IntoResponse {
        (
            StatusCode::OK,
            Json(CreateWalletResponse {
                address: state.key_manager.address(),
            }),
        )
    }

    /// Signs a message with the issuer wallet
    ///
    /// # Endpoint
    /// POST /sign-message
    async fn sign_message_handler(
        State(state): State<Arc<ApiServer>>,
        Json(payload): Json<SignMessageRequest>,
    ) -> impl IntoResponse {
        let signature = state.key_manager.sign_message(payload.message.as_bytes());
        (
            StatusCode::OK,
            Json(SignMessageResponse {
                signature: hex::encode(signature),
            }),
        )
    }
}

// Implement Clone for ApiServer to use with Axum's State
impl Clone for ApiServer {
    fn clone(&self) -> Self {
        ApiServer {
            credential_issuer: Arc::clone(&self.credential_issuer),
            verifier: Arc::clone(&self.verifier),
            extraction_client: Arc::clone(&self.extraction_client),
            key_manager: Arc::clone(&self.key_manager),
            registry: Arc::clone(&self.registry),
        }
    }
}
