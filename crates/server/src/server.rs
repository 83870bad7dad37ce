use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Form, Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use restpki_client::{
    Cades, FullXml, PendingToken, RestPkiClient, SecurityContext, SignatureProcess,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AppError;
use crate::flow::{self, CompletedSignature, FlowError};
use crate::requests::{self, ContentSource};
use crate::resources::Resources;
use crate::signing::{DataSigner, RsaSigner};
use crate::storage::AppDataStorage;

type NoCacheHeaders = [(header::HeaderName, &'static str); 3];

const NO_CACHE_HEADERS: NoCacheHeaders = [
    (
        header::CACHE_CONTROL,
        "private, no-store, max-age=0, no-cache, must-revalidate, post-check=0, pre-check=0",
    ),
    (header::PRAGMA, "no-cache"),
    (header::EXPIRES, "Thu, 01 Jan 1970 00:00:00 GMT"),
];

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<RestPkiClient>,
    pub signer: Arc<dyn DataSigner>,
    pub resources: Resources,
    pub storage: AppDataStorage,
    pub security_context: SecurityContext,
}

impl AppState {
    /// Builds the REST PKI client and loads the signer key.
    pub async fn from_config(config: Config) -> Result<Self> {
        let client = RestPkiClient::new(&config.endpoint, config.access_token)
            .context("creating REST PKI client")?;

        let resources = Resources::new(config.resources_dir);
        let key_pem = resources
            .signer_key_pem()
            .await
            .context("reading signer key")?;
        let passphrase = config.key_passphrase.as_ref().map(|p| p.expose_secret());
        let signer = RsaSigner::from_pem(&key_pem, passphrase).context("loading signer key")?;

        Ok(Self {
            client: Arc::new(client),
            signer: Arc::new(signer),
            resources,
            storage: AppDataStorage::new(config.app_data_dir),
            security_context: config.security_context,
        })
    }
}

/// Form view for Web PKI: the browser signs with this token and posts it back.
#[derive(Debug, Serialize)]
pub struct SignatureForm {
    pub token: PendingToken,
}

#[derive(Debug, Deserialize)]
pub struct ContentQuery {
    pub userfile: Option<String>,
    pub cmsfile: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub extension: Option<String>,
}

/// Name of an uploaded file, to be passed back as `userfile`.
#[derive(Debug, Serialize)]
pub struct UploadedFile {
    pub file: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(|| async move { (StatusCode::OK, "Ok").into_response() }))
        .route("/upload", post(upload))
        .route("/cades-signature-server-key", get(cades_signature_server_key))
        .route("/cades-signature", get(cades_signature))
        .route("/cades-signature-action", post(complete_web_signature::<Cades>))
        .route("/xml-full-signature-server-key", get(xml_full_signature_server_key))
        .route("/xml-full-signature", get(xml_full_signature))
        .route("/xml-full-signature-action", post(complete_web_signature::<FullXml>))
        .with_state(state)
}

pub async fn run(host: String, port: u16, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("binding {host}:{port}"))?;
    tracing::info!(%host, port, "listening");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Stores the raw request body in app-data. Documents default to `.pdf`.
#[tracing::instrument(level = "info", skip_all)]
async fn upload(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<UploadedFile>, AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("empty upload".to_string()));
    }
    let extension = query.extension.as_deref().unwrap_or("pdf");
    let file = state.storage.store(&body, extension).await?;
    Ok(Json(UploadedFile { file }))
}

#[tracing::instrument(level = "info", skip_all)]
async fn cades_signature_server_key(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> Result<Json<CompletedSignature>, AppError> {
    let source = ContentSource::from_query(query.userfile, query.cmsfile);
    let request = requests::cades_server_key_request(
        &state.resources,
        &state.storage,
        &source,
        state.security_context,
    )
    .await?;

    let completed = flow::sign_with_server_key::<Cades>(
        &state.client,
        state.signer.as_ref(),
        &state.storage,
        &request,
    )
    .await?;
    Ok(Json(completed))
}

#[tracing::instrument(level = "info", skip_all)]
async fn cades_signature(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> Result<(NoCacheHeaders, Json<SignatureForm>), AppError> {
    let source = ContentSource::from_query(query.userfile, query.cmsfile);
    let request = requests::cades_web_request(
        &state.resources,
        &state.storage,
        &source,
        state.security_context,
    )
    .await?;

    start_web_signature::<Cades>(&state, &request).await
}

#[tracing::instrument(level = "info", skip_all)]
async fn xml_full_signature_server_key(
    State(state): State<AppState>,
) -> Result<Json<CompletedSignature>, AppError> {
    let request = requests::full_xml_request(&state.resources, state.security_context, true).await?;

    let completed = flow::sign_with_server_key::<FullXml>(
        &state.client,
        state.signer.as_ref(),
        &state.storage,
        &request,
    )
    .await?;
    Ok(Json(completed))
}

#[tracing::instrument(level = "info", skip_all)]
async fn xml_full_signature(
    State(state): State<AppState>,
) -> Result<(NoCacheHeaders, Json<SignatureForm>), AppError> {
    let request = requests::full_xml_request(&state.resources, state.security_context, false).await?;

    start_web_signature::<FullXml>(&state, &request).await
}

/// The token may be used for a single attempt, so the page holding it must
/// never come back from the browser cache.
async fn start_web_signature<P: SignatureProcess>(
    state: &AppState,
    request: &P::Request,
) -> Result<(NoCacheHeaders, Json<SignatureForm>), AppError> {
    let started = state
        .client
        .start::<P>(request)
        .await
        .map_err(FlowError::from)?;

    Ok((
        NO_CACHE_HEADERS,
        Json(SignatureForm {
            token: started.token,
        }),
    ))
}

async fn complete_web_signature<P: SignatureProcess>(
    State(state): State<AppState>,
    Form(form): Form<TokenForm>,
) -> Result<Json<CompletedSignature>, AppError> {
    let token: PendingToken = form.token.parse().map_err(FlowError::from)?;

    let completed = flow::finalize_web_signature::<P>(&state.client, &state.storage, token).await?;
    Ok(Json(completed))
}
