use reqwest::StatusCode;
use restpki_client::{
    Cades, CadesSignatureRequest, FullXml, PendingToken, RestPkiClient, RestPkiError,
    SecurityContext, SignaturePolicy, SignedArtifact,
};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACCESS_TOKEN: &str = "test-access-token";
const TOKEN: &str = "Ek3s6mv3Q1O7a_WdS6f0AbcPq2-rT9xYzKL4uV8nHj0";

fn client(server: &MockServer) -> RestPkiClient {
    RestPkiClient::new(&server.uri(), SecretString::from(ACCESS_TOKEN)).unwrap()
}

fn token() -> PendingToken {
    TOKEN.parse().unwrap()
}

#[tokio::test]
async fn start_cades_sends_bearer_token_and_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Api/CadesSignatures"))
        .and(header("Authorization", format!("Bearer {ACCESS_TOKEN}").as_str()))
        .and(body_partial_json(json!({
            "certificate": "Y2VydA==",
            "contentToSign": "aGVsbG8=",
            "signaturePolicyId": "3ddd8001-1672-4eb5-a4a2-6e32b17ddc46",
            "securityContextId": "803517ad-3bbc-4169-b085-60053a8f6dbf",
            "encapsulateContent": true,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": TOKEN,
            "toSignData": "dG8tc2lnbg==",
            "toSignHash": "aGFzaA==",
            "digestAlgorithmOid": "2.16.840.1.101.3.4.2.1",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = CadesSignatureRequest::new(
        SignaturePolicy::PkiBrazilCadesAdrBasica,
        SecurityContext::LacunaTest,
    );
    request.certificate = Some(b"cert".to_vec());
    request.content_to_sign = Some(b"hello".to_vec());
    request.encapsulate_content = Some(true);

    let started = client(&server).start::<Cades>(&request).await.unwrap();

    assert_eq!(started.token, token());
    assert_eq!(started.to_sign_data.as_deref(), Some(&b"to-sign"[..]));
    assert_eq!(
        started.digest_algorithm_oid.as_deref(),
        Some("2.16.840.1.101.3.4.2.1")
    );
}

#[tokio::test]
async fn complete_with_signature_posts_base64_signature_to_token_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/Api/CadesSignatures/{TOKEN}/SignedBytes")))
        .and(body_json(json!({ "signature": "AQID" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cms": "c2lnbmVkLWNtcw==",
            "certificate": { "subjectName": { "commonName": "Pierre de Fermat" } },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let artifact = client(&server)
        .complete_with_signature::<Cades>(&token(), vec![1, 2, 3])
        .await
        .unwrap();

    assert_eq!(
        artifact.certificate().subject_name.common_name.as_deref(),
        Some("Pierre de Fermat")
    );
    assert_eq!(artifact.into_content(), b"signed-cms");
}

#[tokio::test]
async fn finalize_xml_returns_signed_document() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/Api/XmlSignatures/{TOKEN}/Finalize")))
        .and(header("Authorization", format!("Bearer {ACCESS_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "signedXml": "PHNpZ25lZC8+",
            "certificate": {},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let artifact = client(&server).finalize::<FullXml>(&token()).await.unwrap();

    assert_eq!(artifact.into_content(), b"<signed/>");
}

#[tokio::test]
async fn remote_error_surfaces_code_and_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Api/CadesSignatures"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "code": "ValidationError",
            "message": "The signer certificate is not trusted",
            "detail": "Certificate chain could not be built",
        })))
        .mount(&server)
        .await;

    let request = CadesSignatureRequest::new(SignaturePolicy::CadesBes, SecurityContext::LacunaTest);
    let error = client(&server).start::<Cades>(&request).await.unwrap_err();

    match error {
        RestPkiError::Api {
            status,
            code,
            message,
            detail,
        } => {
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(code.as_deref(), Some("ValidationError"));
            assert_eq!(message.as_deref(), Some("The signer certificate is not trusted"));
            assert_eq!(detail.as_deref(), Some("Certificate chain could not be built"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn plain_text_error_body_becomes_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/Api/XmlSignatures/{TOKEN}/Finalize")))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid access token"))
        .mount(&server)
        .await;

    let error = client(&server).finalize::<FullXml>(&token()).await.unwrap_err();

    assert!(matches!(
        error,
        RestPkiError::Api { status: StatusCode::UNAUTHORIZED, ref message, .. }
            if message.as_deref() == Some("Invalid access token")
    ));
}

#[tokio::test]
async fn malformed_success_body_is_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Api/CadesSignatures"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
        .mount(&server)
        .await;

    let request = CadesSignatureRequest::new(SignaturePolicy::CadesBes, SecurityContext::LacunaTest);
    let error = client(&server).start::<Cades>(&request).await.unwrap_err();

    assert!(matches!(error, RestPkiError::Protocol(_)));
}

#[tokio::test]
async fn malformed_token_from_service_is_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Api/XmlSignatures/FullXmlSignature"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "../Finalize" })))
        .expect(1)
        .mount(&server)
        .await;

    let request = restpki_client::FullXmlSignatureRequest::new(
        b"<doc/>".to_vec(),
        SignaturePolicy::XadesBes,
        SecurityContext::LacunaTest,
    );
    let error = client(&server).start::<FullXml>(&request).await.unwrap_err();

    match error {
        RestPkiError::Protocol(message) => assert!(message.contains("Invalid signature token")),
        other => panic!("expected protocol error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    // Nothing listens on port 1.
    let client = RestPkiClient::new("http://127.0.0.1:1/", SecretString::from(ACCESS_TOKEN)).unwrap();
    let request = CadesSignatureRequest::new(SignaturePolicy::CadesBes, SecurityContext::LacunaTest);
    let error = client.start::<Cades>(&request).await.unwrap_err();

    assert!(matches!(error, RestPkiError::Transport(_)));
}
