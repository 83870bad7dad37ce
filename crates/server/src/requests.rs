use restpki_client::{
    CadesSignatureRequest, FullXmlSignatureRequest, NamespaceModel, SecurityContext,
    SignatureElementLocation, SignaturePolicy, XmlInsertionOption,
};

use crate::flow::FlowError;
use crate::resources::Resources;
use crate::storage::AppDataStorage;

const SAMPLE_NAMESPACE_PREFIX: &str = "ls";
const SAMPLE_NAMESPACE_URI: &str = "http://www.lacunasoftware.com/sample";
const SIGNATURE_PLACEHOLDER: &str = "//ls:signaturePlaceholder";

/// What a CAdES signature is computed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// A file previously uploaded to app-data.
    UserFile(String),
    /// A CMS in app-data to add a signature to.
    CoSign(String),
    /// The sample PDF from the resources directory.
    SampleDocument,
}

impl ContentSource {
    /// An uploaded file wins over a CMS to co-sign; with neither the sample
    /// document is signed.
    pub fn from_query(userfile: Option<String>, cmsfile: Option<String>) -> Self {
        match (userfile, cmsfile) {
            (Some(userfile), _) => Self::UserFile(userfile),
            (None, Some(cmsfile)) => Self::CoSign(cmsfile),
            (None, None) => Self::SampleDocument,
        }
    }
}

/// CAdES request for the server key flow: PKI Brazil AD-RB policy with the
/// content encapsulated in the resulting CMS.
pub async fn cades_server_key_request(
    resources: &Resources,
    storage: &AppDataStorage,
    source: &ContentSource,
    security_context: SecurityContext,
) -> Result<CadesSignatureRequest, FlowError> {
    let mut request =
        CadesSignatureRequest::new(SignaturePolicy::PkiBrazilCadesAdrBasica, security_context);
    request.certificate = Some(resources.signer_certificate().await?);
    request.encapsulate_content = Some(true);
    set_cades_content(&mut request, resources, storage, source).await?;
    Ok(request)
}

/// CAdES request for a browser-side signature. No certificate is sent, Web
/// PKI supplies it when it signs.
pub async fn cades_web_request(
    resources: &Resources,
    storage: &AppDataStorage,
    source: &ContentSource,
    security_context: SecurityContext,
) -> Result<CadesSignatureRequest, FlowError> {
    let mut request = CadesSignatureRequest::new(SignaturePolicy::CadesBes, security_context);
    set_cades_content(&mut request, resources, storage, source).await?;
    Ok(request)
}

async fn set_cades_content(
    request: &mut CadesSignatureRequest,
    resources: &Resources,
    storage: &AppDataStorage,
    source: &ContentSource,
) -> Result<(), FlowError> {
    match source {
        ContentSource::UserFile(name) => {
            request.content_to_sign = Some(storage.read(name).await?);
        }
        // The content comes from the encapsulated CMS.
        ContentSource::CoSign(name) => {
            request.cms_to_co_sign = Some(storage.read(name).await?);
        }
        ContentSource::SampleDocument => {
            request.content_to_sign = Some(resources.sample_pdf().await?);
        }
    }
    Ok(())
}

/// XAdES request over the whole sample XML, the signature element appended
/// to the sample's placeholder. `with_certificate` selects the server key
/// flow.
pub async fn full_xml_request(
    resources: &Resources,
    security_context: SecurityContext,
    with_certificate: bool,
) -> Result<FullXmlSignatureRequest, FlowError> {
    let mut request = FullXmlSignatureRequest::new(
        resources.sample_xml().await?,
        SignaturePolicy::XadesBes,
        security_context,
    );
    request.signature_element_location = Some(SignatureElementLocation {
        x_path: SIGNATURE_PLACEHOLDER.to_string(),
        insertion_option: XmlInsertionOption::AppendChild,
        namespaces: vec![NamespaceModel {
            prefix: SAMPLE_NAMESPACE_PREFIX.to_string(),
            uri: SAMPLE_NAMESPACE_URI.to_string(),
        }],
    });
    if with_certificate {
        request.certificate = Some(resources.signer_certificate().await?);
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    fn fixtures() -> Resources {
        Resources::new(concat!(env!("CARGO_MANIFEST_DIR"), "/resources"))
    }

    #[test]
    fn userfile_takes_precedence() {
        let source = ContentSource::from_query(Some("a.pdf".into()), Some("b.p7s".into()));
        assert_eq!(source, ContentSource::UserFile("a.pdf".into()));
    }

    #[test]
    fn cmsfile_selects_co_signing() {
        let source = ContentSource::from_query(None, Some("b.p7s".into()));
        assert_eq!(source, ContentSource::CoSign("b.p7s".into()));
    }

    #[test]
    fn no_arguments_selects_sample() {
        assert_eq!(ContentSource::from_query(None, None), ContentSource::SampleDocument);
    }

    #[tokio::test]
    async fn server_key_request_signs_sample_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let resources = fixtures();
        let request = cades_server_key_request(
            &resources,
            &AppDataStorage::new(dir.path()),
            &ContentSource::SampleDocument,
            SecurityContext::LacunaTest,
        )
        .await
        .unwrap();

        assert_eq!(request.signature_policy_id, SignaturePolicy::PkiBrazilCadesAdrBasica);
        assert_eq!(request.encapsulate_content, Some(true));
        assert_eq!(request.certificate, Some(resources.signer_certificate().await.unwrap()));
        assert_eq!(request.content_to_sign, Some(resources.sample_pdf().await.unwrap()));
        assert!(request.cms_to_co_sign.is_none());
    }

    #[tokio::test]
    async fn co_sign_request_carries_cms_only() {
        let dir = tempfile::tempdir().unwrap();
        let storage = AppDataStorage::new(dir.path());
        let cms = storage.store(b"previous cms", "p7s").await.unwrap();

        let request = cades_server_key_request(
            &fixtures(),
            &storage,
            &ContentSource::CoSign(cms),
            SecurityContext::LacunaTest,
        )
        .await
        .unwrap();

        assert_eq!(request.cms_to_co_sign.as_deref(), Some(&b"previous cms"[..]));
        assert!(request.content_to_sign.is_none());
    }

    #[tokio::test]
    async fn web_request_has_no_certificate() {
        let dir = tempfile::tempdir().unwrap();
        let request = cades_web_request(
            &fixtures(),
            &AppDataStorage::new(dir.path()),
            &ContentSource::SampleDocument,
            SecurityContext::WindowsServer,
        )
        .await
        .unwrap();

        assert!(request.certificate.is_none());
        assert_eq!(request.signature_policy_id, SignaturePolicy::CadesBes);
        assert_eq!(request.security_context_id, SecurityContext::WindowsServer);
    }

    #[tokio::test]
    async fn missing_user_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let error = cades_web_request(
            &fixtures(),
            &AppDataStorage::new(dir.path()),
            &ContentSource::UserFile("nope.pdf".into()),
            SecurityContext::LacunaTest,
        )
        .await
        .unwrap_err();

        assert!(matches!(error, FlowError::Storage(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn xml_request_targets_placeholder() {
        let request = full_xml_request(&fixtures(), SecurityContext::LacunaTest, false)
            .await
            .unwrap();

        let location = request.signature_element_location.unwrap();
        assert_eq!(location.x_path, SIGNATURE_PLACEHOLDER);
        assert_eq!(location.insertion_option, XmlInsertionOption::AppendChild);
        assert_eq!(location.namespaces[0].uri, SAMPLE_NAMESPACE_URI);
        assert!(request.certificate.is_none());
    }

    #[tokio::test]
    async fn xml_server_key_request_has_certificate() {
        let request = full_xml_request(&fixtures(), SecurityContext::LacunaTest, true)
            .await
            .unwrap();
        assert!(request.certificate.is_some());
    }
}
