use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ServiceError;
use crate::requests::{BatchUpdate, DocsOptions, Request, insert_text, to_docs_requests};
use crate::service::{DocumentHandle, DocumentService};
use crate::style::StyleOperation;

pub const DEFAULT_API_BASE: &str = "https://docs.googleapis.com/v1";

/// Google Docs REST client authenticated with an OAuth bearer token.
pub struct GoogleDocsClient {
    api_base: String,
    token: String,
    client: Client,
    options: DocsOptions,
}

#[derive(Serialize)]
struct CreateDocument<'a> {
    title: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedDocument {
    document_id: Option<String>,
}

impl GoogleDocsClient {
    pub fn new(token: String) -> Self {
        Self::with_api_base(token, DEFAULT_API_BASE.to_string())
    }

    pub fn with_api_base(token: String, api_base: String) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
            client: Client::new(),
            options: DocsOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DocsOptions) -> Self {
        self.options = options;
        self
    }

    fn post<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<Response, ServiceError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().unwrap_or_default();
            return Err(ServiceError::Api { status, message });
        }
        Ok(response)
    }

    fn batch_update(
        &self,
        document: &DocumentHandle,
        requests: Vec<Request>,
    ) -> Result<(), ServiceError> {
        if requests.is_empty() {
            return Ok(());
        }
        let url = format!("{}/documents/{}:batchUpdate", self.api_base, document.id);
        debug!(requests = requests.len(), document = %document.id, "sending batchUpdate");
        self.post(&url, &BatchUpdate { requests })?;
        Ok(())
    }
}

impl DocumentService for GoogleDocsClient {
    fn create(&mut self, title: &str) -> Result<DocumentHandle, ServiceError> {
        let url = format!("{}/documents", self.api_base);
        let created: CreatedDocument = self.post(&url, &CreateDocument { title })?.json()?;
        let id = created
            .document_id
            .ok_or(ServiceError::MissingField("documentId"))?;
        let handle = DocumentHandle::new(id);
        info!(url = %handle.url, %title, "created document");
        Ok(handle)
    }

    fn insert_text(
        &mut self,
        document: &DocumentHandle,
        index: usize,
        text: &str,
    ) -> Result<(), ServiceError> {
        self.batch_update(document, vec![insert_text(index, text)])
    }

    fn apply_styles(
        &mut self,
        document: &DocumentHandle,
        ops: &[StyleOperation],
    ) -> Result<(), ServiceError> {
        let requests = to_docs_requests(ops, &self.options);
        info!(requests = requests.len(), "applying formatting");
        self.batch_update(document, requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_base_drops_trailing_slash() {
        let client =
            GoogleDocsClient::with_api_base("t".to_string(), "http://localhost/v1/".into());
        assert_eq!(client.api_base, "http://localhost/v1");
    }

    #[test]
    fn created_document_reads_camel_case_id() {
        let created: CreatedDocument =
            serde_json::from_str(r#"{"documentId": "abc", "title": "T"}"#).unwrap();
        assert_eq!(created.document_id.as_deref(), Some("abc"));
    }

    #[test]
    fn create_body_has_title() {
        let json = serde_json::to_value(CreateDocument { title: "Sync" }).unwrap();
        assert_eq!(json, serde_json::json!({"title": "Sync"}));
    }

    mod http_tests {
        use super::*;
        use crate::block::HeadingLevel;
        use crate::layout::TextRange;
        use crate::style::ParagraphStyle;
        use serde_json::json;
        use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

        const TOKEN: &str = "test-token";

        /// The blocking client owns its own runtime, so it is built, used and
        /// dropped off the async test thread.
        async fn with_client<T, F>(server: &MockServer, f: F) -> T
        where
            T: Send + 'static,
            F: FnOnce(&mut GoogleDocsClient) -> T + Send + 'static,
        {
            let api_base = format!("{}/v1", server.uri());
            tokio::task::spawn_blocking(move || {
                let mut client = GoogleDocsClient::with_api_base(TOKEN.to_string(), api_base);
                f(&mut client)
            })
            .await
            .unwrap()
        }

        fn handle() -> DocumentHandle {
            DocumentHandle::new("doc-1".to_string())
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn create_posts_title_and_reads_id() {
            let server = MockServer::start().await;
            Mock::given(matchers::method("POST"))
                .and(matchers::path("/v1/documents"))
                .and(matchers::header("authorization", "Bearer test-token"))
                .and(matchers::body_json(json!({"title": "Sync"})))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({"documentId": "doc-1", "title": "Sync"})),
                )
                .expect(1)
                .mount(&server)
                .await;

            let handle = with_client(&server, |client| client.create("Sync"))
                .await
                .unwrap();
            assert_eq!(handle.id, "doc-1");
            assert_eq!(handle.url, "https://docs.google.com/document/d/doc-1/edit");
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn create_without_document_id() {
            let server = MockServer::start().await;
            Mock::given(matchers::method("POST"))
                .and(matchers::path("/v1/documents"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "Sync"})))
                .mount(&server)
                .await;

            let result = with_client(&server, |client| client.create("Sync")).await;
            assert!(matches!(
                result,
                Err(ServiceError::MissingField("documentId"))
            ));
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn create_rate_limited() {
            let server = MockServer::start().await;
            Mock::given(matchers::method("POST"))
                .and(matchers::path("/v1/documents"))
                .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
                .mount(&server)
                .await;

            let result = with_client(&server, |client| client.create("Sync")).await;
            match result {
                Err(ServiceError::Api { status, message }) => {
                    assert_eq!(status, 429);
                    assert!(message.contains("quota exceeded"));
                }
                other => panic!("expected an API error, got {other:?}"),
            }
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn insert_text_sends_batch_update() {
            let server = MockServer::start().await;
            Mock::given(matchers::method("POST"))
                .and(matchers::path("/v1/documents/doc-1:batchUpdate"))
                .and(matchers::header("authorization", "Bearer test-token"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
                .expect(1)
                .mount(&server)
                .await;

            with_client(&server, |client| client.insert_text(&handle(), 1, "Sync\n"))
                .await
                .unwrap();

            let received = server.received_requests().await.unwrap();
            let body: serde_json::Value = received[0].body_json().unwrap();
            assert_eq!(
                body,
                json!({"requests": [
                    {"insertText": {"location": {"index": 1}, "text": "Sync\n"}}
                ]})
            );
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn forbidden_styling_is_an_api_error() {
            let server = MockServer::start().await;
            Mock::given(matchers::method("POST"))
                .and(matchers::path("/v1/documents/doc-1:batchUpdate"))
                .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
                .expect(1)
                .mount(&server)
                .await;

            let ops = vec![StyleOperation::Paragraph {
                range: TextRange::new(1, 5),
                style: ParagraphStyle::Heading(HeadingLevel::H1),
            }];
            let result =
                with_client(&server, move |client| client.apply_styles(&handle(), &ops)).await;
            assert!(matches!(
                result,
                Err(ServiceError::Api { status: 403, .. })
            ));
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn no_operations_sends_nothing() {
            let server = MockServer::start().await;
            Mock::given(matchers::any())
                .respond_with(ResponseTemplate::new(200))
                .expect(0)
                .mount(&server)
                .await;

            with_client(&server, |client| client.apply_styles(&handle(), &[]))
                .await
                .unwrap();
        }
    }
}
