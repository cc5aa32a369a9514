//! Integration tests for bibresolve
//!
//! These tests run full lookups through the resolver and the HTTP endpoint
//! against mocked upstream services.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use bibresolve::config::Config;
use bibresolve::server::{router, ErrorResponse, METADATA_PATH};
use bibresolve::{Authors, Metadata, Resolver, SourceError};
use lopdf::{dictionary, Document, Object, Stream};
use mockito::{Matcher, Server, ServerGuard};
use std::sync::Arc;
use tower::ServiceExt;

/// Configuration pointing every upstream at the mock server
fn mock_config(server: &ServerGuard) -> Config {
    let mut config = Config::default();
    config.upstream.doi_api_url = format!("{}/api/handles", server.url());
    config.upstream.arxiv_api_url = format!("{}/api/query", server.url());
    config.upstream.openlibrary_api_url = format!("{}/api/books", server.url());
    config.upstream.trusted_pdf_origin = format!("{}/storage", server.url());
    config
}

fn resolver(server: &ServerGuard) -> Arc<Resolver> {
    Arc::new(Resolver::from_config(&mock_config(server)).unwrap())
}

/// A minimal one-page PDF with optional info entries and XMP packet
fn build_pdf(title: Option<&str>, author: Option<&str>, xmp: Option<&str>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    if let Some(xmp) = xmp {
        let metadata_id = doc.add_object(Stream::new(
            dictionary! { "Type" => "Metadata", "Subtype" => "XML" },
            xmp.as_bytes().to_vec(),
        ));
        catalog.set("Metadata", metadata_id);
    }
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);

    let mut info = lopdf::Dictionary::new();
    if let Some(title) = title {
        info.set("Title", Object::string_literal(title));
    }
    if let Some(author) = author {
        info.set("Author", Object::string_literal(author));
    }
    let info_id = doc.add_object(info);
    doc.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn metadata_uri(url: &str) -> String {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("url", url)
        .finish();
    format!("{}?{}", METADATA_PATH, query)
}

#[tokio::test]
async fn test_resolve_isbn_end_to_end() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/books")
        .match_query(Matcher::UrlEncoded(
            "bibkeys".into(),
            "ISBN:0451526538".into(),
        ))
        .with_header("content-type", "application/json")
        .with_body(r#"{"ISBN:0451526538": {"title": "1984", "authors": [{"name": "George Orwell"}]}}"#)
        .create_async()
        .await;

    let metadata = resolver(&server)
        .resolve("https://openlibrary.org/isbn/ISBN:0451526538")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(
        metadata,
        Metadata::new(
            Some("1984".to_string()),
            Some(Authors::from_names(["George Orwell"]))
        )
    );
}

#[tokio::test]
async fn test_resolve_doi_without_creator() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/handles/182")
        .with_header("content-type", "application/json")
        .with_body(r#"{"responseCode": 1, "values": [{"type": "HS_TITLE", "data": {"value": "DOI Handbook"}}]}"#)
        .create_async()
        .await;

    let metadata = resolver(&server)
        .resolve("https://doi.org/10.1000/182")
        .await
        .unwrap();

    assert_eq!(metadata.title.as_deref(), Some("DOI Handbook"));
    assert_eq!(metadata.authors, None);
}

#[tokio::test]
async fn test_doi_url_containing_isbn_goes_to_registry() {
    let mut server = Server::new_async().await;
    let handles = server
        .mock("GET", "/api/handles/handle")
        .with_header("content-type", "application/json")
        .with_body(r#"{"responseCode": 1, "values": []}"#)
        .create_async()
        .await;
    let books = server
        .mock("GET", "/api/books")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let metadata = resolver(&server)
        .resolve("https://doi.org/ISBN:123/handle")
        .await
        .unwrap();

    handles.assert_async().await;
    books.assert_async().await;
    assert_eq!(metadata, Metadata::default());
}

#[tokio::test]
async fn test_resolve_arxiv_pdf_url() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/query")
        .match_query(Matcher::UrlEncoded("id_list".into(), "1234.5678".into()))
        .with_body(
            r#"<feed xmlns="http://www.w3.org/2005/Atom"><entry>
                <title>A Paper</title>
                <author><name>One</name></author>
                <author><name>Two</name></author>
            </entry></feed>"#,
        )
        .create_async()
        .await;

    let metadata = resolver(&server)
        .resolve("https://arxiv.org/pdf/1234.5678.pdf")
        .await
        .unwrap();

    assert_eq!(metadata.title.as_deref(), Some("A Paper"));
    assert_eq!(metadata.authors, Some(Authors::from_names(["One", "Two"])));
}

#[tokio::test]
async fn test_resolve_arxiv_empty_feed() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/query")
        .match_query(Matcher::Any)
        .with_body(r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>ArXiv Query</title></feed>"#)
        .create_async()
        .await;

    let result = resolver(&server)
        .resolve("https://arxiv.org/abs/0000.00000")
        .await;

    assert!(matches!(result, Err(SourceError::ArxivNotFound)));
}

#[tokio::test]
async fn test_resolve_hosted_pdf_with_info_author() {
    let mut server = Server::new_async().await;
    let pdf = build_pdf(Some("Hosted Paper"), Some("A. Smith, B. Jones"), None);
    let _mock = server
        .mock("GET", "/storage/bucket/paper.pdf")
        .with_header("content-type", "application/pdf")
        .with_body(pdf)
        .create_async()
        .await;

    let url = format!("{}/storage/bucket/paper.pdf", server.url());
    let metadata = resolver(&server).resolve(&url).await.unwrap();

    assert_eq!(metadata.title.as_deref(), Some("Hosted Paper"));
    assert_eq!(
        metadata.authors,
        Some(Authors::from_names(["A. Smith", "B. Jones"]))
    );
}

#[tokio::test]
async fn test_resolve_hosted_pdf_with_dublin_core_creator() {
    let xmp = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about="" xmlns:dc="http://purl.org/dc/elements/1.1/">
      <dc:title><rdf:Alt><rdf:li xml:lang="x-default">Ignored Title</rdf:li></rdf:Alt></dc:title>
      <dc:creator><rdf:Seq><rdf:li>A. Smith</rdf:li><rdf:li> B. Jones </rdf:li></rdf:Seq></dc:creator>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>"#;
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/storage/dc.pdf")
        .with_body(build_pdf(None, None, Some(xmp)))
        .create_async()
        .await;

    let url = format!("{}/storage/dc.pdf", server.url());
    let metadata = resolver(&server).resolve(&url).await.unwrap();

    assert_eq!(metadata.title, None);
    assert_eq!(
        metadata.authors,
        Some(Authors::from_names(["A. Smith", "B. Jones"]))
    );
}

#[tokio::test]
async fn test_endpoint_success() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/books")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ISBN:0451526538": {"title": "1984", "authors": [{"name": "George Orwell"}]}}"#)
        .create_async()
        .await;

    let app = router(resolver(&server));
    let (status, body) = get(app, &metadata_uri("urn:ISBN:0451526538")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!({"title": "1984", "authors": ["George Orwell"]})
    );
}

#[tokio::test]
async fn test_endpoint_missing_url_is_bad_request() {
    let server = Server::new_async().await;
    let app = router(resolver(&server));

    let (status, body) = get(app.clone(), METADATA_PATH).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, serde_json::json!({"error": "Invalid URL parameter"}));

    let (status, _) = get(app, &format!("{}?url=a&url=b", METADATA_PATH)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_endpoint_unsupported_url_is_server_error() {
    let server = Server::new_async().await;
    let app = router(resolver(&server));

    let (status, body) = get(app, &metadata_uri("https://example.com/paper")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = serde_json::from_value(body).unwrap();
    assert_eq!(body.error, "Unsupported URL format");
}

#[tokio::test]
async fn test_endpoint_not_found_is_server_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/handles/missing")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"responseCode": 100, "handle": "10.1000/missing"}"#)
        .create_async()
        .await;

    let app = router(resolver(&server));
    let (status, body) = get(app, &metadata_uri("https://doi.org/10.1000/missing")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, serde_json::json!({"error": "DOI not found"}));
}

#[tokio::test]
async fn test_endpoint_upstream_garbage_is_server_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/books")
        .match_query(Matcher::Any)
        .with_body("<html>oops</html>")
        .create_async()
        .await;

    let app = router(resolver(&server));
    let (status, body) = get(app, &metadata_uri("ISBN:1")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().starts_with("Parse error"));
}
