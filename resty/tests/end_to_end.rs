//! End-to-end tests against a local mock server.

use std::sync::Arc;

use bytes::Bytes;
use resty::serialization::{DecodeTarget, ResponseDeserializer};
use resty::{
    ContentType, ErrorKind, RequestBody, RestClient, RestConfiguration, RestError, RestUri,
    ValidationError,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use wiremock::matchers::{body_bytes, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Default, PartialEq, Deserialize)]
struct Account {
    id: u64,
    email: String,
}

/// Decodes `key=value` lines into an object.
#[derive(Debug)]
struct KeyValueDeserializer;

impl ResponseDeserializer for KeyValueDeserializer {
    fn deserialize(
        &self,
        content: &str,
        target: &mut dyn DecodeTarget,
    ) -> Result<(), ValidationError> {
        let object: Map<String, Value> = content
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| {
                let value = value
                    .trim()
                    .parse::<u64>()
                    .map(Value::from)
                    .unwrap_or_else(|_| Value::from(value.trim()));
                (key.trim().to_string(), value)
            })
            .collect();
        target.decode_value(Value::Object(object))
    }
}

#[test]
fn test_relative_resource_joins_base_path() {
    let uri = RestUri::with_resource("http://localhost/api", "/account").unwrap();
    assert_eq!(uri.render(), "http://localhost/api/account");
}

#[test]
fn test_template_parameters_are_escaped() {
    let uri = RestUri::with_resource("http://localhost/api", "account/{id}/{email}")
        .unwrap()
        .set_parameter("id", 1)
        .set_parameter("email", "a@b.com");
    assert_eq!(uri.render_path(), "/api/account/1/a%40b.com");
}

#[test]
fn test_raw_bytes_render() {
    let config = RestConfiguration::default();
    let body = RequestBody::raw(vec![0xFF, 0x00, 0x41]);

    let bytes = body.render_bytes(&ContentType::OCTET_STREAM, &config).unwrap();
    assert_eq!(bytes.as_ref(), &[0xFF_u8, 0x00, 0x41][..]);

    let text = body.render_string(&ContentType::OCTET_STREAM, &config).unwrap();
    assert_eq!(text, "?\u{0}A");
}

#[tokio::test]
async fn test_raw_bytes_reach_the_server_unchanged() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/blob"))
        .and(header("content-type", "application/octet-stream"))
        .and(body_bytes(vec![0xFF, 0x00, 0x41]))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = RestClient::new().unwrap();
    let response = client
        .put(RestUri::with_resource(&mock_server.uri(), "blob").unwrap())
        .content_type(ContentType::OCTET_STREAM)
        .body(Bytes::from_static(&[0xFF, 0x00, 0x41]))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), Some(201));
}

#[tokio::test]
async fn test_yaml_response_with_cookies() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/x-yaml; charset=utf-8")
                .append_header("set-cookie", "session=abc; Path=/; HttpOnly")
                .set_body_raw("id: 4\nemail: y@ml.org\n", "application/x-yaml; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    let client = RestClient::new().unwrap();
    let response = client
        .get(RestUri::with_resource(&mock_server.uri(), "me").unwrap())
        .send_typed::<Account>()
        .await
        .unwrap();

    let session = response.cookie("session").unwrap();
    assert_eq!(session.value(), "abc");
    assert!(session.is_http_only());
    assert_eq!(response.charset(), Some("utf-8"));
    assert_eq!(
        response.data().await.unwrap(),
        Account {
            id: 4,
            email: "y@ml.org".to_string()
        }
    );
}

#[tokio::test]
async fn test_registered_deserializer_is_used() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/account"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/x-key-value")
                .set_body_raw("id = 12\nemail = kv@example.com\n", "text/x-key-value"),
        )
        .mount(&mock_server)
        .await;

    let mut config = RestConfiguration::default();
    config.register_deserializer(
        ContentType::new("text/x-key-value").unwrap(),
        Arc::new(KeyValueDeserializer),
    );
    let client = RestClient::builder()
        .configuration(Arc::new(config))
        .build()
        .unwrap();

    let response = client
        .get(RestUri::with_resource(&mock_server.uri(), "account").unwrap())
        .send_typed::<Account>()
        .await
        .unwrap();

    assert_eq!(response.data().await.unwrap().id, 12);
}

#[tokio::test]
async fn test_unregistered_response_type_fails_on_data() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/x-key-value")
                .set_body_string("id = 12\n"),
        )
        .mount(&mock_server)
        .await;

    let client = RestClient::new().unwrap();
    let response = client
        .get(RestUri::new(&mock_server.uri()).unwrap())
        .send_typed::<Account>()
        .await
        .unwrap();

    assert!(response.is_success());
    let err = response.data().await.unwrap_err();
    assert!(err.is_unsupported_content_type());
}

#[tokio::test]
async fn test_ensure_success_reports_status_and_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(409).set_body_string("still referenced"))
        .mount(&mock_server)
        .await;

    let client = RestClient::new().unwrap();
    let response = client
        .delete(RestUri::with_resource(&mock_server.uri(), "account/7").unwrap())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status_code(), 409);
    assert_eq!(response.description(), "Conflict");

    let Err(RestError::Response(error)) = response.ensure_success().await else {
        panic!("expected a response error");
    };
    assert_eq!(error.kind(), ErrorKind::NonSuccessStatus);
    assert_eq!(error.body(), Some("still referenced"));
}

#[tokio::test]
async fn test_body_stream_is_read_once() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("payload"))
        .mount(&mock_server)
        .await;

    let client = RestClient::new().unwrap();
    let response = client
        .get(RestUri::new(&mock_server.uri()).unwrap())
        .send()
        .await
        .unwrap();

    let body = response.body();
    assert_eq!(body.read_as_string().await, "payload");
    assert_eq!(body.read_as_bytes().await.as_ref(), b"payload");

    body.dispose();
    assert!(body.is_disposed());
    assert_eq!(body.read_as_string().await, "payload");
}

#[tokio::test]
async fn test_download_copies_body_and_reports_entity_headers() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/report.csv"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("server", "reports/2")
                .insert_header("last-modified", "Tue, 01 Sep 2026 10:00:00 GMT")
                .set_body_string("id,email\n1,a@b.com\n"),
        )
        .mount(&mock_server)
        .await;

    let client = RestClient::new().unwrap();
    let response = client
        .get(RestUri::with_resource(&mock_server.uri(), "report.csv").unwrap())
        .send()
        .await
        .unwrap();

    assert_eq!(response.server(), Some("reports/2"));
    assert_eq!(response.last_modified(), Some("Tue, 01 Sep 2026 10:00:00 GMT"));
    assert_eq!(response.content_encoding(), None);

    let mut file: Vec<u8> = Vec::new();
    response.body().copy_to(&mut file).await.unwrap();
    assert_eq!(file, b"id,email\n1,a@b.com\n");
}
