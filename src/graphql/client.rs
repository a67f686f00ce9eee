use futures::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiConfig;

use super::error::ClientError;
use super::wire::{GraphqlRequest, GraphqlResponse};

/// Something that can execute a GraphQL request.
///
/// The returned future owns everything it needs, so callers may share it
/// between tasks.
pub trait GraphqlTransport: Send + Sync {
  fn execute(&self, request: GraphqlRequest) -> BoxFuture<'static, Result<Value, ClientError>>;
}

/// GraphQL client for the marketplace API.
#[derive(Clone)]
pub struct GraphqlClient {
  http: reqwest::Client,
  endpoint: Url,
}

impl GraphqlClient {
  pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(token) = &config.token {
      let value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| ClientError::Network(format!("invalid API token: {}", e)))?;
      headers.insert(AUTHORIZATION, value);
    }

    let mut builder = reqwest::Client::builder()
      .default_headers(headers)
      .user_agent(concat!("souk/", env!("CARGO_PKG_VERSION")));

    if let Some(timeout) = config.timeout() {
      builder = builder.timeout(timeout);
    }

    let http = builder
      .build()
      .map_err(|e| ClientError::Network(format!("Failed to build HTTP client: {}", e)))?;

    Ok(Self {
      http,
      endpoint: config.graphql_endpoint.clone(),
    })
  }

  pub fn endpoint(&self) -> &Url {
    &self.endpoint
  }

  /// POST one query or mutation and return its `data` field.
  async fn post(&self, request: GraphqlRequest) -> Result<Value, ClientError> {
    debug!(endpoint = %self.endpoint, "POST graphql request");

    let response = self
      .http
      .post(self.endpoint.clone())
      .json(&request)
      .send()
      .await?;

    let status = response.status();
    let body = response.bytes().await?;

    decode_response(status, &body)
  }
}

impl GraphqlTransport for GraphqlClient {
  fn execute(&self, request: GraphqlRequest) -> BoxFuture<'static, Result<Value, ClientError>> {
    let client = self.clone();
    Box::pin(async move { client.post(request).await })
  }
}

/// Turn an HTTP status and body into the `data` payload or a typed error.
pub fn decode_response(status: StatusCode, body: &[u8]) -> Result<Value, ClientError> {
  if !status.is_success() {
    return Err(ClientError::Network(format!("HTTP {}", status)));
  }

  let response: GraphqlResponse = serde_json::from_slice(body)?;

  if let Some(first) = response.errors.as_ref().and_then(|errors| errors.first()) {
    warn!(message = %first.message, path = ?first.path, "GraphQL error response");
    return Err(ClientError::Remote(first.message.clone()));
  }

  Ok(response.data.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;

  /// Raw request as seen by the server: head (lowercased) and body.
  struct Captured {
    head: String,
    body: Value,
  }

  /// Accept one connection, answer with `reply` and return what was sent.
  async fn serve_once(listener: TcpListener, reply: &'static str) -> Captured {
    let (mut socket, _) = listener.accept().await.unwrap();
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let (head, body_start, body_len) = loop {
      let n = socket.read(&mut chunk).await.unwrap();
      assert!(n > 0, "client closed before sending a full request");
      buf.extend_from_slice(&chunk[..n]);
      if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
        let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
        let len = head
          .lines()
          .find_map(|l| l.strip_prefix("content-length:"))
          .map(|v| v.trim().parse::<usize>().unwrap())
          .unwrap_or(0);
        break (head, pos + 4, len);
      }
    };

    while buf.len() < body_start + body_len {
      let n = socket.read(&mut chunk).await.unwrap();
      assert!(n > 0, "client closed before sending the body");
      buf.extend_from_slice(&chunk[..n]);
    }

    let response = format!(
      "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
      reply.len(),
      reply
    );
    socket.write_all(response.as_bytes()).await.unwrap();
    socket.shutdown().await.unwrap();

    Captured {
      head,
      body: serde_json::from_slice(&buf[body_start..body_start + body_len]).unwrap(),
    }
  }

  fn client_for(addr: std::net::SocketAddr) -> GraphqlClient {
    let endpoint = Url::parse(&format!("http://{}/graphql", addr)).unwrap();
    GraphqlClient::new(&ApiConfig::new(endpoint)).unwrap()
  }

  #[tokio::test]
  async fn test_posts_json_envelope_to_endpoint() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let client = client_for(listener.local_addr().unwrap());
    let server = tokio::spawn(serve_once(listener, r#"{"data":{"categories":[]}}"#));

    let data = client
      .execute(GraphqlRequest::new(
        "query Categories { categories { id } }",
        json!({"first": 10}),
      ))
      .await
      .unwrap();
    let captured = server.await.unwrap();

    assert_eq!(data, json!({"categories": []}));
    assert!(captured.head.starts_with("post /graphql http/1.1"));
    assert!(captured
      .head
      .lines()
      .any(|l| l.trim() == "content-type: application/json"));
    assert_eq!(
      captured.body,
      json!({"query": "query Categories { categories { id } }", "variables": {"first": 10}})
    );
  }

  #[tokio::test]
  async fn test_refused_connection_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client_for(addr)
      .execute(GraphqlRequest::new("{ ping }", Value::Null))
      .await
      .unwrap_err();

    assert!(err.is_network(), "unexpected error: {:?}", err);
  }

  #[test]
  fn test_data_is_returned() {
    let body = br#"{"data":{"categories":[{"id":"1"}]}}"#;
    let data = decode_response(StatusCode::OK, body).unwrap();
    assert_eq!(data, json!({"categories": [{"id": "1"}]}));
  }

  #[test]
  fn test_first_error_message_wins() {
    let body = br#"{"data":null,"errors":[{"message":"Not authorized"},{"message":"second"}]}"#;
    let err = decode_response(StatusCode::OK, body).unwrap_err();
    assert_eq!(err, ClientError::Remote("Not authorized".to_string()));
  }

  #[test]
  fn test_empty_errors_array_is_success() {
    let body = br#"{"data":{"ok":true},"errors":[]}"#;
    let data = decode_response(StatusCode::OK, body).unwrap();
    assert_eq!(data, json!({"ok": true}));
  }

  #[test]
  fn test_non_success_status_is_network_error() {
    let body = br#"{"errors":[{"message":"boom"}]}"#;
    let err = decode_response(StatusCode::BAD_GATEWAY, body).unwrap_err();
    assert!(err.is_network());
  }

  #[test]
  fn test_garbage_body_is_decode_error() {
    let err = decode_response(StatusCode::OK, b"<html>oops</html>").unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
  }

  #[test]
  fn test_missing_data_is_null() {
    let data = decode_response(StatusCode::OK, b"{}").unwrap();
    assert_eq!(data, Value::Null);
  }

  #[test]
  fn test_null_variables_become_empty_object() {
    let request = GraphqlRequest::new("{ ping }", Value::Null);
    assert_eq!(request.variables, json!({}));
    let body = serde_json::to_value(&request).unwrap();
    assert_eq!(body, json!({"query": "{ ping }", "variables": {}}));
  }
}
