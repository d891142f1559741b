//! Thin REST client for the Notion API.

use crate::error::{Error, Result};
use crate::utils::truncate_for_log;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

const NOTION_API: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct NotionClient {
    http: reqwest::Client,
    base: String,
}

impl NotionClient {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base(token, NOTION_API)
    }

    fn with_base(token: &str, base: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| Error::Config("token contains invalid header characters".into()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, base: base.to_string() })
    }

    /// Fetch the database schema as a property name → type map.
    pub async fn retrieve_database(&self, database_id: &str) -> Result<HashMap<String, String>> {
        let url = format!("{}/databases/{}", self.base, database_id);
        debug!(%url, "Retrieving database schema");
        let response = self.http.get(&url).send().await?;
        let body: Value = check(response).await?.json().await?;
        Ok(parse_schema(&body))
    }

    /// Create a page in the database with up to 100 initial child blocks.
    ///
    /// Returns the id of the created page.
    pub async fn create_page(
        &self,
        database_id: &str,
        properties: Value,
        children: Vec<Value>,
    ) -> Result<String> {
        let url = format!("{}/pages", self.base);
        let payload = json!({
            "parent": { "database_id": database_id },
            "properties": properties,
            "children": children,
        });
        let response = self.http.post(&url).json(&payload).send().await?;
        let body: Value = check(response).await?.json().await?;
        body["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::Upload("create page response carries no id".into()))
    }

    /// Append up to 100 child blocks to an existing page.
    pub async fn append_blocks(&self, page_id: &str, children: Vec<Value>) -> Result<()> {
        let url = format!("{}/blocks/{}/children", self.base, page_id);
        let payload = json!({ "children": children });
        let response = self.http.patch(&url).json(&payload).send().await?;
        check(response).await?;
        Ok(())
    }
}

/// Map API failures onto [`Error::Upload`] with a useful message.
async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = match status.as_u16() {
        401 | 403 => "check the integration token and database sharing",
        404 => "database or page not found",
        _ => "API request failed",
    };
    let body = response.text().await.unwrap_or_default();
    Err(Error::Upload(format!(
        "{status}: {detail} ({})",
        truncate_for_log(&body, 200)
    )))
}

fn parse_schema(database: &Value) -> HashMap<String, String> {
    database["properties"]
        .as_object()
        .map(|props| {
            props
                .iter()
                .filter_map(|(name, prop)| {
                    prop["type"].as_str().map(|t| (name.clone(), t.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_schema_maps_names_to_types() {
        let database = json!({
            "object": "database",
            "properties": {
                "Name": { "id": "title", "type": "title", "title": {} },
                "URL": { "id": "abcd", "type": "url", "url": {} },
                "Теги": { "id": "efgh", "type": "multi_select", "multi_select": { "options": [] } },
            },
        });
        let schema = parse_schema(&database);
        assert_eq!(schema.get("Name").map(String::as_str), Some("title"));
        assert_eq!(schema.get("URL").map(String::as_str), Some("url"));
        assert_eq!(schema.get("Теги").map(String::as_str), Some("multi_select"));
    }

    #[test]
    fn test_parse_schema_tolerates_missing_properties() {
        assert!(parse_schema(&json!({ "object": "error" })).is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_upload_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let body = r#"{"object":"error","status":401,"code":"unauthorized"}"#;
            let response = format!(
                "HTTP/1.1 401 Unauthorized\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
        });

        let client =
            NotionClient::with_base("secret_test", &format!("http://{addr}")).unwrap();
        let err = client.retrieve_database("db").await.unwrap_err();
        match err {
            Error::Upload(msg) => assert!(msg.contains("integration token"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
