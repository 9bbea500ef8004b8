//! Admin console
//!
//! Raw CRUD over any resource. Inputs are the text the admin typed; results
//! are kept as untyped JSON for display.

use serde_json::Value;

use crate::api::{IncubatorClient, Resource};
use crate::transport::ApiResult;

pub const DEFAULT_SKIP: u32 = 0;
pub const DEFAULT_LIMIT: u32 = 20;

/// Console state: selected resource, inputs, last results
#[derive(Debug, Clone)]
pub struct AdminConsole {
    pub resource: Resource,

    // Inputs
    pub id: String,
    pub skip: String,
    pub limit: String,
    pub payload: String,

    // Outputs
    pub list_result: Option<Value>,
    pub item_result: Option<Value>,
    pub action_result: Option<Value>,
    pub error: Option<String>,
    pub loading: bool,
}

impl Default for AdminConsole {
    fn default() -> Self {
        Self {
            resource: Resource::Startups,
            id: String::new(),
            skip: DEFAULT_SKIP.to_string(),
            limit: DEFAULT_LIMIT.to_string(),
            payload: "{\n  \n}".to_string(),
            list_result: None,
            item_result: None,
            action_result: None,
            error: None,
            loading: false,
        }
    }
}

impl AdminConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch resource and drop results of the previous one
    pub fn select(&mut self, resource: Resource) {
        self.resource = resource;
        self.clear_results();
    }

    pub fn clear_results(&mut self) {
        self.list_result = None;
        self.item_result = None;
        self.action_result = None;
        self.error = None;
    }

    /// Skip and limit from the inputs; anything unparseable or zero falls
    /// back to the defaults
    pub fn page(&self) -> (u32, u32) {
        let skip = self.skip.trim().parse().unwrap_or(DEFAULT_SKIP);
        let limit = match self.limit.trim().parse() {
            Ok(0) | Err(_) => DEFAULT_LIMIT,
            Ok(limit) => limit,
        };
        (skip, limit)
    }

    pub async fn list(&mut self, client: &IncubatorClient) {
        self.clear_results();
        let (skip, limit) = self.page();
        let resource = self.resource;

        let result = self
            .run(client.list::<Value>(resource, Some(skip), Some(limit)))
            .await;
        if let Some(items) = result {
            self.list_result = Some(Value::Array(items));
        }
    }

    pub async fn get_by_id(&mut self, client: &IncubatorClient) {
        self.clear_results();
        let Some(id) = self.require_id("Please enter a valid ID.") else {
            return;
        };
        let resource = self.resource;

        if let Some(item) = self.run(client.get::<Value>(resource, id)).await {
            self.item_result = Some(item);
        }
    }

    pub async fn create(&mut self, client: &IncubatorClient) {
        self.clear_results();
        let Some(payload) = self.parse_payload() else {
            return;
        };
        let resource = self.resource;

        if let Some(created) = self
            .run(client.create::<_, Value>(resource, &payload))
            .await
        {
            self.action_result = Some(created);
        }
    }

    pub async fn update(&mut self, client: &IncubatorClient) {
        self.clear_results();
        let Some(id) = self.require_id("Please enter a valid ID to update.") else {
            return;
        };
        let Some(payload) = self.parse_payload() else {
            return;
        };
        let resource = self.resource;

        if let Some(updated) = self
            .run(client.update::<_, Value>(resource, id, &payload))
            .await
        {
            self.action_result = Some(updated);
        }
    }

    pub async fn delete(&mut self, client: &IncubatorClient) {
        self.clear_results();
        let Some(id) = self.require_id("Please enter a valid ID to delete.") else {
            return;
        };
        let resource = self.resource;

        if let Some(deleted) = self.run(client.delete(resource, id)).await {
            self.action_result = Some(deleted);
        }
    }

    /// Parse the payload input; failures become the console error
    pub fn parse_payload(&mut self) -> Option<Value> {
        if self.payload.trim().is_empty() {
            self.error = Some("Please provide a JSON payload.".to_string());
            return None;
        }

        match serde_json::from_str(&self.payload) {
            Ok(value) => Some(value),
            Err(e) => {
                self.error = Some(format!("Invalid JSON payload: {}", e));
                None
            }
        }
    }

    fn require_id(&mut self, message: &str) -> Option<u64> {
        match self.id.trim().parse() {
            Ok(id) => Some(id),
            Err(_) => {
                self.error = Some(message.to_string());
                None
            }
        }
    }

    async fn run<T>(&mut self, call: impl std::future::Future<Output = ApiResult<T>>) -> Option<T> {
        self.loading = true;
        let result = call.await;
        self.loading = false;

        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(resource = %self.resource, error = %e, "Admin action failed");
                self.error = Some(e.user_message());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{serve, StubResponse};
    use crate::transport::{HttpTransport, TransportConfig};
    use std::sync::Arc;

    fn client_for(base_url: String) -> IncubatorClient {
        let config = TransportConfig {
            base_url,
            ..TransportConfig::default()
        };
        IncubatorClient::new(Arc::new(HttpTransport::new(config).unwrap()))
    }

    #[test]
    fn test_page_defaults() {
        let mut console = AdminConsole::new();
        assert_eq!(console.page(), (0, 20));

        console.skip = "40".to_string();
        console.limit = "0".to_string();
        assert_eq!(console.page(), (40, 20));

        console.limit = "abc".to_string();
        assert_eq!(console.page(), (40, 20));
    }

    #[test]
    fn test_invalid_payload_message() {
        let mut console = AdminConsole::new();
        console.payload = "{ not json".to_string();
        assert!(console.parse_payload().is_none());
        assert!(console
            .error
            .as_deref()
            .unwrap()
            .starts_with("Invalid JSON payload:"));

        console.payload = "   ".to_string();
        assert!(console.parse_payload().is_none());
        assert_eq!(console.error.as_deref(), Some("Please provide a JSON payload."));
    }

    #[tokio::test]
    async fn test_missing_id_sends_nothing() {
        let (base, _requests) = serve(vec![]).await;
        let client = client_for(base);

        let mut console = AdminConsole::new();
        console.delete(&client).await;
        assert_eq!(console.error.as_deref(), Some("Please enter a valid ID to delete."));
        assert!(console.action_result.is_none());
    }

    #[tokio::test]
    async fn test_list_uses_selected_resource() {
        let (base, mut requests) =
            serve(vec![StubResponse::json(200, r#"[{"id": 1, "name": "Fund"}]"#)]).await;
        let client = client_for(base);

        let mut console = AdminConsole::new();
        console.select(Resource::Investors);
        console.skip = "10".to_string();
        console.list(&client).await;

        assert!(console.error.is_none());
        assert_eq!(console.list_result.as_ref().and_then(|v| v.as_array()).map(|a| a.len()), Some(1));

        let request = requests.recv().await.unwrap();
        assert!(request.starts_with("GET /investors?skip=10&limit=20 HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_create_and_error() {
        let (base, mut requests) = serve(vec![
            StubResponse::json(200, r#"{"id": 5, "title": "Hello"}"#),
            StubResponse::json(422, r#"{"detail": [{"loc": ["body", "title"], "msg": "field required", "type": "missing"}]}"#),
        ])
        .await;
        let client = client_for(base);

        let mut console = AdminConsole::new();
        console.select(Resource::News);
        console.payload = r#"{"title": "Hello"}"#.to_string();
        console.create(&client).await;
        assert_eq!(console.action_result.as_ref().map(|v| v["id"].clone()), Some(Value::from(5)));

        let post = requests.recv().await.unwrap();
        assert!(post.starts_with("POST /news HTTP/1.1"));

        console.payload = "{}".to_string();
        console.create(&client).await;
        assert!(console.action_result.is_none());
        assert!(console.error.as_deref().unwrap().contains("field required"));
    }
}
