//! Incubator REST API Client
//!
//! Typed facade over [`HttpTransport`]: one method per backend resource and
//! action. Methods never swallow errors.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use super::dto::*;
use super::resource::Resource;
use crate::cache::StartupSource;
use crate::transport::{ApiResult, HttpTransport, ImageBlob, Page};

/// Incubator backend client
#[derive(Clone)]
pub struct IncubatorClient {
    transport: Arc<HttpTransport>,
}

fn seg(value: impl ToString) -> String {
    urlencoding::encode(&value.to_string()).into_owned()
}

impl IncubatorClient {
    /// Create a client over a shared transport
    pub fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    // ============================================
    // Generic resource access
    // ============================================

    /// List one page of any resource
    pub async fn list<T: DeserializeOwned>(
        &self,
        resource: Resource,
        skip: Option<u32>,
        limit: Option<u32>,
    ) -> ApiResult<Vec<T>> {
        self.transport
            .get_json(resource.path(), Page { skip, limit })
            .await
    }

    /// Fetch one item of any resource
    pub async fn get<T: DeserializeOwned>(&self, resource: Resource, id: u64) -> ApiResult<T> {
        self.transport
            .get_json(&resource.item_path(id), Page::default())
            .await
    }

    pub async fn create<B, T>(&self, resource: Resource, payload: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.transport.post_json(resource.path(), payload).await
    }

    pub async fn update<B, T>(&self, resource: Resource, id: u64, payload: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.transport
            .put_json(&resource.item_path(id), payload)
            .await
    }

    pub async fn delete(&self, resource: Resource, id: u64) -> ApiResult<serde_json::Value> {
        self.transport.delete_json(&resource.item_path(id)).await
    }

    // ============================================
    // Startups
    // ============================================

    pub async fn list_startups(
        &self,
        skip: Option<u32>,
        limit: Option<u32>,
    ) -> ApiResult<Vec<StartupSummary>> {
        self.list(Resource::Startups, skip, limit).await
    }

    pub async fn get_startup(&self, id: u64) -> ApiResult<StartupDetail> {
        self.get(Resource::Startups, id).await
    }

    pub async fn create_startup(&self, payload: &StartupPayload) -> ApiResult<StartupDetail> {
        self.create(Resource::Startups, payload).await
    }

    pub async fn update_startup(&self, id: u64, payload: &StartupPayload) -> ApiResult<StartupDetail> {
        self.update(Resource::Startups, id, payload).await
    }

    pub async fn delete_startup(&self, id: u64) -> ApiResult<serde_json::Value> {
        self.delete(Resource::Startups, id).await
    }

    /// Founder portrait (binary)
    pub async fn founder_image(&self, startup_id: u64, founder_id: u64) -> ApiResult<ImageBlob> {
        let path = format!(
            "/startups/{}/founders/{}/image",
            seg(startup_id),
            seg(founder_id)
        );
        self.transport.get_bytes(&path).await
    }

    // ============================================
    // Investors
    // ============================================

    pub async fn list_investors(&self, skip: Option<u32>, limit: Option<u32>) -> ApiResult<Vec<Investor>> {
        self.list(Resource::Investors, skip, limit).await
    }

    pub async fn get_investor(&self, id: u64) -> ApiResult<Investor> {
        self.get(Resource::Investors, id).await
    }

    pub async fn create_investor(&self, payload: &InvestorPayload) -> ApiResult<Investor> {
        self.create(Resource::Investors, payload).await
    }

    pub async fn update_investor(&self, id: u64, payload: &InvestorPayload) -> ApiResult<Investor> {
        self.update(Resource::Investors, id, payload).await
    }

    pub async fn delete_investor(&self, id: u64) -> ApiResult<serde_json::Value> {
        self.delete(Resource::Investors, id).await
    }

    pub async fn investor_image(&self, id: u64) -> ApiResult<ImageBlob> {
        self.transport
            .get_bytes(&format!("/investors/{}/image", seg(id)))
            .await
    }

    // ============================================
    // Partners
    // ============================================

    pub async fn list_partners(&self, skip: Option<u32>, limit: Option<u32>) -> ApiResult<Vec<Partner>> {
        self.list(Resource::Partners, skip, limit).await
    }

    pub async fn get_partner(&self, id: u64) -> ApiResult<Partner> {
        self.get(Resource::Partners, id).await
    }

    pub async fn create_partner(&self, payload: &PartnerPayload) -> ApiResult<Partner> {
        self.create(Resource::Partners, payload).await
    }

    pub async fn update_partner(&self, id: u64, payload: &PartnerPayload) -> ApiResult<Partner> {
        self.update(Resource::Partners, id, payload).await
    }

    pub async fn delete_partner(&self, id: u64) -> ApiResult<serde_json::Value> {
        self.delete(Resource::Partners, id).await
    }

    // ============================================
    // News
    // ============================================

    pub async fn list_news(&self, skip: Option<u32>, limit: Option<u32>) -> ApiResult<Vec<News>> {
        self.list(Resource::News, skip, limit).await
    }

    pub async fn get_news(&self, id: u64) -> ApiResult<NewsDetail> {
        self.get(Resource::News, id).await
    }

    pub async fn create_news(&self, payload: &NewsPayload) -> ApiResult<NewsDetail> {
        self.create(Resource::News, payload).await
    }

    pub async fn update_news(&self, id: u64, payload: &NewsPayload) -> ApiResult<NewsDetail> {
        self.update(Resource::News, id, payload).await
    }

    pub async fn delete_news(&self, id: u64) -> ApiResult<serde_json::Value> {
        self.delete(Resource::News, id).await
    }

    pub async fn news_image(&self, id: u64) -> ApiResult<ImageBlob> {
        self.transport
            .get_bytes(&format!("/news/{}/image", seg(id)))
            .await
    }

    // ============================================
    // Events
    // ============================================

    pub async fn list_events(&self, skip: Option<u32>, limit: Option<u32>) -> ApiResult<Vec<Event>> {
        self.list(Resource::Events, skip, limit).await
    }

    pub async fn get_event(&self, id: u64) -> ApiResult<Event> {
        self.get(Resource::Events, id).await
    }

    pub async fn create_event(&self, payload: &EventPayload) -> ApiResult<Event> {
        self.create(Resource::Events, payload).await
    }

    pub async fn update_event(&self, id: u64, payload: &EventPayload) -> ApiResult<Event> {
        self.update(Resource::Events, id, payload).await
    }

    pub async fn delete_event(&self, id: u64) -> ApiResult<serde_json::Value> {
        self.delete(Resource::Events, id).await
    }

    pub async fn event_image(&self, id: u64) -> ApiResult<ImageBlob> {
        self.transport
            .get_bytes(&format!("/events/{}/image", seg(id)))
            .await
    }

    // ============================================
    // Users
    // ============================================

    pub async fn list_users(&self, skip: Option<u32>, limit: Option<u32>) -> ApiResult<Vec<User>> {
        self.list(Resource::Users, skip, limit).await
    }

    pub async fn get_user(&self, id: u64) -> ApiResult<User> {
        self.get(Resource::Users, id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> ApiResult<User> {
        self.transport
            .get_json(&format!("/users/email/{}", seg(email)), Page::default())
            .await
    }

    pub async fn create_user(&self, payload: &UserPayload) -> ApiResult<User> {
        self.create(Resource::Users, payload).await
    }

    pub async fn update_user(&self, id: u64, payload: &UserPayload) -> ApiResult<User> {
        self.update(Resource::Users, id, payload).await
    }

    pub async fn delete_user(&self, id: u64) -> ApiResult<serde_json::Value> {
        self.delete(Resource::Users, id).await
    }

    // ============================================
    // Auth
    // ============================================

    /// Ask the backend to email a registration code
    pub async fn request_register(&self, email: &str) -> ApiResult<DetailResponse> {
        let body = EmailRequest {
            email: email.to_string(),
        };
        self.transport
            .post_json("/auth/request-register", &body)
            .await
    }

    pub async fn verify_register_code(
        &self,
        email: &str,
        code: &str,
    ) -> ApiResult<VerifyRegisterCodeResponse> {
        let body = CodeVerificationRequest {
            email: email.to_string(),
            code: code.to_string(),
        };
        self.transport
            .post_json("/auth/verify-register-code", &body)
            .await
    }

    pub async fn complete_register(&self, request: &CompleteRegisterRequest) -> ApiResult<AuthResponse> {
        self.transport
            .post_json("/auth/complete-register", request)
            .await
    }

    /// Single-step registration
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<User> {
        self.transport.post_json("/auth/register", request).await
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.transport.post_json("/auth/login", &body).await
    }

    /// Current user for the token in the session
    pub async fn me(&self) -> ApiResult<User> {
        self.transport.get_json("/auth/me", Page::default()).await
    }

    // ============================================
    // Messaging
    // ============================================

    pub async fn send_message(&self, request: &SendMessageRequest) -> ApiResult<serde_json::Value> {
        self.transport
            .post_json("/communication/send_message", request)
            .await
    }

    /// Whole conversation between two users, oldest first
    pub async fn read_conversation(
        &self,
        reader_email: &str,
        chat_with_email: &str,
    ) -> ApiResult<Vec<ReadMessage>> {
        let body = ConversationQuery {
            reader_email: reader_email.to_string(),
            chat_with_email: chat_with_email.to_string(),
        };
        self.transport
            .post_json("/communication/read_conversation", &body)
            .await
    }

    pub async fn read_last_message(
        &self,
        reader_email: &str,
        chat_with_email: &str,
    ) -> ApiResult<ReadMessage> {
        let body = ConversationQuery {
            reader_email: reader_email.to_string(),
            chat_with_email: chat_with_email.to_string(),
        };
        self.transport
            .post_json("/communication/read_message", &body)
            .await
    }

    pub async fn conversation_ids(&self, user_id: u64) -> ApiResult<Vec<u64>> {
        self.transport
            .get_json(
                &format!("/communication/get_conversations_id/{}", seg(user_id)),
                Page::default(),
            )
            .await
    }
}

#[async_trait]
impl StartupSource for IncubatorClient {
    async fn fetch_page(&self, skip: u32, limit: u32) -> ApiResult<Vec<StartupSummary>> {
        self.list_startups(Some(skip), Some(limit)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use crate::test_support::{serve, StubResponse};
    use crate::transport::{ApiError, TransportConfig};

    fn client_for(base_url: &str, session: SessionStore) -> IncubatorClient {
        let config = TransportConfig {
            base_url: base_url.to_string(),
            request_timeout_ms: 5_000,
            ..TransportConfig::default()
        };
        IncubatorClient::new(Arc::new(HttpTransport::with_session(config, session).unwrap()))
    }

    #[tokio::test]
    async fn test_list_startups_sends_page_and_auth_header() {
        let (base, mut requests) = serve(vec![StubResponse::json(
            200,
            r#"[{"id": 1, "name": "Acme", "email": "a@acme.io", "sector": "fintech"}]"#,
        )])
        .await;

        let session = SessionStore::new();
        session.set_session(Some("secret".to_string()), None);
        let client = client_for(&base, session);

        let startups = client.list_startups(Some(100), Some(100)).await.unwrap();
        assert_eq!(startups.len(), 1);
        assert_eq!(startups[0].sector.as_deref(), Some("fintech"));

        let request = requests.recv().await.unwrap();
        assert!(request.starts_with("GET /startups?skip=100&limit=100 HTTP/1.1"));
        assert!(request.to_lowercase().contains("authorization: bearer secret"));
    }

    #[tokio::test]
    async fn test_no_auth_header_without_token() {
        let (base, mut requests) = serve(vec![StubResponse::json(
            200,
            r#"{"id": 3, "email": "u@x.io", "name": "U", "role": "user"}"#,
        )])
        .await;

        let client = client_for(&base, SessionStore::new());
        let user = client.get_user_by_email("u@x.io").await.unwrap();
        assert_eq!(user.id, 3);

        let request = requests.recv().await.unwrap();
        assert!(request.starts_with("GET /users/email/u%40x.io HTTP/1.1"));
        assert!(!request.to_lowercase().contains("authorization:"));
    }

    #[tokio::test]
    async fn test_error_status_is_returned_unchanged() {
        let (base, _requests) = serve(vec![StubResponse::json(
            404,
            r#"{"detail": "Startup not found"}"#,
        )])
        .await;

        let client = client_for(&base, SessionStore::new());
        let err = client.get_startup(99).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref d) if d == "Startup not found"));
    }

    #[tokio::test]
    async fn test_update_sends_json_body() {
        let (base, mut requests) = serve(vec![StubResponse::json(
            200,
            r#"{"id": 7, "title": "New title"}"#,
        )])
        .await;

        let client = client_for(&base, SessionStore::new());
        let payload = NewsPayload {
            title: Some("New title".to_string()),
            ..NewsPayload::default()
        };
        let updated = client.update_news(7, &payload).await.unwrap();
        assert_eq!(updated.news.title, "New title");

        let request = requests.recv().await.unwrap();
        assert!(request.starts_with("PUT /news/7 HTTP/1.1"));
        assert!(request.contains(r#""title":"New title""#));
        assert!(request.contains(r#""location":null"#));
    }

    #[tokio::test]
    async fn test_delete_with_empty_body() {
        let (base, _requests) = serve(vec![StubResponse::json(200, "")]).await;

        let client = client_for(&base, SessionStore::new());
        let result = client.delete_event(5).await.unwrap();
        assert!(result.is_null());
    }

    #[tokio::test]
    async fn test_image_returns_bytes() {
        let (base, mut requests) = serve(vec![StubResponse {
            status: 200,
            content_type: "image/png",
            body: vec![0x89, b'P', b'N', b'G'],
        }])
        .await;

        let client = client_for(&base, SessionStore::new());
        let image = client.founder_image(2, 9).await.unwrap();
        assert_eq!(image.content_type.as_deref(), Some("image/png"));
        assert_eq!(image.bytes, vec![0x89, b'P', b'N', b'G']);

        let request = requests.recv().await.unwrap();
        assert!(request.starts_with("GET /startups/2/founders/9/image HTTP/1.1"));
        assert!(request.to_lowercase().contains("accept: image/*"));
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        // Bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(&format!("http://{}", addr), SessionStore::new());
        let err = client.list_news(None, None).await.unwrap_err();
        assert!(matches!(err, ApiError::Unavailable));
    }
}
