//! Data Transfer Objects
//!
//! Request and response types for the backend endpoints.
//! Records mirror the backend JSON; write payloads are typed per endpoint
//! and send every field, so an unset field goes out as `null` and clears
//! the stored value.

use serde::{Deserialize, Serialize};

// ============================================
// STARTUP DTOs
// ============================================

/// Startup as returned by the list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupSummary {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub legal_status: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub maturity: Option<String>,
}

/// Founder attached to a startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Founder {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub startup_id: Option<u64>,
}

/// Startup as returned by the detail endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupDetail {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub legal_status: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Creation date (YYYY-MM-DD)
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub social_media_url: Option<String>,
    #[serde(default)]
    pub project_status: Option<String>,
    #[serde(default)]
    pub needs: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub maturity: Option<String>,
    #[serde(default)]
    pub founders: Vec<Founder>,
}

/// Create/update body for a startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartupPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub legal_status: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub social_media_url: Option<String>,
    pub project_status: Option<String>,
    pub needs: Option<String>,
    pub sector: Option<String>,
    pub maturity: Option<String>,
}

// ============================================
// INVESTOR / PARTNER DTOs
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investor {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub legal_status: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub investor_type: Option<String>,
    #[serde(default)]
    pub investment_focus: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvestorPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub legal_status: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub investor_type: Option<String>,
    pub investment_focus: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub legal_status: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub partnership_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartnerPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub legal_status: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub partnership_type: Option<String>,
}

// ============================================
// NEWS / EVENT DTOs
// ============================================

/// News item as returned by the list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct News {
    pub id: u64,
    pub title: String,
    /// Publication date (YYYY-MM-DD)
    #[serde(default)]
    pub news_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub startup_id: Option<u64>,
}

/// News item with its body text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsDetail {
    #[serde(flatten)]
    pub news: News,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsPayload {
    pub title: Option<String>,
    pub news_date: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub startup_id: Option<u64>,
    pub description: Option<String>,
}

/// Event; `dates` is free text whose first 10 characters are usually an ISO day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub dates: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    pub name: Option<String>,
    pub dates: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub event_type: Option<String>,
    pub target_audience: Option<String>,
}

// ============================================
// USER / AUTH DTOs
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub founder_id: Option<u64>,
    #[serde(default)]
    pub investor_id: Option<u64>,
}

/// User body; a blank password is left out so the current one is kept
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPayload {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub founder_id: Option<u64>,
    pub investor_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodeVerificationRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompleteRegisterRequest {
    pub email: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// `{"detail": "..."}` acknowledgement
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetailResponse {
    pub detail: String,
}

/// Values the backend already knows about a pending registration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PreFill {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VerifyRegisterCodeResponse {
    #[serde(default)]
    pub pre_fill: Option<PreFill>,
    pub detail: String,
}

/// Response of the token-issuing auth endpoints
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Login answers either with a token envelope or with the bare user
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LoginResponse {
    Token {
        access_token: String,
        #[serde(default)]
        token_type: Option<String>,
        #[serde(default)]
        user: Option<User>,
    },
    User(User),
}

// ============================================
// MESSAGING DTOs
// ============================================

/// Body of `/communication/send_message` (field names follow the backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub sender_email: String,
    pub reciver_email: String,
    pub content_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationQuery {
    pub reader_email: String,
    pub chat_with_email: String,
}

/// One message of a conversation as the backend renders it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadMessage {
    pub sender_name: String,
    pub content: String,
}

// ============================================
// MISC
// ============================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageUrl {
    pub image_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_detail_defaults() {
        let json = r#"{"id": 4, "name": "Acme", "email": "hi@acme.io"}"#;
        let detail: StartupDetail = serde_json::from_str(json).unwrap();
        assert!(detail.founders.is_empty());
        assert!(detail.description.is_none());
    }

    #[test]
    fn test_news_detail_flattens() {
        let json = r#"{"id": 1, "title": "Launch", "news_date": "2024-03-05", "description": "Body"}"#;
        let detail: NewsDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.news.title, "Launch");
        assert_eq!(detail.news.news_date.as_deref(), Some("2024-03-05"));
        assert_eq!(detail.description.as_deref(), Some("Body"));
    }

    #[test]
    fn test_payload_sends_unset_fields_as_null() {
        let payload = NewsPayload {
            title: Some("Demo day".to_string()),
            ..NewsPayload::default()
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "title": "Demo day",
                "news_date": null,
                "location": null,
                "category": null,
                "startup_id": null,
                "description": null,
            })
        );
    }

    #[test]
    fn test_user_payload_omits_blank_password() {
        let json = serde_json::to_value(UserPayload::default()).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("founder_id").unwrap().is_null());
    }

    #[test]
    fn test_login_response_variants() {
        let token: LoginResponse =
            serde_json::from_str(r#"{"access_token": "t", "token_type": "bearer"}"#).unwrap();
        assert!(matches!(token, LoginResponse::Token { ref access_token, .. } if access_token == "t"));

        let user: LoginResponse = serde_json::from_str(
            r#"{"id": 2, "email": "a@b.c", "name": "Ann", "role": "admin"}"#,
        )
        .unwrap();
        assert!(matches!(user, LoginResponse::User(ref u) if u.role == "admin"));
    }
}
