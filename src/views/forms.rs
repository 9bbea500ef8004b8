//! Entity edit forms
//!
//! Edit buffers for each resource, their field constraints, and the
//! fetch → edit → save/delete cycle of the admin edit popups.

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::OnceLock;
use thiserror::Error;

use crate::api::dto::{
    Event, EventPayload, Investor, InvestorPayload, NewsDetail, NewsPayload, Partner,
    PartnerPayload, StartupDetail, StartupPayload, User, UserPayload,
};
use crate::api::{IncubatorClient, Resource};

/// Upper bound on free-text fields
pub const MAX_FIELD_LEN: usize = 255;

// ============================================
// VALIDATION
// ============================================

/// A single field constraint failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("{field} is not a valid email address")]
    InvalidEmail { field: &'static str },

    #[error("{field} must be a number")]
    NotANumber { field: &'static str },
}

impl FieldError {
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::Required { field }
            | FieldError::TooLong { field, .. }
            | FieldError::TooShort { field, .. }
            | FieldError::InvalidEmail { field }
            | FieldError::NotANumber { field } => field,
        }
    }
}

/// All failures of one form
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{}", join_errors(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn for_field(&self, field: &str) -> Vec<&FieldError> {
        self.0.iter().filter(|e| e.field() == field).collect()
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*$";

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

/// Email shape check used by forms and the register flow
pub fn is_valid_email(value: &str) -> bool {
    email_regex()
        .map(|re| re.is_match(value.trim()))
        .unwrap_or(false)
}

/// Collects field failures for one form
#[derive(Default)]
struct Checks {
    errors: ValidationErrors,
}

impl Checks {
    fn required(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.0.push(FieldError::Required { field });
        }
        self
    }

    fn max_len(&mut self, field: &'static str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.errors.0.push(FieldError::TooLong { field, max });
        }
        self
    }

    // Empty values are left to `required`
    fn min_len(&mut self, field: &'static str, value: &str, min: usize) -> &mut Self {
        let len = value.trim().chars().count();
        if len > 0 && len < min {
            self.errors.0.push(FieldError::TooShort { field, min });
        }
        self
    }

    fn email(&mut self, field: &'static str, value: &str) -> &mut Self {
        if !value.trim().is_empty() && !is_valid_email(value) {
            self.errors.0.push(FieldError::InvalidEmail { field });
        }
        self
    }

    fn number(&mut self, field: &'static str, value: &str) -> &mut Self {
        if !value.trim().is_empty() && value.trim().parse::<u64>().is_err() {
            self.errors.0.push(FieldError::NotANumber { field });
        }
        self
    }

    fn finish(&mut self) -> Result<(), ValidationErrors> {
        std::mem::take(&mut self.errors).into_result()
    }
}

/// Trimmed value; a blank field becomes `None` and is sent as `null`
fn opt(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

// ============================================
// FORMS
// ============================================

/// An edit buffer for one resource
pub trait EntityForm: Default + Clone {
    /// Record returned by the detail endpoint
    type Record: DeserializeOwned;
    /// Body sent on update
    type Payload: Serialize + Sync;

    const RESOURCE: Resource;

    fn from_record(record: &Self::Record) -> Self;
    fn validate(&self) -> Result<(), ValidationErrors>;
    fn to_payload(&self) -> Self::Payload;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsForm {
    pub title: String,
    pub news_date: String,
    pub location: String,
    pub category: String,
    pub startup_id: String,
    pub description: String,
}

impl EntityForm for NewsForm {
    type Record = NewsDetail;
    type Payload = NewsPayload;
    const RESOURCE: Resource = Resource::News;

    fn from_record(record: &NewsDetail) -> Self {
        Self {
            title: record.news.title.clone(),
            news_date: text(&record.news.news_date),
            location: text(&record.news.location),
            category: text(&record.news.category),
            startup_id: record
                .news
                .startup_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            description: text(&record.description),
        }
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        Checks::default()
            .required("title", &self.title)
            .max_len("title", &self.title, MAX_FIELD_LEN)
            .number("startup_id", &self.startup_id)
            .finish()
    }

    fn to_payload(&self) -> NewsPayload {
        NewsPayload {
            title: opt(&self.title),
            news_date: opt(&self.news_date),
            location: opt(&self.location),
            category: opt(&self.category),
            startup_id: self.startup_id.trim().parse().ok(),
            description: opt(&self.description),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventForm {
    pub name: String,
    pub dates: String,
    pub location: String,
    pub description: String,
    pub event_type: String,
    pub target_audience: String,
}

impl EntityForm for EventForm {
    type Record = Event;
    type Payload = EventPayload;
    const RESOURCE: Resource = Resource::Events;

    fn from_record(record: &Event) -> Self {
        Self {
            name: record.name.clone(),
            dates: text(&record.dates),
            location: text(&record.location),
            description: text(&record.description),
            event_type: text(&record.event_type),
            target_audience: text(&record.target_audience),
        }
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        Checks::default()
            .required("name", &self.name)
            .max_len("name", &self.name, MAX_FIELD_LEN)
            .finish()
    }

    fn to_payload(&self) -> EventPayload {
        EventPayload {
            name: opt(&self.name),
            dates: opt(&self.dates),
            location: opt(&self.location),
            description: opt(&self.description),
            event_type: opt(&self.event_type),
            target_audience: opt(&self.target_audience),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvestorForm {
    pub name: String,
    pub email: String,
    pub legal_status: String,
    pub address: String,
    pub phone: String,
    pub investor_type: String,
    pub investment_focus: String,
    pub description: String,
}

impl EntityForm for InvestorForm {
    type Record = Investor;
    type Payload = InvestorPayload;
    const RESOURCE: Resource = Resource::Investors;

    fn from_record(record: &Investor) -> Self {
        Self {
            name: record.name.clone(),
            email: record.email.clone(),
            legal_status: text(&record.legal_status),
            address: text(&record.address),
            phone: text(&record.phone),
            investor_type: text(&record.investor_type),
            investment_focus: text(&record.investment_focus),
            description: text(&record.description),
        }
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        Checks::default()
            .required("name", &self.name)
            .max_len("name", &self.name, MAX_FIELD_LEN)
            .email("email", &self.email)
            .max_len("email", &self.email, MAX_FIELD_LEN)
            .finish()
    }

    fn to_payload(&self) -> InvestorPayload {
        InvestorPayload {
            name: opt(&self.name),
            email: opt(&self.email),
            legal_status: opt(&self.legal_status),
            address: opt(&self.address),
            phone: opt(&self.phone),
            description: opt(&self.description),
            investor_type: opt(&self.investor_type),
            investment_focus: opt(&self.investment_focus),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartnerForm {
    pub name: String,
    pub email: String,
    pub legal_status: String,
    pub address: String,
    pub phone: String,
    pub partnership_type: String,
    pub description: String,
}

impl EntityForm for PartnerForm {
    type Record = Partner;
    type Payload = PartnerPayload;
    const RESOURCE: Resource = Resource::Partners;

    fn from_record(record: &Partner) -> Self {
        Self {
            name: record.name.clone(),
            email: record.email.clone(),
            legal_status: text(&record.legal_status),
            address: text(&record.address),
            phone: text(&record.phone),
            partnership_type: text(&record.partnership_type),
            description: text(&record.description),
        }
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        Checks::default()
            .required("name", &self.name)
            .max_len("name", &self.name, MAX_FIELD_LEN)
            .email("email", &self.email)
            .max_len("email", &self.email, MAX_FIELD_LEN)
            .finish()
    }

    fn to_payload(&self) -> PartnerPayload {
        PartnerPayload {
            name: opt(&self.name),
            email: opt(&self.email),
            legal_status: opt(&self.legal_status),
            address: opt(&self.address),
            phone: opt(&self.phone),
            description: opt(&self.description),
            partnership_type: opt(&self.partnership_type),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartupForm {
    pub name: String,
    pub email: String,
    pub sector: String,
    pub maturity: String,
    pub legal_status: String,
    pub phone: String,
    pub address: String,
    pub website_url: String,
    pub social_media_url: String,
    pub project_status: String,
    pub needs: String,
    pub description: String,
}

impl EntityForm for StartupForm {
    type Record = StartupDetail;
    type Payload = StartupPayload;
    const RESOURCE: Resource = Resource::Startups;

    fn from_record(record: &StartupDetail) -> Self {
        Self {
            name: record.name.clone(),
            email: record.email.clone(),
            sector: text(&record.sector),
            maturity: text(&record.maturity),
            legal_status: text(&record.legal_status),
            phone: text(&record.phone),
            address: text(&record.address),
            website_url: text(&record.website_url),
            social_media_url: text(&record.social_media_url),
            project_status: text(&record.project_status),
            needs: text(&record.needs),
            description: text(&record.description),
        }
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        Checks::default()
            .required("name", &self.name)
            .min_len("name", &self.name, 2)
            .max_len("name", &self.name, MAX_FIELD_LEN)
            .email("email", &self.email)
            .finish()
    }

    fn to_payload(&self) -> StartupPayload {
        StartupPayload {
            name: opt(&self.name),
            email: opt(&self.email),
            legal_status: opt(&self.legal_status),
            address: opt(&self.address),
            phone: opt(&self.phone),
            description: opt(&self.description),
            website_url: opt(&self.website_url),
            social_media_url: opt(&self.social_media_url),
            project_status: opt(&self.project_status),
            needs: opt(&self.needs),
            sector: opt(&self.sector),
            maturity: opt(&self.maturity),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub role: String,
    /// Left blank to keep the current password
    pub password: String,
    pub founder_id: String,
    pub investor_id: String,
}

impl EntityForm for UserForm {
    type Record = User;
    type Payload = UserPayload;
    const RESOURCE: Resource = Resource::Users;

    fn from_record(record: &User) -> Self {
        Self {
            name: record.name.clone(),
            email: record.email.clone(),
            role: record.role.clone(),
            password: String::new(),
            founder_id: record.founder_id.map(|id| id.to_string()).unwrap_or_default(),
            investor_id: record.investor_id.map(|id| id.to_string()).unwrap_or_default(),
        }
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        Checks::default()
            .required("name", &self.name)
            .min_len("name", &self.name, 2)
            .max_len("name", &self.name, MAX_FIELD_LEN)
            .required("email", &self.email)
            .email("email", &self.email)
            .number("founder_id", &self.founder_id)
            .number("investor_id", &self.investor_id)
            .finish()
    }

    fn to_payload(&self) -> UserPayload {
        UserPayload {
            email: opt(&self.email),
            name: opt(&self.name),
            role: opt(&self.role),
            // Passwords are sent verbatim
            password: if self.password.is_empty() {
                None
            } else {
                Some(self.password.clone())
            },
            founder_id: self.founder_id.trim().parse().ok(),
            investor_id: self.investor_id.trim().parse().ok(),
        }
    }
}

// ============================================
// EDIT POPUP
// ============================================

/// Admin edit popup: load a record into a form, then save or delete it
#[derive(Debug, Clone)]
pub struct EditPopup<F: EntityForm> {
    pub id: u64,
    pub form: F,
    pub loading: bool,
    pub saving: bool,
    pub deleting: bool,
    pub error: Option<String>,
    pub validation: Option<ValidationErrors>,
    /// Set once a save or delete went through
    pub closed: bool,
}

impl<F: EntityForm> EditPopup<F> {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            form: F::default(),
            loading: false,
            saving: false,
            deleting: false,
            error: None,
            validation: None,
            closed: false,
        }
    }

    pub fn busy(&self) -> bool {
        self.loading || self.saving || self.deleting
    }

    /// Load the record and reset the form from it
    pub async fn fetch(&mut self, client: &IncubatorClient) -> bool {
        self.loading = true;
        self.error = None;

        let result = client.get::<F::Record>(F::RESOURCE, self.id).await;
        self.loading = false;

        match result {
            Ok(record) => {
                self.form = F::from_record(&record);
                self.validation = None;
                true
            }
            Err(e) => {
                tracing::error!(resource = %F::RESOURCE, id = self.id, error = %e, "Failed to load record");
                self.error = Some(format!("Cannot load {} details.", F::RESOURCE.singular()));
                false
            }
        }
    }

    /// Validate and send the form. Invalid forms are not sent.
    pub async fn save(&mut self, client: &IncubatorClient) -> bool {
        if let Err(errors) = self.form.validate() {
            self.validation = Some(errors);
            return false;
        }
        self.validation = None;

        self.saving = true;
        self.error = None;

        let payload = self.form.to_payload();
        let result = client
            .update::<_, serde_json::Value>(F::RESOURCE, self.id, &payload)
            .await;
        self.saving = false;

        match result {
            Ok(_) => {
                tracing::info!(resource = %F::RESOURCE, id = self.id, "Record saved");
                self.closed = true;
                true
            }
            Err(e) => {
                self.error = Some(e.user_message());
                false
            }
        }
    }

    pub async fn remove(&mut self, client: &IncubatorClient) -> bool {
        self.deleting = true;
        self.error = None;

        let result = client.delete(F::RESOURCE, self.id).await;
        self.deleting = false;

        match result {
            Ok(_) => {
                tracing::info!(resource = %F::RESOURCE, id = self.id, "Record deleted");
                self.closed = true;
                true
            }
            Err(e) => {
                self.error = Some(e.user_message());
                false
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
    fn test_email_shapes() {
        assert!(is_valid_email("founder@startup.io"));
        assert!(is_valid_email(" a.b+c@sub.domain.org "));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@@signs.io"));
        assert!(!is_valid_email("spaces in@mail.io"));
    }

    #[test]
    fn test_news_form_validation() {
        let form = NewsForm {
            title: "x".repeat(256),
            startup_id: "abc".to_string(),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.0,
            vec![
                FieldError::TooLong { field: "title", max: 255 },
                FieldError::NotANumber { field: "startup_id" },
            ]
        );

        let blank = NewsForm::default().validate().unwrap_err();
        assert_eq!(blank.for_field("title"), vec![&FieldError::Required { field: "title" }]);
        assert_eq!(blank.to_string(), "title is required");
    }

    #[test]
    fn test_investor_email_optional_but_checked() {
        let mut form = InvestorForm {
            name: "Fund".to_string(),
            ..Default::default()
        };
        assert!(form.validate().is_ok());

        form.email = "not-an-email".to_string();
        assert_eq!(
            form.validate().unwrap_err().0,
            vec![FieldError::InvalidEmail { field: "email" }]
        );
    }

    #[test]
    fn test_startup_name_min_length() {
        let form = StartupForm {
            name: "A".to_string(),
            ..Default::default()
        };
        assert_eq!(
            form.validate().unwrap_err().0,
            vec![FieldError::TooShort { field: "name", min: 2 }]
        );
    }

    #[test]
    fn test_payload_sends_blank_fields_as_null() {
        let form = EventForm {
            name: " Demo Day ".to_string(),
            dates: "2024-06-01".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(form.to_payload()).unwrap();
        assert_eq!(json["name"], "Demo Day");
        assert_eq!(json["dates"], "2024-06-01");
        assert!(json["location"].is_null());
        assert_eq!(json.as_object().unwrap().len(), 6);

        let user = UserForm {
            name: "Ana".to_string(),
            email: "ana@mail.io".to_string(),
            founder_id: "12".to_string(),
            ..Default::default()
        };
        let payload = user.to_payload();
        assert_eq!(payload.founder_id, Some(12));
        assert!(payload.password.is_none());
    }

    #[test]
    fn test_cleared_field_is_sent_as_null() {
        let detail = NewsDetail {
            news: crate::api::dto::News {
                id: 3,
                title: "T".to_string(),
                news_date: None,
                location: Some("Paris".to_string()),
                category: None,
                startup_id: None,
            },
            description: None,
        };
        let mut form = NewsForm::from_record(&detail);
        assert_eq!(form.location, "Paris");

        form.location.clear();
        let json = serde_json::to_value(form.to_payload()).unwrap();
        assert_eq!(json["title"], "T");
        assert!(json.get("location").map(|v| v.is_null()).unwrap_or(false));
    }

    #[test]
    fn test_form_from_record() {
        let detail = NewsDetail {
            news: crate::api::dto::News {
                id: 3,
                title: "Launch".to_string(),
                news_date: Some("2024-03-05".to_string()),
                location: None,
                category: Some("Product".to_string()),
                startup_id: Some(9),
            },
            description: Some("Body".to_string()),
        };
        let form = NewsForm::from_record(&detail);
        assert_eq!(form.startup_id, "9");
        assert_eq!(form.location, "");
        assert_eq!(form.description, "Body");
    }

    #[tokio::test]
    async fn test_edit_popup_fetch_and_save() {
        let (base, mut requests) = serve(vec![
            StubResponse::json(200, r#"{"id": 4, "name": "Demo Day", "dates": "2024-06-01"}"#),
            StubResponse::json(200, r#"{"id": 4, "name": "Demo Night"}"#),
        ])
        .await;
        let client = client_for(base);

        let mut popup: EditPopup<EventForm> = EditPopup::new(4);
        assert!(popup.fetch(&client).await);
        assert_eq!(popup.form.name, "Demo Day");

        popup.form.name = "Demo Night".to_string();
        assert!(popup.save(&client).await);
        assert!(popup.closed);
        assert!(!popup.saving);

        let _get = requests.recv().await.unwrap();
        let put = requests.recv().await.unwrap();
        assert!(put.starts_with("PUT /events/4 HTTP/1.1"));
        assert!(put.contains(r#""name":"Demo Night""#));
        assert!(put.contains(r#""location":null"#));
    }

    #[tokio::test]
    async fn test_invalid_form_is_not_sent() {
        // No stub responses: any request would fail
        let (base, _requests) = serve(vec![]).await;
        let client = client_for(base);

        let mut popup: EditPopup<PartnerForm> = EditPopup::new(1);
        assert!(!popup.save(&client).await);
        assert!(popup.validation.is_some());
        assert!(!popup.closed);
        assert!(popup.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_popup_open() {
        let (base, _requests) = serve(vec![StubResponse::json(500, r#"{"detail": "db down"}"#)]).await;
        let client = client_for(base);

        let mut popup: EditPopup<NewsForm> = EditPopup::new(2);
        assert!(!popup.remove(&client).await);
        assert_eq!(popup.error.as_deref(), Some("db down"));
        assert!(!popup.deleting);
        assert!(!popup.closed);
    }

    #[tokio::test]
    async fn test_fetch_failure_message() {
        let (base, _requests) = serve(vec![StubResponse::json(404, r#"{"detail": "Not found"}"#)]).await;
        let client = client_for(base);

        let mut popup: EditPopup<InvestorForm> = EditPopup::new(99);
        assert!(!popup.fetch(&client).await);
        assert_eq!(popup.error.as_deref(), Some("Cannot load investor details."));
    }
}
