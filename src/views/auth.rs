//! Login and registration flows

use crate::api::dto::CompleteRegisterRequest;
use crate::api::dto::User;
use crate::api::IncubatorClient;
use crate::session::SessionStore;

use super::forms::is_valid_email;

// ============================================
// LOGIN
// ============================================

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub loading: bool,
    pub error: Option<String>,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    /// Log in through the session store; the error is kept on failure
    pub async fn submit(&mut self, session: &SessionStore, client: &IncubatorClient) -> Option<User> {
        self.error = None;
        self.loading = true;
        let result = session.login(client, &self.email, &self.password).await;
        self.loading = false;

        match result {
            Ok(user) => {
                tracing::info!(user_id = user.id, "Logged in");
                Some(user)
            }
            Err(e) => {
                self.error = Some(format!("Login failed: {}", e.user_message()));
                None
            }
        }
    }
}

// ============================================
// REGISTRATION
// ============================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegisterPhase {
    /// Collect email and password, then ask for a code
    #[default]
    Request,
    /// Enter the emailed code
    Verify,
    /// Account created
    Done,
}

/// Two-step registration: request a code by email, then verify it and
/// complete the account
#[derive(Debug, Clone, Default)]
pub struct RegisterFlow {
    pub email: String,
    pub password: String,
    pub confirm: String,
    pub code: String,
    pub phase: RegisterPhase,
    pub loading: bool,
    pub error: Option<String>,
    pub info: Option<String>,
}

/// Display name from the local part of an email address
pub fn infer_name_from_email(email: &str) -> String {
    match email.split('@').next() {
        Some(local) if !local.trim().is_empty() => local.trim().to_string(),
        _ => "User".to_string(),
    }
}

impl RegisterFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn passwords_match(&self) -> bool {
        !self.password.is_empty() && self.password == self.confirm
    }

    /// Run the step for the current phase
    pub async fn submit(&mut self, client: &IncubatorClient) {
        match self.phase {
            RegisterPhase::Request => self.request_code(client).await,
            RegisterPhase::Verify => self.verify(client).await,
            RegisterPhase::Done => {}
        }
    }

    async fn request_code(&mut self, client: &IncubatorClient) {
        self.error = None;
        self.info = None;

        if !self.passwords_match() {
            self.error = Some("Passwords do not match.".to_string());
            return;
        }
        let email = self.email.trim().to_string();
        if !is_valid_email(&email) {
            self.error = Some("Please enter a valid email address.".to_string());
            return;
        }

        self.loading = true;
        let result = client.request_register(&email).await;
        self.loading = false;

        match result {
            Ok(_) => {
                self.phase = RegisterPhase::Verify;
                self.info = Some(
                    "A verification code has been sent to your email. Please enter it below."
                        .to_string(),
                );
            }
            Err(e) => self.fail(e.user_message()),
        }
    }

    async fn verify(&mut self, client: &IncubatorClient) {
        self.error = None;
        self.info = None;

        let code = self.code.trim().to_string();
        if code.is_empty() {
            self.error = Some("Please enter the verification code.".to_string());
            return;
        }

        let email = self.email.trim().to_string();
        self.loading = true;

        let verified = match client.verify_register_code(&email, &code).await {
            Ok(verified) => verified,
            Err(e) => {
                self.loading = false;
                self.fail(e.user_message());
                return;
            }
        };

        // A name the backend already knows wins over the inferred one
        let name = verified
            .pre_fill
            .and_then(|p| p.name)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| infer_name_from_email(&email));

        let request = CompleteRegisterRequest {
            email,
            code,
            name: Some(name),
            password: Some(self.password.clone()),
            role: None,
        };
        let result = client.complete_register(&request).await;
        self.loading = false;

        match result {
            Ok(_) => {
                tracing::info!(email = %request.email, "Registration completed");
                self.phase = RegisterPhase::Done;
            }
            Err(e) => self.fail(e.user_message()),
        }
    }

    fn fail(&mut self, detail: String) {
        tracing::warn!(phase = ?self.phase, detail = %detail, "Registration step failed");
        self.error = Some(format!("Registration failed: {}", detail));
    }
}
