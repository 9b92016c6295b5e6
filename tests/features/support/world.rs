//! Test world for Cucumber scenarios

use std::collections::HashMap;
use std::fmt;

use cucumber::World;

use crate::common::{TestApp, TestResponse};

/// Scenario state: one application instance per scenario
#[derive(Default, World)]
pub struct TestWorld {
    /// Started on first use
    app: Option<TestApp>,

    /// Bearer token of the current actor, if signed in
    pub token: Option<String>,

    /// Response from the last API call
    pub last_response: Option<TestResponse>,

    /// Record ids by label ("event", "suite", "individual", ...)
    pub ids: HashMap<String, String>,
}

impl fmt::Debug for TestWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestWorld")
            .field("started", &self.app.is_some())
            .field("signed_in", &self.token.is_some())
            .field("last_status", &self.last_response.as_ref().map(|r| r.status))
            .field("ids", &self.ids)
            .finish()
    }
}

impl TestWorld {
    /// The scenario's application, started on first use
    pub async fn app(&mut self) -> &TestApp {
        if self.app.is_none() {
            self.app = Some(TestApp::new().await);
        }
        self.app.as_ref().expect("app started above")
    }

    pub async fn sign_in_as_staff(&mut self) {
        let token = self.app().await.staff_token().await;
        self.token = Some(token);
    }

    pub async fn sign_in_as_member(&mut self) {
        let (_, token) = self.app().await.user_with_token().await;
        self.token = Some(token);
    }

    pub fn id(&self, label: &str) -> String {
        self.ids
            .get(label)
            .cloned()
            .unwrap_or_else(|| panic!("No {} recorded in this scenario", label))
    }

    /// POST as the current actor, anonymously when signed out
    pub async fn post(&mut self, uri: &str, body: serde_json::Value) -> &TestResponse {
        let token = self.token.clone();
        let app = self.app().await;
        let response = match token {
            Some(token) => app.post_json_with_auth(uri, body, &token).await,
            None => app.post_json(uri, body).await,
        };
        self.last_response.insert(response)
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let token = self.token.clone();
        let app = self.app().await;
        match token {
            Some(token) => app.get_with_auth(uri, &token).await,
            None => app.get(uri).await,
        }
    }

    pub fn response(&self) -> &TestResponse {
        self.last_response
            .as_ref()
            .expect("No response available")
    }
}
