//! Test helper module for quest-service integration tests.

#![allow(dead_code)]

use quest_service::config::{InvitationConfig, QuestConfig};
use quest_service::middleware::PRINCIPAL_ID_HEADER;
use quest_service::models::Role;
use quest_service::startup::{AppState, Application};
use service_core::config::Config as CoreConfig;
use std::sync::Once;
use uuid::Uuid;

// Initialize metrics once for all tests
static INIT_METRICS: Once = Once::new();

fn ensure_metrics_initialized() {
    INIT_METRICS.call_once(|| {
        quest_service::services::init_metrics();
    });
}

/// A registered test identity.
#[derive(Debug, Clone)]
pub struct TestPrincipal {
    pub principal_id: Uuid,
    pub institution_id: Uuid,
    pub email: String,
    pub role: Role,
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        ensure_metrics_initialized();

        let config = QuestConfig {
            common: CoreConfig {
                host: "127.0.0.1".into(),
                port: 0,
            },
            service_name: "quest-service".into(),
            log_level: "info".into(),
            otlp_endpoint: None,
            invitations: InvitationConfig {
                public_base_url: "http://localhost:8080".into(),
                default_expiry_days: 7,
            },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let port = app.port();
        let state = app.state().clone();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the HTTP server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            state,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Register a principal through the identity-callback endpoint.
    pub async fn register_principal(&self, role: Role, institution_id: Uuid) -> TestPrincipal {
        let principal_id = Uuid::new_v4();
        let email = format!("user-{}@example.edu", principal_id.simple());
        let response = self
            .client
            .put(self.url("/api/principals"))
            .json(&serde_json::json!({
                "principal_id": principal_id,
                "institution_id": institution_id,
                "email": email,
                "role": role.as_str(),
            }))
            .send()
            .await
            .expect("Failed to register principal");
        assert!(response.status().is_success());

        TestPrincipal {
            principal_id,
            institution_id,
            email,
            role,
        }
    }

    pub async fn register_professor(&self) -> TestPrincipal {
        self.register_principal(Role::Professor, Uuid::new_v4())
            .await
    }

    /// A GET request authenticated as the given principal.
    pub fn get_as(&self, principal: &TestPrincipal, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .header(PRINCIPAL_ID_HEADER, principal.principal_id.to_string())
    }

    pub fn post_as(&self, principal: &TestPrincipal, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header(PRINCIPAL_ID_HEADER, principal.principal_id.to_string())
    }

    pub fn patch_as(&self, principal: &TestPrincipal, path: &str) -> reqwest::RequestBuilder {
        self.client
            .patch(self.url(path))
            .header(PRINCIPAL_ID_HEADER, principal.principal_id.to_string())
    }

    pub fn delete_as(&self, principal: &TestPrincipal, path: &str) -> reqwest::RequestBuilder {
        self.client
            .delete(self.url(path))
            .header(PRINCIPAL_ID_HEADER, principal.principal_id.to_string())
    }

    /// Create a quest as the given (professor) principal and return its id.
    pub async fn create_quest(&self, owner: &TestPrincipal, name: &str) -> Uuid {
        let response = self
            .post_as(owner, "/api/quests")
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await
            .expect("Failed to create quest");
        assert_eq!(response.status().as_u16(), 201);
        let body: serde_json::Value = response.json().await.unwrap();
        body["quest_id"].as_str().unwrap().parse().unwrap()
    }

    /// Create a draft case owned by the given principal and return its id.
    pub async fn create_case(&self, owner: &TestPrincipal, title: &str, answer: &str) -> Uuid {
        let response = self
            .post_as(owner, "/api/cases")
            .json(&serde_json::json!({
                "title": title,
                "prompt": format!("Prompt for {}", title),
                "answer": answer,
                "complexity": "undergraduate",
            }))
            .send()
            .await
            .expect("Failed to create case");
        assert_eq!(response.status().as_u16(), 201);
        let body: serde_json::Value = response.json().await.unwrap();
        body["case_id"].as_str().unwrap().parse().unwrap()
    }

    /// Add a case to a quest, asserting success.
    pub async fn add_case_to_quest(&self, actor: &TestPrincipal, quest_id: Uuid, case_id: Uuid) {
        let response = self
            .post_as(actor, &format!("/api/quests/{}/cases", quest_id))
            .json(&serde_json::json!({ "case_id": case_id }))
            .send()
            .await
            .expect("Failed to add case to quest");
        assert_eq!(response.status().as_u16(), 204);
    }
}
