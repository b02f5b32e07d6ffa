#![allow(clippy::unwrap_used, dead_code)]
// Shared fixtures for dealdrop-core integration tests.

use std::path::Path;

use secrecy::SecretString;
use tempfile::TempDir;
use url::Url;
use wiremock::MockServer;

use dealdrop_core::{
    ClientStore, EmailConfig, Market, MarketConfig, PaymentsConfig, Role, Session, UserId,
};

pub struct Fixture {
    pub server: MockServer,
    pub dir: TempDir,
}

impl Fixture {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn state_path(&self) -> std::path::PathBuf {
        self.dir.path().join("state.json")
    }

    /// Backend under `/api`; Paystack and Resend at the server root.
    pub fn config(&self) -> MarketConfig {
        let root = Url::parse(&self.server.uri()).unwrap();
        let mut config =
            MarketConfig::new(Url::parse(&format!("{}/api", self.server.uri())).unwrap());
        config.state_path = Some(self.state_path());
        config.payments = Some(PaymentsConfig {
            base_url: root.clone(),
            secret_key: SecretString::from("sk_test_123".to_string()),
            currency: "NGN".into(),
            callback_url: None,
        });
        config.email = Some(EmailConfig {
            base_url: root,
            api_key: SecretString::from("re_test_123".to_string()),
            from: "Deals <noreply@example.com>".into(),
        });
        config
    }

    pub fn market(&self) -> Market {
        Market::new(self.config()).unwrap()
    }

    /// Persist a session before the market opens the store.
    pub fn sign_in(&self, role: Role) {
        sign_in_at(&self.state_path(), role);
    }
}

pub fn sign_in_at(path: &Path, role: Role) {
    let store = ClientStore::open(path).unwrap();
    store
        .set_session(Session {
            user_id: UserId::new("u1"),
            email: "buyer@example.com".into(),
            name: Some("Ada".into()),
            role,
            token: SecretString::from("session-token".to_string()),
        })
        .unwrap();
}
