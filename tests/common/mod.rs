#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use expense_portal_backend::app::{create_app, AppState};
use expense_portal_backend::config::Settings;
use expense_portal_backend::identity::{
    IdentityError, IdentityProvider, IdentityResult, IdentityUser, NewAccount,
};
use expense_portal_backend::store::{InMemoryKvStore, KvStore, ProfileStore};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

pub const PREFIX: &str = "/make-server-0c780f05";

#[derive(Debug, Clone)]
pub struct FakeAccount {
    pub id: String,
    pub email: String,
    pub password: String,
    pub metadata: serde_json::Value,
}

#[derive(Default)]
struct FakeInner {
    accounts: HashMap<String, FakeAccount>,
    tokens: HashMap<String, String>,
}

/// In-process stand-in for Supabase Auth: accounts in a map, tokens issued
/// by `sign_in`.
#[derive(Default)]
pub struct FakeIdentity {
    inner: Mutex<FakeInner>,
}

impl FakeIdentity {
    pub fn sign_in(&self, email: &str, password: &str) -> Option<String> {
        let mut inner = self.inner.lock();
        let id = inner
            .accounts
            .values()
            .find(|a| a.email == email && a.password == password)?
            .id
            .clone();
        let token = format!("token-{}", uuid::Uuid::new_v4());
        inner.tokens.insert(token.clone(), id);
        Some(token)
    }

    pub fn account(&self, id: &str) -> Option<FakeAccount> {
        self.inner.lock().accounts.get(id).cloned()
    }

    pub fn account_count(&self) -> usize {
        self.inner.lock().accounts.len()
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn get_user(&self, access_token: &str) -> IdentityResult<IdentityUser> {
        let inner = self.inner.lock();
        let id = inner
            .tokens
            .get(access_token)
            .ok_or_else(|| IdentityError::Rejected("invalid JWT".into()))?;
        let account = &inner.accounts[id];
        Ok(IdentityUser {
            id: account.id.clone(),
            email: Some(account.email.clone()),
        })
    }

    async fn create_user(&self, account: NewAccount) -> IdentityResult<IdentityUser> {
        let mut inner = self.inner.lock();
        if inner.accounts.values().any(|a| a.email == account.email) {
            return Err(IdentityError::Rejected(
                "A user with this email address has already been registered".into(),
            ));
        }
        let id = uuid::Uuid::new_v4().to_string();
        inner.accounts.insert(
            id.clone(),
            FakeAccount {
                id: id.clone(),
                email: account.email.clone(),
                password: account.password,
                metadata: serde_json::to_value(&account.user_metadata).unwrap(),
            },
        );
        Ok(IdentityUser {
            id,
            email: Some(account.email),
        })
    }

    async fn update_password(&self, user_id: &str, new_password: &str) -> IdentityResult<()> {
        if new_password.len() < 6 {
            return Err(IdentityError::Rejected(
                "Password should be at least 6 characters.".into(),
            ));
        }
        let mut inner = self.inner.lock();
        let account = inner
            .accounts
            .get_mut(user_id)
            .ok_or_else(|| IdentityError::Rejected("User not found".into()))?;
        account.password = new_password.to_string();
        Ok(())
    }
}

pub struct TestApp {
    pub router: axum::Router,
    pub identity: Arc<FakeIdentity>,
    pub kv: Arc<InMemoryKvStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let identity = Arc::new(FakeIdentity::default());
        let kv = Arc::new(InMemoryKvStore::new());
        let state = AppState::new(
            Settings::local("http://identity.invalid"),
            ProfileStore::new(kv.clone()),
            identity.clone(),
        );
        Self {
            router: create_app(state),
            identity,
            kv,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.expect("response")
    }

    pub async fn post(
        &self,
        path: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(format!("{PREFIX}{path}"))
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let response = self
            .send(builder.body(Body::from(body.to_string())).expect("request"))
            .await;
        let status = response.status();
        (status, read_json(response).await)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().uri(format!("{PREFIX}{path}"));
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let response = self.send(builder.body(Body::empty()).expect("request")).await;
        let status = response.status();
        (status, read_json(response).await)
    }

    /// Signs up the admin and returns its bearer token.
    pub async fn signup_admin(&self, email: &str, password: &str, company: &str) -> String {
        let (status, body) = self
            .post(
                "/admin-signup",
                None,
                serde_json::json!({ "email": email, "password": password, "companyName": company }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        self.identity.sign_in(email, password).expect("admin token")
    }

    /// Registers an account directly with the identity provider, stores
    /// `profile` as its record verbatim (plus its `id`) and returns a token.
    /// Used for records this service would never write itself.
    pub async fn seed_account(
        &self,
        email: &str,
        password: &str,
        mut profile: serde_json::Value,
    ) -> String {
        let account = self
            .identity
            .create_user(NewAccount {
                email: email.to_string(),
                password: password.to_string(),
                email_confirm: true,
                user_metadata: Default::default(),
            })
            .await
            .expect("seeded account");
        profile["id"] = serde_json::Value::String(account.id.clone());
        self.kv
            .set(&format!("user_profile:{}", account.id), &profile)
            .await
            .expect("seeded profile");
        self.identity.sign_in(email, password).expect("seeded token")
    }

    /// Creates an employee and returns the `user` object of the response.
    pub async fn create_employee(
        &self,
        admin_token: &str,
        body: serde_json::Value,
    ) -> serde_json::Value {
        let (status, body) = self.post("/create-employee", Some(admin_token), body).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["user"].clone()
    }
}

pub async fn read_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
