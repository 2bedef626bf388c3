//! Fixtures shared by the unit and HTTP tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;

use crate::{
    api::payments::{Charge, ChargeRequest, PaymentError, PaymentGateway},
    app::{
        config::{AppConfig, CatalogConfig, DatabaseConfig, ServerConfig, StripeConfig},
        middleware::{CurrentUser, USER_EMAIL_HEADER, USER_ID_HEADER, USERNAME_HEADER},
        state::AppState,
    },
    models::{CreateItemEntity, ItemEntity},
    routes,
    store::memory::MemoryStore,
};

/// Payment gateway double. Records every call and optionally fails charges
/// or card attachment.
#[derive(Default)]
pub struct FakeGateway {
    charge_error: Option<PaymentError>,
    source_error: Option<PaymentError>,
    customers: Mutex<Vec<Option<String>>>,
    sources: Mutex<Vec<(String, String)>>,
    charges: Mutex<Vec<ChargeRequest>>,
}

impl FakeGateway {
    pub fn failing(err: PaymentError) -> Self {
        Self {
            charge_error: Some(err),
            ..Self::default()
        }
    }

    pub fn rejecting_sources(err: PaymentError) -> Self {
        Self {
            source_error: Some(err),
            ..Self::default()
        }
    }

    pub fn charges(&self) -> Vec<ChargeRequest> {
        self.charges.lock().unwrap().clone()
    }

    pub fn customers_created(&self) -> usize {
        self.customers.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_customer(&self, email: Option<&str>) -> Result<String, PaymentError> {
        let mut customers = self.customers.lock().unwrap();
        customers.push(email.map(str::to_string));
        Ok(format!("cus_{}", customers.len()))
    }

    async fn attach_source(&self, customer_id: &str, token: &str) -> Result<(), PaymentError> {
        if let Some(err) = &self.source_error {
            return Err(err.clone());
        }

        self.sources
            .lock()
            .unwrap()
            .push((customer_id.to_string(), token.to_string()));
        Ok(())
    }

    async fn charge(&self, request: ChargeRequest) -> Result<Charge, PaymentError> {
        if let Some(err) = &self.charge_error {
            return Err(err.clone());
        }

        let mut charges = self.charges.lock().unwrap();
        let charge = Charge {
            id: format!("ch_{}", charges.len() + 1),
            amount: request.amount_cents,
        };
        charges.push(request);
        Ok(charge)
    }
}

pub fn test_user(id: i32) -> CurrentUser {
    CurrentUser {
        id,
        username: format!("reader{id}"),
        email: Some(format!("reader{id}@example.com")),
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "postgres://localhost/bookstore_test".into(),
            max_connections: 1,
        },
        stripe: StripeConfig {
            secret_key: "sk_test_123".into(),
            api_base: "http://localhost:12111".into(),
            currency: "usd".into(),
        },
        catalog: CatalogConfig { page_size: 2 },
    }
}

fn new_item(slug: &str, price: f64, discount_price: Option<f64>, genre: &str) -> CreateItemEntity {
    CreateItemEntity {
        title: slug.replace('-', " "),
        price,
        discount_price,
        genre: genre.into(),
        label: "F".into(),
        slug: slug.into(),
        description: format!("About {slug}"),
        image: format!("{slug}.jpg"),
        publisher_info: None,
        author_name: None,
        author_bio: None,
        release_date: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
    }
}

pub async fn seed_item(
    store: &MemoryStore,
    slug: &str,
    price: f64,
    discount_price: Option<f64>,
    genre: &str,
) -> ItemEntity {
    store
        .insert_item(new_item(slug, price, discount_price, genre))
        .await
}

pub async fn seed_item_by(store: &MemoryStore, slug: &str, author_name: Option<&str>) -> ItemEntity {
    store
        .insert_item(CreateItemEntity {
            author_name: author_name.map(str::to_string),
            ..new_item(slug, 10.0, None, "FA")
        })
        .await
}

/// The full router over an in-memory store and the given gateway.
pub fn test_app(store: Arc<MemoryStore>, gateway: Arc<FakeGateway>) -> Router {
    let state = AppState::new(store, gateway, test_config());
    let (router, _openapi) = routes::router().split_for_parts();
    router.with_state(state)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn authed(method: &str, uri: &str, user: &CurrentUser, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_ID_HEADER, user.id.to_string())
        .header(USERNAME_HEADER, &user.username);
    if let Some(email) = &user.email {
        builder = builder.header(USER_EMAIL_HEADER, email);
    }

    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response: Response<Body> = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
