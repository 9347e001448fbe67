use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

use shopdesk_api::ApiConfig;
use shopdesk_auth::{PrincipalId, Role, SessionClaims, StaffRole};
use shopdesk_core::OrganizationId;

const SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory stores, ephemeral port.
        let app = shopdesk_api::app::build_app(&ApiConfig::with_secret(SECRET))
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str, token: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).bearer_auth(token).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn send(&self, method: reqwest::Method, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .request(method, self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn post(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::POST, path, token, body).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint(role: Role, role_tag: Option<StaffRole>, organization_id: Option<OrganizationId>) -> String {
    mint_with_expiry(role, role_tag, organization_id, ChronoDuration::minutes(10))
}

fn mint_with_expiry(
    role: Role,
    role_tag: Option<StaffRole>,
    organization_id: Option<OrganizationId>,
    ttl: ChronoDuration,
) -> String {
    let now = Utc::now();
    let claims = SessionClaims {
        sub: PrincipalId::new(),
        role,
        role_tag,
        organization_id,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn tenant_admin(org: OrganizationId) -> String {
    mint(Role::TenantAdmin, None, Some(org))
}

fn super_admin() -> String {
    mint(Role::SuperAdmin, None, None)
}

async fn create_product(srv: &TestServer, token: &str, sku: &str) -> String {
    let (status, body) = srv
        .post("/products", token, json!({ "sku": sku, "name": format!("Item {sku}"), "price_cents": 500, "stock": 3 }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn missing_credential_is_rejected_with_envelope() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .get(srv.url("/products"))
        .header("x-correlation-id", "trace-42")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()["x-correlation-id"], "trace-42");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHENTICATED");
    assert_eq!(body["correlation"], "trace-42");
}

#[tokio::test]
async fn bad_or_expired_tokens_are_unauthenticated() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.get("/whoami", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");

    let expired = mint_with_expiry(
        Role::TenantAdmin,
        None,
        Some(OrganizationId::new()),
        ChronoDuration::minutes(-5),
    );
    let (status, _) = srv.get("/whoami", &expired).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-correlation-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn session_cookie_authenticates() {
    let srv = TestServer::spawn().await;
    let org = OrganizationId::new();
    let token = tenant_admin(org);

    let res = srv
        .client
        .get(srv.url("/whoami"))
        .header("cookie", format!("shopdesk_session={token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["organization_id"], org.to_string());
}

#[tokio::test]
async fn whoami_lists_effective_permissions() {
    let srv = TestServer::spawn().await;
    let token = mint(Role::Staff, Some(StaffRole::Accountant), Some(OrganizationId::new()));

    let (status, body) = srv.get("/whoami", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "STAFF");
    assert_eq!(body["data"]["role_tag"], "accountant");
    let perms = body["data"]["permissions"].as_array().unwrap();
    assert!(perms.iter().any(|p| p == "VIEW_ACCOUNTING"));
    assert!(!perms.iter().any(|p| p == "MANAGE_INVENTORY"));
}

#[tokio::test]
async fn staff_role_tag_decides_accounting_access() {
    let srv = TestServer::spawn().await;
    let org = OrganizationId::new();

    let accountant = mint(Role::Staff, Some(StaffRole::Accountant), Some(org));
    let (status, body) = srv.get("/accounting/invoices", &accountant).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);

    let sales = mint(Role::Staff, Some(StaffRole::SalesExecutive), Some(org));
    let (status, body) = srv.get("/accounting/invoices", &sales).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "INSUFFICIENT_PERMISSION");
    assert!(body["correlation"].is_string());

    let untagged = mint(Role::Staff, None, Some(org));
    let (status, _) = srv.get("/accounting/invoices", &untagged).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let customer = mint(Role::Customer, None, Some(org));
    let (status, _) = srv.get("/products", &customer).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn cross_tenant_mutation_is_refused_and_has_no_effect() {
    let srv = TestServer::spawn().await;
    let org1 = OrganizationId::new();
    let org2 = OrganizationId::new();

    let id = create_product(&srv, &tenant_admin(org2), "sku-2").await;

    let (status, body) = srv
        .send(
            reqwest::Method::PATCH,
            &format!("/products/{id}"),
            &tenant_admin(org1),
            json!({ "name": "hijacked" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "WRONG_TENANT");

    let (status, body) = srv.get(&format!("/products/{id}"), &tenant_admin(org1)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "WRONG_TENANT");

    let (status, body) = srv.get(&format!("/products/{id}"), &super_admin()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Item sku-2");
}

#[tokio::test]
async fn lists_are_scoped_to_the_callers_organization() {
    let srv = TestServer::spawn().await;
    let org1 = OrganizationId::new();
    let org2 = OrganizationId::new();

    for sku in ["a", "b", "c"] {
        create_product(&srv, &tenant_admin(org1), sku).await;
    }
    create_product(&srv, &tenant_admin(org2), "z").await;

    let (status, body) = srv.get("/products?page=1&per_page=2", &tenant_admin(org1)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["total_pages"], 2);
    assert!(
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .all(|p| p["organization_id"] == org1.to_string())
    );

    let (status, body) = srv.get("/products", &super_admin()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 4);
}

#[tokio::test]
async fn principal_without_organization_fails_fast() {
    let srv = TestServer::spawn().await;

    let orphan = mint(Role::Staff, Some(StaffRole::InventoryManager), None);
    let (status, body) = srv.get("/products", &orphan).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_ORGANIZATION");

    // A super-admin must name the organization it creates records in.
    let (status, body) = srv
        .post("/products", &super_admin(), json!({ "sku": "x", "name": "X" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_ORGANIZATION");

    let org = OrganizationId::new();
    let (status, body) = srv
        .post(
            "/products",
            &super_admin(),
            json!({ "organization_id": org.to_string(), "sku": "x", "name": "X" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["organization_id"], org.to_string());
}

#[tokio::test]
async fn tenant_cannot_create_in_another_organization() {
    let srv = TestServer::spawn().await;
    let (status, body) = srv
        .post(
            "/products",
            &tenant_admin(OrganizationId::new()),
            json!({ "organization_id": OrganizationId::new().to_string(), "sku": "x", "name": "X" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "WRONG_TENANT");
}

#[tokio::test]
async fn order_lifecycle_and_conflicts() {
    let srv = TestServer::spawn().await;
    let org = OrganizationId::new();
    let admin = tenant_admin(org);
    let product_id = create_product(&srv, &admin, "widget").await;

    let cashier = mint(Role::Staff, Some(StaffRole::Cashier), Some(org));
    let (status, body) = srv
        .post(
            "/orders",
            &cashier,
            json!({
                "customer_ref": "walk-in",
                "lines": [{ "product_id": product_id, "quantity": 2, "unit_price_cents": 500 }],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["total_cents"], 1000);
    let order_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = srv.post(&format!("/orders/{order_id}/cancel"), &cashier, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");

    let (status, body) = srv.post(&format!("/orders/{order_id}/cancel"), &cashier, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    // Lines may not reference another organization's products.
    let foreign = create_product(&srv, &tenant_admin(OrganizationId::new()), "foreign").await;
    let (status, body) = srv
        .post(
            "/orders",
            &admin,
            json!({
                "customer_ref": "c1",
                "lines": [{ "product_id": foreign, "quantity": 1, "unit_price_cents": 1 }],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "WRONG_TENANT");
}

#[tokio::test]
async fn unsupported_method_returns_failure_envelope() {
    let srv = TestServer::spawn().await;
    let admin = tenant_admin(OrganizationId::new());

    let (status, body) = srv.send(reqwest::Method::PUT, "/products", &admin, json!({})).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "METHOD_NOT_ALLOWED");
    assert!(body["correlation"].is_string());
}

#[tokio::test]
async fn invalid_input_is_a_validation_error() {
    let srv = TestServer::spawn().await;
    let admin = tenant_admin(OrganizationId::new());

    let (status, body) = srv.get("/products/not-a-uuid", &admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = srv.post("/products", &admin, json!({ "sku": "", "name": "X" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = srv.get("/products?page=abc", &admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = srv
        .get(&format!("/products/{}", shopdesk_core::ResourceId::new()), &admin)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn rbac_admin_endpoints_require_admin_roles() {
    let srv = TestServer::spawn().await;
    let org = OrganizationId::new();

    let (status, body) = srv.get("/admin/rbac/permissions", &tenant_admin(org)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 11);

    let staff = mint(Role::Staff, Some(StaffRole::Accountant), Some(org));
    let (status, body) = srv.get("/admin/rbac/permissions", &staff).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "INSUFFICIENT_ROLE");

    let (status, body) = srv
        .get(
            "/admin/rbac/explain?permission=VIEW_ACCOUNTING&role=STAFF&role_tag=sales_executive",
            &super_admin(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["granted"], false);
    assert_eq!(body["data"]["denial"], "INSUFFICIENT_PERMISSION");
}
