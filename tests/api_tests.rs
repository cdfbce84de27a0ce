//! HTTP-level tests for login, role gating, and the register/purchase flow.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use loyalcard::config::Config;
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let db_path =
        std::env::temp_dir().join(format!("loyalcard-api-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.server.secure_cookies = false;
    config.observability.metrics_enabled = false;

    let state = loyalcard::api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");
    loyalcard::api::router(state).await
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// The session cookie pair from a login response, without its attributes.
fn session_cookie(response: &axum::response::Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login did not set a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn body_json(response: axum::response::Response<Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn login_admin(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/admin/login",
            None,
            serde_json::json!({"username": "admin", "password": "password"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = spawn_app().await;

    for uri in [
        "/api/customers",
        "/api/dashboard/stats",
        "/api/store-owners",
        "/api/auth/me",
    ] {
        let response = app.clone().oneshot(get_request(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn admin_login_rejects_bad_credentials() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/admin/login",
            None,
            serde_json::json!({"username": "admin", "password": "wrong"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_purchase_discount_flow() {
    let app = spawn_app().await;
    let admin_cookie = login_admin(&app).await;

    // Admin provisions a store owner.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/store-owners",
            Some(&admin_cookie),
            serde_json::json!({
                "email": "shop@example.com",
                "password": "hunter22!",
                "store_name": "Corner Shop"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The owner logs in with their own session.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/store-owner/login",
            None,
            serde_json::json!({"email": "shop@example.com", "password": "hunter22!"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let owner_cookie = session_cookie(&response);

    // Register a walk-in customer with a generated barcode.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/customers",
            Some(&owner_cookie),
            serde_json::json!({"name": "Dana"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let customer_id = body["data"]["id"].as_i64().unwrap();
    let barcode = body["data"]["barcode"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["points_balance"], 10);

    // Resolve by barcode within the owner's scope.
    let response = app
        .clone()
        .oneshot(get_request(
            &format!("/api/customers/resolve/{barcode}"),
            Some(&owner_cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Record a purchase: 19.99 earns round(19.99 / 2) = 10 points.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/purchases",
            Some(&owner_cookie),
            serde_json::json!({"customer_id": customer_id, "amount": 19.99}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["points_earned"], 10);

    // Issue a discount, apply it, and watch the second use fail.
    let expiry = (chrono::Utc::now() + chrono::Duration::days(7)).to_rfc3339();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/discounts",
            Some(&owner_cookie),
            serde_json::json!({"customer_id": customer_id, "amount": 10.0, "expiry_date": expiry}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let discount_id = body["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/purchases",
            Some(&owner_cookie),
            serde_json::json!({
                "customer_id": customer_id,
                "amount": 25.0,
                "discount_id": discount_id
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["amount"], 15.0);
    assert_eq!(body["data"]["points_earned"], 8);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/purchases",
            Some(&owner_cookie),
            serde_json::json!({
                "customer_id": customer_id,
                "amount": 5.0,
                "discount_id": discount_id
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Owner dashboard reflects the store's ledger.
    let response = app
        .clone()
        .oneshot(get_request("/api/dashboard/stats", Some(&owner_cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["total_customers"], 1);
    assert_eq!(body["data"]["total_points_balance"], 28);
}

#[tokio::test]
async fn customers_cannot_reach_staff_endpoints() {
    let app = spawn_app().await;
    let admin_cookie = login_admin(&app).await;

    // Register an unaffiliated customer as admin, then log in as them.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/customers",
            Some(&admin_cookie),
            serde_json::json!({"barcode": "LC0004242"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/customer/login",
            None,
            serde_json::json!({"barcode": "LC0004242"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let customer_cookie = session_cookie(&response);

    let response = app
        .clone()
        .oneshot(get_request("/api/auth/me", Some(&customer_cookie)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["role"], "customer");

    for uri in ["/api/customers", "/api/dashboard/stats"] {
        let response = app
            .clone()
            .oneshot(get_request(uri, Some(&customer_cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
    }

    // And store-owner management stays admin-only.
    let response = app
        .clone()
        .oneshot(get_request("/api/store-owners", Some(&customer_cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn store_scope_hides_other_stores_customers() {
    let app = spawn_app().await;
    let admin_cookie = login_admin(&app).await;

    for (email, name) in [("a@example.com", "Store A"), ("b@example.com", "Store B")] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/store-owners",
                Some(&admin_cookie),
                serde_json::json!({"email": email, "password": "hunter22!", "store_name": name}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let login = |email: &str| {
        json_request(
            "POST",
            "/api/auth/store-owner/login",
            None,
            serde_json::json!({"email": email, "password": "hunter22!"}),
        )
    };

    let response = app.clone().oneshot(login("a@example.com")).await.unwrap();
    let cookie_a = session_cookie(&response);
    let response = app.clone().oneshot(login("b@example.com")).await.unwrap();
    let cookie_b = session_cookie(&response);

    // Store A registers a customer.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/customers",
            Some(&cookie_a),
            serde_json::json!({"barcode": "LC0007777"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let customer_id = body["data"]["id"].as_i64().unwrap();

    // Store B can neither resolve the barcode nor fetch the record.
    let response = app
        .clone()
        .oneshot(get_request(
            "/api/customers/resolve/LC0007777",
            Some(&cookie_b),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(get_request(
            &format!("/api/customers/{customer_id}"),
            Some(&cookie_b),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // A duplicate registration of the same barcode conflicts, whoever asks.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/customers",
            Some(&cookie_b),
            serde_json::json!({"barcode": "LC0007777"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn admin_manages_store_owner_lifecycle() {
    let app = spawn_app().await;
    let admin_cookie = login_admin(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/store-owners",
            Some(&admin_cookie),
            serde_json::json!({
                "email": "owner@example.com",
                "password": "hunter22!",
                "store_name": "Owner Store"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let owner_id = body["data"]["id"].as_i64().unwrap();

    // Duplicate email conflicts.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/store-owners",
            Some(&admin_cookie),
            serde_json::json!({
                "email": "owner@example.com",
                "password": "hunter22!",
                "store_name": "Another Store"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Deactivate, then the owner's login stops working.
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/store-owners/{owner_id}/active"),
            Some(&admin_cookie),
            serde_json::json!({"is_active": false}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/store-owner/login",
            None,
            serde_json::json!({"email": "owner@example.com", "password": "hunter22!"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/store-owners/{owner_id}"))
                .header(header::COOKIE, &admin_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/api/store-owners", Some(&admin_cookie)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let app = spawn_app().await;
    let admin_cookie = login_admin(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/logout",
            Some(&admin_cookie),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/api/customers", Some(&admin_cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
