use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use lifeline_api::{AppState, AppStateInner, auth::create_token, router};
use lifeline_db::Database;
use lifeline_types::api::LoginProfile;
use lifeline_types::models::{Role, UserStatus};

const SECRET: &str = "test-secret";

struct TestApp {
    router: Router,
    state: AppState,
}

impl TestApp {
    fn new() -> Self {
        let db = Database::open_in_memory().unwrap();
        let state = AppStateInner::new(db, SECRET, false);
        Self { router: router(state.clone()), state }
    }

    /// Register a user directly in the store and return a session token.
    fn user(&self, email: &str, role: Role) -> String {
        let profile = LoginProfile {
            email: email.to_string(),
            name: Some(email.split('@').next().unwrap().to_string()),
            blood_group: Some("O+".into()),
            district: Some("47".into()),
            upazila: Some("Savar".into()),
            ..Default::default()
        };
        self.state.db.upsert_login(&profile).unwrap();
        if role != Role::Donor {
            let id = self.user_id(email);
            self.state.db.set_user_role(&id, role).unwrap();
        }
        create_token(SECRET, email).unwrap()
    }

    fn user_id(&self, email: &str) -> String {
        self.state.db.get_user_by_email(email).unwrap().unwrap().id
    }

    fn block(&self, email: &str) {
        let id = self.user_id(email);
        self.state.db.set_user_status(&id, UserStatus::Blocked).unwrap();
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        self.send(request(method, uri, token, body)).await
    }

    async fn create_request(&self, token: &str, hospital: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/create-donation-request",
                Some(token),
                Some(json!({ "hospitalName": hospital, "bloodGroup": "O+", "donationStatus": "done" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["insertedId"].as_str().unwrap().to_string()
    }
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("token={token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

// -- Session --

#[tokio::test]
async fn jwt_sets_http_only_cookie_usable_for_auth() {
    let app = TestApp::new();
    app.user("donor@x.com", Role::Donor);

    let resp = app
        .router
        .clone()
        .oneshot(request(Method::POST, "/jwt", None, Some(json!({ "email": "donor@x.com", "name": "D" }))))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("token="), "{cookie}");
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));

    let token = cookie
        .trim_start_matches("token=")
        .split(';')
        .next()
        .unwrap()
        .to_string();
    let (status, body) = app.call(Method::GET, "/requests/recent", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let app = TestApp::new();
    let resp = app
        .router
        .clone()
        .oneshot(request(Method::GET, "/logout", None, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn protected_routes_require_a_valid_credential() {
    let app = TestApp::new();

    let (status, body) = app.call(Method::GET, "/donation-requests", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "unauthorized access");

    let (status, _) = app.call(Method::GET, "/donation-requests", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = create_token("another-secret", "donor@x.com").unwrap();
    let (status, _) = app.call(Method::GET, "/donation-requests", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn creation_funding_and_stats_need_a_session() {
    let app = TestApp::new();
    let cases = [
        (Method::POST, "/create-donation-request", Some(json!({ "hospitalName": "DMCH" }))),
        (Method::POST, "/create-fund", Some(json!({ "name": "D", "email": "d@x.com", "amount": 5 }))),
        (Method::GET, "/funds", None),
        (Method::GET, "/dashboard-stats", None),
    ];
    for (method, uri, body) in cases {
        let (status, _) = app.call(method, uri, None, body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn bearer_header_is_accepted() {
    let app = TestApp::new();
    let token = app.user("donor@x.com", Role::Donor);

    let req = Request::builder()
        .uri("/donation-requests")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(req).await;
    assert_eq!(status, StatusCode::OK);
}

// -- Identity --

#[tokio::test]
async fn save_user_is_an_upsert() {
    let app = TestApp::new();
    let body = json!({ "email": "new@x.com", "name": "New", "role": "admin", "status": "blocked" });

    let (status, first) = app.call(Method::POST, "/user", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(first["insertedId"].is_string());

    let (status, second) = app.call(Method::POST, "/user", None, Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["matchedCount"], 1);

    let (status, role) = app.call(Method::GET, "/users/role/new@x.com", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(role, json!({ "role": "donor" }));

    let user = app.state.db.get_user_by_email("new@x.com").unwrap().unwrap();
    assert_eq!(user.status, UserStatus::Active);
    assert_eq!(app.state.db.list_users(None).unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_role_lookup_is_not_found() {
    let app = TestApp::new();
    let (status, body) = app.call(Method::GET, "/users/role/ghost@x.com", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User Not Found");
}

#[tokio::test]
async fn user_management_is_admin_only() {
    let app = TestApp::new();
    let donor = app.user("donor@x.com", Role::Donor);
    let volunteer = app.user("vol@x.com", Role::Volunteer);
    let admin = app.user("admin@x.com", Role::Admin);
    let donor_id = app.user_id("donor@x.com");

    let (status, _) = app.call(Method::GET, "/users", Some(&donor), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.call(Method::GET, "/users", Some(&volunteer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.call(Method::GET, "/users?status=all", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 3);

    let uri = format!("/users/{donor_id}/status");
    let (status, body) = app.call(Method::PATCH, &uri, Some(&admin), Some(json!({ "status": "blocked" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["modifiedCount"], 1);

    let (_, body) = app.call(Method::GET, "/users?status=blocked", Some(&admin), None).await;
    assert_eq!(body["users"][0]["email"], "donor@x.com");

    let (status, _) = app.call(Method::PATCH, &uri, Some(&admin), Some(json!({ "status": "deleted" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let role_uri = format!("/users/{donor_id}/role");
    let (status, body) = app.call(Method::PATCH, &role_uri, Some(&admin), Some(json!({ "role": "donor" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid role");

    let (status, _) = app.call(Method::PATCH, &role_uri, Some(&admin), Some(json!({ "role": "volunteer" }))).await;
    assert_eq!(status, StatusCode::OK);

    let unknown = format!("/users/{}/status", Uuid::new_v4());
    let (status, _) = app.call(Method::PATCH, &unknown, Some(&admin), Some(json!({ "status": "active" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn padded_email_resolves_to_one_identity() {
    let app = TestApp::new();
    let profile = json!({ "email": " donor@x.com ", "name": "Donor" });

    let (status, body) = app.call(Method::POST, "/user", None, Some(profile.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["insertedId"].is_string());

    let resp = app
        .router
        .clone()
        .oneshot(request(Method::POST, "/jwt", None, Some(profile)))
        .await
        .unwrap();
    let cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    let token = cookie.trim_start_matches("token=").split(';').next().unwrap().to_string();

    let (status, body) = app
        .call(Method::POST, "/create-donation-request", Some(&token), Some(json!({ "hospitalName": "DMCH" })))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = app.call(Method::GET, "/users/role/donor@x.com", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "role": "donor" }));
}

#[tokio::test]
async fn profile_read_and_edit() {
    let app = TestApp::new();
    let token = app.user("donor@x.com", Role::Donor);

    let (status, _) = app.call(Method::PATCH, "/profile", Some(&token), Some(json!({ "upazila": "Dhamrai" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.call(Method::GET, "/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["upazila"], "Dhamrai");
    assert_eq!(body["role"], "donor");

    let (status, _) = app.call(Method::PATCH, "/profile", Some(&token), Some(json!({ "role": "admin" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// -- Donor search --

#[tokio::test]
async fn search_donors_requires_all_parameters() {
    let app = TestApp::new();
    let (status, body) = app.call(Method::GET, "/search-donors?bloodGroup=O%2B&district=47", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn search_donors_without_match_is_empty() {
    let app = TestApp::new();
    app.user("donor@x.com", Role::Donor);
    let (status, body) = app
        .call(Method::GET, "/search-donors?bloodGroup=O%2B&district=10&upazila=Savar", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn search_donors_enriches_district_name() {
    let app = TestApp::new();
    app.user("donor@x.com", Role::Donor);
    app.user("blocked@x.com", Role::Donor);
    app.block("blocked@x.com");

    let (status, body) = app
        .call(Method::GET, "/search-donors?bloodGroup=O%2B&district=47&upazila=Savar", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["email"], "donor@x.com");
    assert_eq!(rows[0]["districtName"], "Dhaka");
    assert!(rows[0].get("role").is_none());
    assert!(rows[0].get("status").is_none());
}

// -- Donation requests --

#[tokio::test]
async fn new_request_is_pending_and_cannot_be_closed() {
    let app = TestApp::new();
    let token = app.user("donor@x.com", Role::Donor);
    let id = app.create_request(&token, "DMCH").await;

    let (status, body) = app.call(Method::GET, &format!("/donation-requests/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["donationStatus"], "pending");
    assert_eq!(body["requesterEmail"], "donor@x.com");

    let (status, body) = app
        .call(Method::PUT, &format!("/requests/{id}/status"), Some(&token), Some(json!({ "status": "done" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": false }));
}

#[tokio::test]
async fn request_lifecycle_through_donation() {
    let app = TestApp::new();
    let owner = app.user("donor@x.com", Role::Donor);
    let helper = app.user("helper@x.com", Role::Donor);
    let id = app.create_request(&owner, "DMCH").await;

    // The requester cannot fulfil their own request.
    let (status, _) = app.call(Method::PUT, &format!("/donation-requests/{id}/donate"), Some(&owner), Some(json!({}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call(Method::PUT, &format!("/donation-requests/{id}/donate"), Some(&helper), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, body) = app.call(Method::GET, &format!("/donation-requests/{id}"), Some(&owner), None).await;
    assert_eq!(body["donationStatus"], "inprogress");
    assert_eq!(body["donorEmail"], "helper@x.com");
    assert_eq!(body["donorName"], "helper");

    let uri = format!("/requests/{id}/status");
    let (status, _) = app.call(Method::PUT, &uri, Some(&helper), Some(json!({ "status": "done" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = app.call(Method::PUT, &uri, Some(&owner), Some(json!({ "status": "done" }))).await;
    assert_eq!(body["success"], true);

    // Terminal: a second close is a no-op.
    let (_, body) = app.call(Method::PUT, &uri, Some(&owner), Some(json!({ "status": "canceled" }))).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn close_rejects_non_closing_statuses() {
    let app = TestApp::new();
    let token = app.user("donor@x.com", Role::Donor);
    let id = app.create_request(&token, "DMCH").await;

    for status in ["inprogress", "pending", "archived"] {
        let (code, body) = app
            .call(Method::PUT, &format!("/requests/{id}/status"), Some(&token), Some(json!({ "status": status })))
            .await;
        assert_eq!(code, StatusCode::BAD_REQUEST, "{status}");
        assert_eq!(body["message"], "Invalid status update");
    }
}

#[tokio::test]
async fn staff_status_route_follows_the_transition_table() {
    let app = TestApp::new();
    let owner = app.user("donor@x.com", Role::Donor);
    let volunteer = app.user("vol@x.com", Role::Volunteer);
    let id = app.create_request(&owner, "DMCH").await;
    let uri = format!("/donation-requests/{id}/status");

    let (status, _) = app.call(Method::PUT, &uri, Some(&owner), Some(json!({ "status": "inprogress" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = app.call(Method::PUT, &uri, Some(&volunteer), Some(json!({ "status": "done" }))).await;
    assert_eq!(body["success"], false);

    let (_, body) = app.call(Method::PUT, &uri, Some(&volunteer), Some(json!({ "status": "inprogress" }))).await;
    assert_eq!(body["success"], true);

    // Starting a request always names a donor, here the acting volunteer.
    let (_, body) = app.call(Method::GET, &format!("/donation-requests/{id}"), Some(&owner), None).await;
    assert_eq!(body["donationStatus"], "inprogress");
    assert_eq!(body["donorEmail"], "vol@x.com");
    assert_eq!(body["donorName"], "vol");

    let (_, body) = app.call(Method::PUT, &uri, Some(&volunteer), Some(json!({ "status": "canceled" }))).await;
    assert_eq!(body["success"], true);

    let (_, body) = app.call(Method::PUT, &uri, Some(&volunteer), Some(json!({ "status": "pending" }))).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn blocked_user_cannot_create_requests() {
    let app = TestApp::new();
    let token = app.user("donor@x.com", Role::Donor);
    app.block("donor@x.com");

    let (status, body) = app
        .call(
            Method::POST,
            "/create-donation-request",
            Some(&token),
            Some(json!({ "requesterEmail": "donor@x.com", "hospitalName": "DMCH" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "message": "Access denied. You are blocked." }));
}

#[tokio::test]
async fn unknown_user_cannot_create_requests() {
    let app = TestApp::new();
    let token = create_token(SECRET, "ghost@x.com").unwrap();

    let (status, body) = app
        .call(Method::POST, "/create-donation-request", Some(&token), Some(json!({ "hospitalName": "DMCH" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied. You are blocked.");
}

#[tokio::test]
async fn requests_cannot_be_created_for_someone_else() {
    let app = TestApp::new();
    let token = app.user("donor@x.com", Role::Donor);
    app.user("other@x.com", Role::Donor);

    let (status, _) = app
        .call(
            Method::POST,
            "/create-donation-request",
            Some(&token),
            Some(json!({ "requesterEmail": "other@x.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn owner_listings_are_scoped() {
    let app = TestApp::new();
    let a = app.user("a@x.com", Role::Donor);
    let b = app.user("b@x.com", Role::Donor);
    for i in 0..4 {
        app.create_request(&a, &format!("a-{i}")).await;
    }
    app.create_request(&b, "b-0").await;

    let (_, body) = app.call(Method::GET, "/donation-requests", Some(&a), None).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r["requesterEmail"] == "a@x.com"));
    assert_eq!(rows[0]["hospitalName"], "a-3");

    let (_, body) = app.call(Method::GET, "/donation-requests?status=done", Some(&a), None).await;
    assert_eq!(body, json!([]));

    // Unknown filters are ignored.
    let (_, body) = app.call(Method::GET, "/donation-requests?status=bogus", Some(&a), None).await;
    assert_eq!(body.as_array().unwrap().len(), 4);

    let (_, body) = app.call(Method::GET, "/requests/recent", Some(&a), None).await;
    let hospitals: Vec<&str> = body.as_array().unwrap().iter().map(|r| r["hospitalName"].as_str().unwrap()).collect();
    assert_eq!(hospitals, vec!["a-3", "a-2", "a-1"]);
}

#[tokio::test]
async fn all_requests_listing_is_for_staff() {
    let app = TestApp::new();
    let donor = app.user("donor@x.com", Role::Donor);
    let volunteer = app.user("vol@x.com", Role::Volunteer);
    app.create_request(&donor, "DMCH").await;

    let (status, body) = app.call(Method::GET, "/all-donation-requests", Some(&donor), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "forbidden access");

    let (status, body) = app.call(Method::GET, "/all-donation-requests?status=pending", Some(&volunteer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = app.call(Method::GET, "/pending-donation-requests", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn update_and_delete_respect_ownership() {
    let app = TestApp::new();
    let owner = app.user("donor@x.com", Role::Donor);
    let stranger = app.user("other@x.com", Role::Donor);
    let volunteer = app.user("vol@x.com", Role::Volunteer);
    let admin = app.user("admin@x.com", Role::Admin);
    let id = app.create_request(&owner, "DMCH").await;
    let uri = format!("/donation-requests/{id}");
    let patch = json!({ "hospitalName": "Square", "_id": "zzz" });

    let (status, _) = app.call(Method::PUT, &uri, Some(&stranger), Some(patch.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.call(Method::PUT, &uri, Some(&owner), Some(patch)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["modifiedCount"], 1);

    let (_, body) = app.call(Method::GET, &uri, Some(&stranger), None).await;
    assert_eq!(body["hospitalName"], "Square");
    assert_eq!(body["id"], id);

    let (status, _) = app.call(Method::DELETE, &uri, Some(&volunteer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.call(Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"], 1);

    let (status, body) = app.call(Method::GET, &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not found");
}

#[tokio::test]
async fn malformed_ids_are_bad_requests() {
    let app = TestApp::new();
    let donor = app.user("donor@x.com", Role::Donor);
    let admin = app.user("admin@x.com", Role::Admin);

    let cases = [
        (Method::GET, "/donation-requests/not-a-uuid", &donor, None),
        (Method::DELETE, "/donation-requests/42", &donor, None),
        (Method::PUT, "/requests/abc/status", &donor, Some(json!({ "status": "done" }))),
        (Method::PATCH, "/users/nope/status", &admin, Some(json!({ "status": "active" }))),
        (Method::DELETE, "/blogs/nope", &admin, None),
    ];
    for (method, uri, token, body) in cases {
        let (status, reply) = app.call(method, uri, Some(token.as_str()), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(reply["message"], "Invalid id", "{uri}");
    }

    let (status, _) = app.call(Method::GET, "/blogs/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Well-formed but unknown ids are still not found.
    let (status, _) = app
        .call(Method::GET, &format!("/donation-requests/{}", Uuid::new_v4()), Some(&donor), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let app = TestApp::new();
    let token = app.user("donor@x.com", Role::Donor);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/create-donation-request")
        .header(header::COOKIE, format!("token={token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

// -- Ancillary --

#[tokio::test]
async fn contact_requires_every_field() {
    let app = TestApp::new();
    let (status, body) = app
        .call(Method::POST, "/contact", None, Some(json!({ "name": "R", "email": "r@x.com", "message": "hi" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "All fields are required");

    let form = json!({ "name": "R", "email": "r@x.com", "contact": "0170", "message": "hi" });
    let (status, body) = app.call(Method::POST, "/contact", None, Some(form)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["insertedId"].is_string());

    let admin = app.user("admin@x.com", Role::Admin);
    let (_, body) = app.call(Method::GET, "/contact", Some(&admin), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn blog_moderation() {
    let app = TestApp::new();
    let volunteer = app.user("vol@x.com", Role::Volunteer);
    let admin = app.user("admin@x.com", Role::Admin);
    let donor = app.user("donor@x.com", Role::Donor);

    let blog = json!({ "title": "Why give", "content": "Because.", "status": "published" });
    let (status, _) = app.call(Method::POST, "/blogs", Some(&donor), Some(blog.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.call(Method::POST, "/blogs", Some(&volunteer), Some(blog)).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["insertedId"].as_str().unwrap().to_string();

    let (_, body) = app.call(Method::GET, &format!("/blogs/{id}"), None, None).await;
    assert_eq!(body["status"], "draft");

    let uri = format!("/blogs/{id}/status");
    let (status, _) = app.call(Method::PATCH, &uri, Some(&volunteer), Some(json!({ "status": "published" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.call(Method::PATCH, &uri, Some(&admin), Some(json!({ "status": "published" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.call(Method::GET, "/blogs?status=published", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    let (_, body) = app.call(Method::GET, "/blogs?status=draft", None, None).await;
    assert_eq!(body, json!([]));

    let (status, _) = app.call(Method::DELETE, &format!("/blogs/{id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.call(Method::GET, &format!("/blogs/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn funds_and_dashboard_stats() {
    let app = TestApp::new();
    let donor = app.user("donor@x.com", Role::Donor);
    let admin = app.user("admin@x.com", Role::Admin);
    app.create_request(&donor, "DMCH").await;

    let fund = json!({ "name": "Donor", "email": "donor@x.com", "amount": 50.0 });
    let (status, _) = app.call(Method::POST, "/create-fund", Some(&donor), Some(fund)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .call(Method::POST, "/create-fund", Some(&donor), Some(json!({ "name": "D", "email": "d@x.com", "amount": -1 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.call(Method::GET, "/funds", Some(&donor), None).await;
    assert_eq!(body[0]["status"], "success");

    let (status, _) = app.call(Method::GET, "/dashboard-stats", Some(&donor), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.call(Method::GET, "/dashboard-stats", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "totalDonors": 1, "totalRequests": 1, "totalFunding": 50.0 }));
}

#[tokio::test]
async fn districts_are_public() {
    let app = TestApp::new();
    let (status, body) = app.call(Method::GET, "/districts", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 64);
}
