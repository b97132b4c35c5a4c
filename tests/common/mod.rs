//! In-process mock of the rentals backend, served over real HTTP so the
//! client under test exercises its full request path.
#![allow(dead_code)]

use actix_web::{delete, get, patch, post, web, App, HttpRequest, HttpResponse, HttpServer};
use rentals::{ApiClient, ClientConfig, Credentials, Navigator, SessionStore};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

pub const EMAIL: &str = "guest@example.com";
pub const PASSWORD: &str = "correct-horse";
pub const FIRST_ACCESS: &str = "access-1";
pub const REFRESH: &str = "refresh-1";
pub const RENEWED_ACCESS: &str = "access-2";
/// Check-in date the mock treats as already booked
pub const TAKEN_CHECK_IN: &str = "2025-07-01";

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct Hit {
    pub method: String,
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
    pub body: String,
}

pub struct Backend {
    pub valid_access: Mutex<String>,
    pub refresh_ok: AtomicBool,
    pub refresh_calls: AtomicUsize,
    pub always_unauthorized: AtomicBool,
    pub fail_saved_ids: AtomicBool,
    pub saved: Mutex<BTreeSet<u64>>,
    pub hits: Mutex<Vec<Hit>>,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            valid_access: Mutex::new(FIRST_ACCESS.to_string()),
            refresh_ok: AtomicBool::new(true),
            refresh_calls: AtomicUsize::new(0),
            always_unauthorized: AtomicBool::new(false),
            fail_saved_ids: AtomicBool::new(false),
            saved: Mutex::new(BTreeSet::new()),
            hits: Mutex::new(Vec::new()),
        }
    }
}

impl Backend {
    fn record(&self, req: &HttpRequest, body: &[u8]) {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        self.hits.lock().unwrap().push(Hit {
            method: req.method().to_string(),
            path: req.path().to_string(),
            query: req.query_string().to_string(),
            authorization: header("authorization"),
            request_id: header("x-request-id"),
            body: String::from_utf8_lossy(body).into_owned(),
        });
    }

    /// `Err` holds the 401 the real backend sends for a bad bearer token.
    fn authorize(&self, req: &HttpRequest) -> Result<(), HttpResponse> {
        let expected = format!("Bearer {}", self.valid_access.lock().unwrap());
        let given = req
            .headers()
            .get("authorization")
            .and_then(|value| value.to_str().ok());

        if self.always_unauthorized.load(Ordering::SeqCst) || given != Some(expected.as_str()) {
            return Err(HttpResponse::Unauthorized().json(json!({
                "detail": "Given token not valid for any token type",
                "code": "token_not_valid"
            })));
        }
        Ok(())
    }

    pub fn hits_for(&self, path: &str) -> Vec<Hit> {
        self.hits
            .lock()
            .unwrap()
            .iter()
            .filter(|hit| hit.path == path)
            .cloned()
            .collect()
    }

    pub fn hit_count(&self) -> usize {
        self.hits.lock().unwrap().len()
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

pub fn user_json() -> Value {
    json!({
        "id": 1,
        "email": EMAIL,
        "username": "guest",
        "first_name": "Ana",
        "last_name": "Silva",
        "bio": "",
        "avatar": "",
        "phone": "",
        "is_host": true,
        "listing_count": 1,
        "created_at": "2024-05-01T10:00:00Z"
    })
}

pub fn listing_json(id: u64) -> Value {
    json!({
        "id": id,
        "host": 1,
        "host_name": "Ana Silva",
        "title": "Cliffside cabin",
        "description": "Quiet cabin above the bay",
        "property_type": "cabin",
        "price_per_night": "100.00",
        "address": "1 Ridge Rd",
        "city": "Big Sur",
        "state": "CA",
        "country": "USA",
        "latitude": "36.270000",
        "longitude": "-121.807000",
        "guests": 4,
        "bedrooms": 2,
        "beds": 2,
        "bathrooms": "1.0",
        "has_wifi": true,
        "is_active": true,
        "images": [],
        "primary_image": null,
        "average_rating": null,
        "review_count": 0
    })
}

fn booking_json(id: u64, check_in: &str, check_out: &str, status: &str) -> Value {
    json!({
        "id": id,
        "listing": 7,
        "listing_title": "Cliffside cabin",
        "guest": 1,
        "guest_name": "Ana Silva",
        "check_in": check_in,
        "check_out": check_out,
        "guests": 2,
        "total_price": "300.00",
        "status": status,
        "notes": "",
        "nights": 3
    })
}

#[post("/auth/login/")]
async fn login(req: HttpRequest, body: web::Bytes, state: web::Data<Backend>) -> HttpResponse {
    state.record(&req, &body);
    let form: Value = serde_json::from_slice(&body).unwrap_or_default();
    if form["email"] == EMAIL && form["password"] == PASSWORD {
        *state.valid_access.lock().unwrap() = FIRST_ACCESS.to_string();
        HttpResponse::Ok().json(json!({"access": FIRST_ACCESS, "refresh": REFRESH}))
    } else {
        HttpResponse::Unauthorized()
            .json(json!({"detail": "No active account found with the given credentials"}))
    }
}

#[post("/auth/register/")]
async fn register(req: HttpRequest, body: web::Bytes, state: web::Data<Backend>) -> HttpResponse {
    state.record(&req, &body);
    let form: Value = serde_json::from_slice(&body).unwrap_or_default();
    if form["email"] == "taken@example.com" {
        return HttpResponse::BadRequest()
            .json(json!({"email": ["user with this email already exists."]}));
    }
    HttpResponse::Created().json(json!({
        "tokens": {"access": FIRST_ACCESS, "refresh": REFRESH},
        "user": {
            "id": 2,
            "email": form["email"],
            "username": form["username"],
            "first_name": form["first_name"],
            "last_name": form["last_name"],
            "is_host": false
        }
    }))
}

#[post("/auth/token/refresh/")]
async fn refresh(req: HttpRequest, body: web::Bytes, state: web::Data<Backend>) -> HttpResponse {
    state.record(&req, &body);
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let form: Value = serde_json::from_slice(&body).unwrap_or_default();
    if state.refresh_ok.load(Ordering::SeqCst) && form["refresh"] == REFRESH {
        *state.valid_access.lock().unwrap() = RENEWED_ACCESS.to_string();
        HttpResponse::Ok().json(json!({"access": RENEWED_ACCESS}))
    } else {
        HttpResponse::Unauthorized().json(json!({
            "detail": "Token is invalid or expired",
            "code": "token_not_valid"
        }))
    }
}

#[get("/auth/profile/")]
async fn profile(req: HttpRequest, state: web::Data<Backend>) -> HttpResponse {
    state.record(&req, &[]);
    if let Err(denied) = state.authorize(&req) {
        return denied;
    }
    HttpResponse::Ok().json(user_json())
}

#[patch("/auth/profile/update/")]
async fn update_profile(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<Backend>,
) -> HttpResponse {
    state.record(&req, &body);
    if let Err(denied) = state.authorize(&req) {
        return denied;
    }
    let changes: Value = serde_json::from_slice(&body).unwrap_or_default();
    if changes["username"] == "taken" {
        return HttpResponse::BadRequest()
            .json(json!({"username": ["A user with that username already exists."]}));
    }
    let mut user = user_json();
    if let (Some(user), Some(changes)) = (user.as_object_mut(), changes.as_object()) {
        for (key, value) in changes {
            user.insert(key.clone(), value.clone());
        }
    }
    HttpResponse::Ok().json(user)
}

#[post("/auth/profile/password/")]
async fn change_password(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<Backend>,
) -> HttpResponse {
    state.record(&req, &body);
    if let Err(denied) = state.authorize(&req) {
        return denied;
    }
    HttpResponse::NoContent().finish()
}

#[get("/search/")]
async fn search(req: HttpRequest, state: web::Data<Backend>) -> HttpResponse {
    state.record(&req, &[]);
    HttpResponse::Ok().json(json!({
        "count": 13,
        "page": 2,
        "page_size": 12,
        "total_pages": 2,
        "results": [listing_json(7)],
        "engine": "django-orm"
    }))
}

#[get("/search/autocomplete/")]
async fn autocomplete(req: HttpRequest, state: web::Data<Backend>) -> HttpResponse {
    state.record(&req, &[]);
    HttpResponse::Ok().json(json!([
        {"city": "Big Sur", "country": "USA", "label": "Big Sur, USA"}
    ]))
}

#[get("/listings/host/stats/")]
async fn host_stats(req: HttpRequest, state: web::Data<Backend>) -> HttpResponse {
    state.record(&req, &[]);
    if let Err(denied) = state.authorize(&req) {
        return denied;
    }
    HttpResponse::Ok().json(json!({
        "total_listings": 1,
        "active_listings": 1,
        "total_bookings": 2,
        "pending_bookings": 1,
        "confirmed_bookings": 1,
        "total_revenue": 300.0,
        "total_guests": 2,
        "average_rating": null,
        "total_reviews": 0
    }))
}

#[get("/listings/host/my-listings/")]
async fn host_listings(req: HttpRequest, state: web::Data<Backend>) -> HttpResponse {
    state.record(&req, &[]);
    if let Err(denied) = state.authorize(&req) {
        return denied;
    }
    HttpResponse::Ok().json(json!([listing_json(7)]))
}

#[get("/listings/host/bookings/")]
async fn host_bookings(req: HttpRequest, state: web::Data<Backend>) -> HttpResponse {
    state.record(&req, &[]);
    if let Err(denied) = state.authorize(&req) {
        return denied;
    }
    HttpResponse::Ok().json(json!([
        booking_json(3, "2025-06-01", "2025-06-04", "confirmed"),
        booking_json(4, "2025-08-01", "2025-08-04", "pending")
    ]))
}

#[get("/listings/{id}/")]
async fn listing(req: HttpRequest, path: web::Path<u64>, state: web::Data<Backend>) -> HttpResponse {
    state.record(&req, &[]);
    match path.into_inner() {
        404 => HttpResponse::NotFound().json(json!({"detail": "Not found."})),
        500 => HttpResponse::InternalServerError()
            .content_type("text/html")
            .body("<h1>Server Error (500)</h1>"),
        8 => {
            let mut listing = listing_json(8);
            listing["price_per_night"] = json!("99.50");
            HttpResponse::Ok().json(listing)
        }
        id => HttpResponse::Ok().json(listing_json(id)),
    }
}

#[delete("/listings/{id}/")]
async fn delete_listing(
    req: HttpRequest,
    _path: web::Path<u64>,
    state: web::Data<Backend>,
) -> HttpResponse {
    state.record(&req, &[]);
    if let Err(denied) = state.authorize(&req) {
        return denied;
    }
    HttpResponse::NoContent().finish()
}

#[post("/bookings/")]
async fn create_booking(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<Backend>,
) -> HttpResponse {
    state.record(&req, &body);
    if let Err(denied) = state.authorize(&req) {
        return denied;
    }
    let form: Value = serde_json::from_slice(&body).unwrap_or_default();
    if form["check_in"] == TAKEN_CHECK_IN {
        return HttpResponse::BadRequest()
            .json(json!({"non_field_errors": ["These dates are not available."]}));
    }
    let check_in = form["check_in"].as_str().unwrap_or_default();
    let check_out = form["check_out"].as_str().unwrap_or_default();
    HttpResponse::Created().json(booking_json(11, check_in, check_out, "pending"))
}

#[get("/bookings/availability/{id}/")]
async fn availability(
    req: HttpRequest,
    _path: web::Path<u64>,
    state: web::Data<Backend>,
) -> HttpResponse {
    state.record(&req, &[]);
    if let Err(denied) = state.authorize(&req) {
        return denied;
    }
    HttpResponse::Ok().json(json!([
        {"check_in": "2025-06-10", "check_out": "2025-06-15"}
    ]))
}

#[post("/wishlists/toggle/{id}/")]
async fn toggle_saved(
    req: HttpRequest,
    path: web::Path<u64>,
    state: web::Data<Backend>,
) -> HttpResponse {
    state.record(&req, &[]);
    if let Err(denied) = state.authorize(&req) {
        return denied;
    }
    let id = path.into_inner();
    let mut saved = state.saved.lock().unwrap();
    let now_saved = if saved.remove(&id) {
        false
    } else {
        saved.insert(id);
        true
    };
    HttpResponse::Ok().json(json!({ "saved": now_saved }))
}

#[get("/wishlists/saved/ids/")]
async fn saved_ids(req: HttpRequest, state: web::Data<Backend>) -> HttpResponse {
    state.record(&req, &[]);
    if let Err(denied) = state.authorize(&req) {
        return denied;
    }
    if state.fail_saved_ids.load(Ordering::SeqCst) {
        return HttpResponse::InternalServerError().json(json!({"detail": "Wishlist service down"}));
    }
    let ids: Vec<u64> = state.saved.lock().unwrap().iter().copied().collect();
    HttpResponse::Ok().json(ids)
}

/// Serve the mock on an ephemeral port and return its API root.
pub fn spawn_backend(state: web::Data<Backend>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind mock backend");
    let addr = listener.local_addr().expect("Mock backend has no address");

    let server = HttpServer::new(move || {
        App::new().app_data(state.clone()).service(
            web::scope("/api")
                .service(login)
                .service(register)
                .service(refresh)
                .service(profile)
                .service(update_profile)
                .service(change_password)
                .service(search)
                .service(autocomplete)
                .service(host_stats)
                .service(host_listings)
                .service(host_bookings)
                .service(listing)
                .service(delete_listing)
                .service(create_booking)
                .service(availability)
                .service(toggle_saved)
                .service(saved_ids),
        )
    })
    .workers(1)
    .disable_signals()
    .listen(listener)
    .expect("Failed to listen")
    .run();

    actix_rt::spawn(server);
    format!("http://{addr}/api")
}

/// Counts forced session resets.
#[derive(Default)]
pub struct CountingNavigator {
    resets: AtomicUsize,
}

impl CountingNavigator {
    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}

impl Navigator for CountingNavigator {
    fn reset_to_root(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct TestEnv {
    pub backend: web::Data<Backend>,
    pub client: ApiClient,
    pub navigator: Arc<CountingNavigator>,
    _temp_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let backend = web::Data::new(Backend::default());
        let api_url = spawn_backend(backend.clone());
        Self::with_api_url(backend, &api_url)
    }

    pub fn with_api_url(backend: web::Data<Backend>, api_url: &str) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("session.db").display().to_string();

        let config = ClientConfig::new(api_url, &db_path)
            .expect("Invalid test config")
            .with_timeout(Duration::from_secs(5));
        let session = SessionStore::open(&db_path).expect("Failed to open session store");
        let navigator = Arc::new(CountingNavigator::default());
        let client = ApiClient::new(&config, session)
            .expect("Failed to build client")
            .with_navigator(navigator.clone());

        Self {
            backend,
            client,
            navigator,
            _temp_dir: temp_dir,
        }
    }

    /// Store a credential pair as if a previous sign-in had happened.
    pub fn sign_in_as(&self, access: &str) {
        self.client
            .session()
            .set(&Credentials::new(access, REFRESH))
            .expect("Failed to seed credentials");
    }

    pub fn stored(&self) -> Option<Credentials> {
        self.client.session().get().expect("Failed to read credentials")
    }
}
