//! Test doubles shared across the suite.
//!
//! `MockBackend` is a real axum server bound to an ephemeral port that
//! speaks the same wire contract as the game-operations backend: bearer
//! protection, camelCase pagination envelopes, and the message-string
//! toggle response. Tests drive the console against it over real HTTP.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    extract::{Extension, Json, Path, Query, Request},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post, put},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use crate::routes::Navigator;
use crate::utils::jwt::Claims;

/// Mints an HS256 token carrying the claims the backend would issue. The
/// console never checks the signature, so any secret works.
pub fn mint_token(sub: &str, role: &str, exp_offset_seconds: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: Some(sub.to_string()),
        role: Some(role.to_string()),
        exp: (now + exp_offset_seconds) as usize,
        iat: Some(now as usize),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"not-the-real-secret"),
    )
    .unwrap()
}

/// A navigator that records where it was sent.
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        RecordingNavigator {
            visits: Mutex::new(Vec::new()),
        }
    }

    pub fn last(&self) -> Option<String> {
        self.visits.lock().unwrap().last().cloned()
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visits.lock().unwrap().push(path.to_string());
    }
}

#[derive(Clone)]
struct Account {
    id: String,
    name: String,
    email: String,
    password: String,
    role: &'static str,
}

#[derive(Clone)]
struct PlayerRecord {
    id: String,
    name: String,
    email: String,
    country: String,
    active: bool,
    coins: u64,
    experience_point: u64,
    games_played: u64,
    games_won: u64,
}

impl PlayerRecord {
    fn stats_id(&self) -> String {
        format!("stats-{}", self.id)
    }

    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "country": self.country,
            "active": self.active,
            "stats_id": self.stats_id(),
            "statistics": {
                "id": self.stats_id(),
                "coins": self.coins,
                "experience_point": self.experience_point,
                "games_played": self.games_played,
                "games_won": self.games_won,
            },
        })
    }
}

struct BackendState {
    accounts: Mutex<Vec<Account>>,
    players: Mutex<Vec<PlayerRecord>>,
    register_issues_token: AtomicBool,
    hits: Mutex<HashMap<String, usize>>,
    staff_id: String,
    admin_id: String,
}

/// The in-process stand-in for the game-operations backend.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<BackendState>,
    server: JoinHandle<()>,
}

impl MockBackend {
    pub async fn spawn() -> Self {
        let admin_id = uuid::Uuid::now_v7().to_string();
        let staff_id = uuid::Uuid::now_v7().to_string();
        let player_account_id = uuid::Uuid::now_v7().to_string();

        let accounts = vec![
            Account {
                id: admin_id.clone(),
                name: "Odale".to_string(),
                email: "odale@example.com".to_string(),
                password: "admin-pass".to_string(),
                role: "admin",
            },
            Account {
                id: staff_id.clone(),
                name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
                password: "staff-pass".to_string(),
                role: "staff",
            },
            Account {
                id: player_account_id.clone(),
                name: "Niran".to_string(),
                email: "niran@example.com".to_string(),
                password: "player-pass".to_string(),
                role: "player",
            },
        ];

        let seed = [
            ("Niran", "NG", true, 900_u64, 2500_u64, 120_u64, 60_u64),
            ("Bola", "NG", true, 700, 1800, 90, 40),
            ("Chidi", "NG", false, 150, 600, 30, 10),
            ("Omar", "EG", true, 1200, 3200, 160, 95),
            ("Lina", "EG", true, 300, 950, 45, 18),
            ("Tunde", "GH", false, 20, 75, 8, 1),
        ];
        let players = seed
            .iter()
            .map(|(name, country, active, coins, xp, played, won)| PlayerRecord {
                id: if *name == "Niran" {
                    player_account_id.clone()
                } else {
                    uuid::Uuid::now_v7().to_string()
                },
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                country: country.to_string(),
                active: *active,
                coins: *coins,
                experience_point: *xp,
                games_played: *played,
                games_won: *won,
            })
            .collect();

        let state = Arc::new(BackendState {
            accounts: Mutex::new(accounts),
            players: Mutex::new(players),
            register_issues_token: AtomicBool::new(true),
            hits: Mutex::new(HashMap::new()),
            staff_id,
            admin_id,
        });

        let app = router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockBackend {
            addr,
            state,
            server,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn staff_id(&self) -> String {
        self.state.staff_id.clone()
    }

    pub fn admin_id(&self) -> String {
        self.state.admin_id.clone()
    }

    /// The id of a seeded player, looked up by name.
    pub fn player_id(&self, name: &str) -> String {
        self.state
            .players
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.id.clone())
            .unwrap_or_else(|| panic!("no seeded player named {name}"))
    }

    /// How many requests reached the given exact path.
    pub fn hits(&self, path: &str) -> usize {
        self.state
            .hits
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    /// Whether registration responses include credentials, as the real
    /// backend sometimes does and sometimes does not.
    pub fn set_register_issues_token(&self, issues: bool) {
        self.state
            .register_issues_token
            .store(issues, Ordering::SeqCst);
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn router(state: Arc<BackendState>) -> Router {
    let protected = Router::new()
        .route("/user", get(list_users).post(create_user))
        .route(
            "/user/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/user/players/all", get(list_players))
        .route("/user/player/update/{id}", put(update_player))
        .route("/user/player/setInactive/{id}", patch(toggle_player_active))
        .route("/player/leaderboard", get(leaderboard))
        .layer(middleware::from_fn(require_bearer));

    Router::new()
        .route("/player", post(player_entry))
        .merge(protected)
        .layer(middleware::from_fn(count_hits))
        .layer(Extension(state))
}

async fn count_hits(request: Request, next: Next) -> Response {
    if let Some(state) = request.extensions().get::<Arc<BackendState>>() {
        *state
            .hits
            .lock()
            .unwrap()
            .entry(request.uri().path().to_string())
            .or_insert(0) += 1;
    }
    next.run(request).await
}

async fn require_bearer(
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let has_bearer = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .map(|header| header.starts_with("Bearer "))
        .unwrap_or(false);

    if !has_bearer {
        return Err(error_body(StatusCode::UNAUTHORIZED, "Unauthorized"));
    }
    Ok(next.run(request).await)
}

fn error_body(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({"message": message, "statusCode": status.as_u16()})),
    )
}

fn account_json(account: &Account) -> Value {
    json!({
        "id": account.id,
        "name": account.name,
        "email": account.email,
        "role": account.role,
    })
}

fn meta_json(page: u32, page_size: u32, total: u64) -> Value {
    let total_pages = if total == 0 {
        0
    } else {
        ((total - 1) / u64::from(page_size) + 1) as u32
    };
    json!({
        "totalItems": total,
        "itemsPerPage": page_size,
        "currentPage": page,
        "totalPages": total_pages,
        "hasNextPage": page < total_pages,
        "hasPreviousPage": page > 1,
    })
}

fn paginated(items: Vec<Value>, page: u32, page_size: u32) -> Value {
    let total = items.len() as u64;
    let start = (page.saturating_sub(1) * page_size) as usize;
    let data: Vec<Value> = items
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .collect();
    json!({"data": data, "meta": meta_json(page, page_size, total)})
}

fn page_params(params: &HashMap<String, String>) -> (u32, u32) {
    let page = params
        .get("page")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);
    let page_size = params
        .get("pageSize")
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);
    (page, page_size)
}

/// POST /player doubles as login and registration; the payload shape tells
/// them apart, the same way the real backend dispatches it.
async fn player_entry(
    Extension(state): Extension<Arc<BackendState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if body.get("country").is_some() {
        return register(&state, &body);
    }

    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
    let password = body
        .get("password")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let accounts = state.accounts.lock().unwrap();
    match accounts
        .iter()
        .find(|a| a.email == email && a.password == password)
    {
        Some(account) => (
            StatusCode::OK,
            Json(json!({
                "accessToken": mint_token(&account.id, account.role, 3600),
                "id": account.id,
                "role": account.role,
                "name": account.name,
                "email": account.email,
            })),
        ),
        None => error_body(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

fn register(state: &BackendState, body: &Value) -> (StatusCode, Json<Value>) {
    let name = body.get("name").and_then(Value::as_str).unwrap_or_default();
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
    let country = body
        .get("country")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let password = body
        .get("password")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let id = uuid::Uuid::now_v7().to_string();
    state.accounts.lock().unwrap().push(Account {
        id: id.clone(),
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role: "player",
    });
    state.players.lock().unwrap().push(PlayerRecord {
        id: id.clone(),
        name: name.to_string(),
        email: email.to_string(),
        country: country.to_string(),
        active: true,
        coins: 0,
        experience_point: 0,
        games_played: 0,
        games_won: 0,
    });

    if state.register_issues_token.load(Ordering::SeqCst) {
        (
            StatusCode::CREATED,
            Json(json!({
                "accessToken": mint_token(&id, "player", 3600),
                "id": id,
                "role": "player",
                "name": name,
                "email": email,
            })),
        )
    } else {
        (
            StatusCode::CREATED,
            Json(json!({"message": "Registration successful"})),
        )
    }
}

async fn get_user(
    Extension(state): Extension<Arc<BackendState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let accounts = state.accounts.lock().unwrap();
    match accounts.iter().find(|a| a.id == id) {
        Some(account) => (StatusCode::OK, Json(account_json(account))),
        None => error_body(StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn list_users(
    Extension(state): Extension<Arc<BackendState>>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let (page, page_size) = page_params(&params);
    let items: Vec<Value> = state
        .accounts
        .lock()
        .unwrap()
        .iter()
        .map(account_json)
        .collect();
    (StatusCode::OK, Json(paginated(items, page, page_size)))
}

async fn create_user(
    Extension(state): Extension<Arc<BackendState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let account = Account {
        id: uuid::Uuid::now_v7().to_string(),
        name: body
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        email: body
            .get("email")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        password: body
            .get("password")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        role: match body.get("role").and_then(Value::as_str) {
            Some("admin") => "admin",
            Some("player") => "player",
            _ => "staff",
        },
    };
    let response = account_json(&account);
    state.accounts.lock().unwrap().push(account);
    (StatusCode::CREATED, Json(response))
}

async fn update_user(
    Extension(state): Extension<Arc<BackendState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut accounts = state.accounts.lock().unwrap();
    match accounts.iter_mut().find(|a| a.id == id) {
        Some(account) => {
            if let Some(name) = body.get("name").and_then(Value::as_str) {
                account.name = name.to_string();
            }
            if let Some(email) = body.get("email").and_then(Value::as_str) {
                account.email = email.to_string();
            }
            if let Some(password) = body.get("password").and_then(Value::as_str) {
                account.password = password.to_string();
            }
            match body.get("role").and_then(Value::as_str) {
                Some("admin") => account.role = "admin",
                Some("staff") => account.role = "staff",
                Some("player") => account.role = "player",
                _ => {}
            }
            (StatusCode::OK, Json(account_json(account)))
        }
        None => error_body(StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn delete_user(
    Extension(state): Extension<Arc<BackendState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let mut accounts = state.accounts.lock().unwrap();
    let before = accounts.len();
    accounts.retain(|a| a.id != id);
    if accounts.len() == before {
        return error_body(StatusCode::NOT_FOUND, "User not found");
    }
    (
        StatusCode::OK,
        Json(json!({"message": "User deleted successfully"})),
    )
}

async fn list_players(
    Extension(state): Extension<Arc<BackendState>>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let (page, page_size) = page_params(&params);
    let country = params.get("country").map(|c| c.to_lowercase());
    let search_key = params.get("searchKey").map(|k| k.to_lowercase());

    let items: Vec<Value> = state
        .players
        .lock()
        .unwrap()
        .iter()
        .filter(|p| match &country {
            Some(country) => p.country.to_lowercase() == *country,
            None => true,
        })
        .filter(|p| match &search_key {
            Some(key) => p.name.to_lowercase().contains(key),
            None => true,
        })
        .map(PlayerRecord::to_json)
        .collect();
    (StatusCode::OK, Json(paginated(items, page, page_size)))
}

async fn update_player(
    Extension(state): Extension<Arc<BackendState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut players = state.players.lock().unwrap();
    match players.iter_mut().find(|p| p.id == id) {
        Some(player) => {
            if let Some(name) = body.get("name").and_then(Value::as_str) {
                player.name = name.to_string();
            }
            if let Some(email) = body.get("email").and_then(Value::as_str) {
                player.email = email.to_string();
            }
            if let Some(country) = body.get("country").and_then(Value::as_str) {
                player.country = country.to_string();
            }
            (StatusCode::OK, Json(player.to_json()))
        }
        None => error_body(StatusCode::NOT_FOUND, "Player not found"),
    }
}

async fn toggle_player_active(
    Extension(state): Extension<Arc<BackendState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let mut players = state.players.lock().unwrap();
    match players.iter_mut().find(|p| p.id == id) {
        Some(player) => {
            player.active = !player.active;
            let message = if player.active {
                "player set to Active"
            } else {
                "player set to Inactive"
            };
            (StatusCode::OK, Json(json!({"message": message})))
        }
        None => error_body(StatusCode::NOT_FOUND, "Player not found"),
    }
}

async fn leaderboard(
    Extension(state): Extension<Arc<BackendState>>,
) -> (StatusCode, Json<Value>) {
    let items: Vec<Value> = state
        .players
        .lock()
        .unwrap()
        .iter()
        .map(PlayerRecord::to_json)
        .collect();
    let total = items.len() as u32;
    (StatusCode::OK, Json(paginated(items, 1, total.max(1))))
}
