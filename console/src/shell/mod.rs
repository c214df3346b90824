//! Interactive command loop.
//!
//! The shell is the console's front end: a line-based prompt that walks the
//! same screens the menus describe. Navigation goes through the route
//! guards, screens are the remote tables, and the player search box runs
//! with its real debounce. Nothing here owns business rules; it only turns
//! typed commands into calls on the core types and prints what came back.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::player::UpdatePlayerRequest;
use crate::api::user::{CreateUserRequest, UpdateUserRequest};
use crate::auth::context::AuthContext;
use crate::auth::guard::{AuthRequiredGuard, GateOutcome, GuardDecision, GuestOnlyGuard, RoleGate};
use crate::auth::models::{RegistrationRequest, Role};
use crate::config::Config;
use crate::errors::{ServiceError, ServiceResult};
use crate::http::HttpClient;
use crate::routes::{self, LOGIN_PATH, Navigator, REGISTER_PATH};
use crate::search::{BackendSearcher, DebouncedSearch, SearchField};
use crate::session::SessionStore;
use crate::tables::collection::{PageFetcher, RemoteCollection};
use crate::tables::leaderboard::LeaderboardTable;
use crate::tables::players::PlayerTable;
use crate::tables::sort::SortSource;
use crate::tables::users::UserTable;

/// Where the shell currently is. Doubles as the navigator handed to the
/// auth context, so a session restore lands the shell on its section home.
pub struct ShellLocation {
    current: Mutex<String>,
}

impl ShellLocation {
    fn new() -> Self {
        ShellLocation {
            current: Mutex::new(LOGIN_PATH.to_string()),
        }
    }

    pub fn current(&self) -> String {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, String> {
        match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Navigator for ShellLocation {
    fn navigate(&self, path: &str) {
        *self.lock() = path.to_string();
    }
}

enum PageView {
    Users(UserTable),
    Players {
        table: PlayerTable,
        search: DebouncedSearch<BackendSearcher>,
    },
    Leaderboard(LeaderboardTable),
}

enum ShellOutcome {
    Continue,
    Quit,
}

pub struct Shell {
    config: Config,
    http: Arc<HttpClient>,
    auth: AuthContext,
    location: Arc<ShellLocation>,
    page: Option<PageView>,
    pending_return: Option<String>,
}

impl Shell {
    pub fn new(config: Config) -> ServiceResult<Self> {
        let http = Arc::new(HttpClient::new(
            config.api_base_url.clone(),
            config.http_timeout(),
        )?);
        let location = Arc::new(ShellLocation::new());
        let store = SessionStore::new(config.session_file.clone());
        let auth = AuthContext::new(http.clone(), store, location.clone());

        Ok(Shell {
            config,
            http,
            auth,
            location,
            page: None,
            pending_return: None,
        })
    }

    /// Restores any persisted session, then reads commands until EOF or
    /// `quit`.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        println!("game operations console (type 'help' for commands)");

        self.auth.initialize().await;
        if self.auth.snapshot().await.is_authenticated {
            let home = self.location.current();
            self.open(&home).await;
        } else {
            println!("Not signed in. Use 'login <email> <password>'.");
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            {
                use std::io::Write;
                print!("{}> ", self.location.current());
                std::io::stdout().flush()?;
            }
            match lines.next_line().await? {
                Some(line) => {
                    if let ShellOutcome::Quit = self.handle(line.trim()).await {
                        break;
                    }
                }
                None => break,
            }
        }
        Ok(())
    }

    async fn handle(&mut self, line: &str) -> ShellOutcome {
        let mut parts = line.split_whitespace();
        let command = match parts.next() {
            Some(command) => command,
            None => return ShellOutcome::Continue,
        };
        let rest: Vec<&str> = parts.collect();

        match command {
            "help" => print_help(),
            "quit" | "exit" => return ShellOutcome::Quit,
            "whoami" => self.cmd_whoami().await,
            "menu" => self.cmd_menu().await,
            "login" => self.cmd_login(&rest).await,
            "register" => self.cmd_register(&rest).await,
            "logout" => self.cmd_logout().await,
            "open" => match rest.first() {
                Some(path) => self.open(path).await,
                None => println!("usage: open <path>"),
            },
            "users" => self.cmd_users(&rest).await,
            "players" => self.cmd_players(&rest).await,
            "leaderboard" => self.cmd_leaderboard(&rest).await,
            "search" => self.cmd_search(&rest).await,
            other => println!("Unknown command: {other} (try 'help')"),
        }
        ShellOutcome::Continue
    }

    async fn cmd_whoami(&self) {
        match self.auth.snapshot().await.user {
            Some(user) => println!(
                "{} <{}> ({})",
                user.name.unwrap_or_else(|| "unnamed".to_string()),
                user.email.unwrap_or_default(),
                user.role
            ),
            None => println!("Not signed in."),
        }
    }

    async fn cmd_menu(&self) {
        match self.auth.snapshot().await.user {
            Some(user) => {
                for item in routes::menu_for(user.role) {
                    println!("{:<20} open {}", item.label, item.path);
                }
            }
            None => println!("Sign in first."),
        }
    }

    async fn cmd_login(&mut self, args: &[&str]) {
        let (email, password) = match args {
            [email, password] => (*email, *password),
            _ => {
                println!("usage: login <email> <password>");
                return;
            }
        };

        match self.auth.login(email, password).await {
            Ok(user) => {
                println!("Signed in as {} ({})", email, user.role);
                let destination = self
                    .pending_return
                    .take()
                    .unwrap_or_else(|| routes::home_path(user.role).to_string());
                self.open(&destination).await;
            }
            Err(e) => println!("Login failed: {e}"),
        }
    }

    async fn cmd_register(&mut self, args: &[&str]) {
        let request = match args {
            [name, email, country, password] => RegistrationRequest {
                name: name.to_string(),
                email: email.to_string(),
                country: country.to_string(),
                password: password.to_string(),
            },
            _ => {
                println!("usage: register <name> <email> <country> <password>");
                return;
            }
        };

        match self.auth.register(request).await {
            Ok(Some(user)) => {
                println!("Registered and signed in ({})", user.role);
                let home = routes::home_path(user.role).to_string();
                self.open(&home).await;
            }
            Ok(None) => {
                println!("Registered. Sign in to continue.");
                self.location.navigate(LOGIN_PATH);
                self.page = None;
            }
            Err(e) => println!("Registration failed: {e}"),
        }
    }

    async fn cmd_logout(&mut self) {
        self.auth.logout().await;
        self.location.navigate(LOGIN_PATH);
        self.page = None;
        self.pending_return = None;
        println!("Signed out.");
    }

    /// Walks the guard decisions for a path until one admits or rejects it,
    /// then renders whatever screen the path names.
    async fn open(&mut self, path: &str) {
        let mut path = path.to_string();
        loop {
            let state = self.auth.snapshot().await;

            let decision = if path == LOGIN_PATH || path == REGISTER_PATH {
                GuestOnlyGuard.decide(&state)
            } else if let Some(guard) = section_guard(&path) {
                guard.decide(&state, &path)
            } else {
                println!("No such screen: {path}");
                return;
            };

            match decision {
                GuardDecision::Pending => {
                    println!("Still restoring the session, try again.");
                    return;
                }
                GuardDecision::Admit => {
                    if let Err(e) = self.render(&path).await {
                        self.report(e).await;
                    }
                    return;
                }
                GuardDecision::Redirect { to, return_to } => {
                    if let Some(requested) = return_to {
                        println!("Sign in to visit {requested}.");
                        self.pending_return = Some(requested);
                    }
                    path = to;
                }
            }
        }
    }

    async fn render(&mut self, path: &str) -> ServiceResult<()> {
        let state = self.auth.snapshot().await;
        if let Some(user) = &state.user {
            let known = routes::menu_for(user.role).iter().any(|m| m.path == path);
            if !known {
                println!("No such screen: {path}");
                return Ok(());
            }
        }
        self.location.navigate(path);

        let screen = path.rsplit('/').next().unwrap_or_default();
        match screen {
            "user-management" => {
                let mut table = UserTable::new(self.http.clone(), self.config.page_size);
                table.collection.refresh().await?;
                print_users(&table);
                self.page = Some(PageView::Users(table));
            }
            "player-management" => {
                let mut table = PlayerTable::new(self.http.clone(), self.config.page_size);
                table.collection.refresh().await?;
                print_players(&table);
                let searcher =
                    BackendSearcher::new(self.http.clone(), self.config.search_page_size);
                let search = DebouncedSearch::new(searcher, self.config.search_debounce());
                self.page = Some(PageView::Players { table, search });
            }
            "leaderboard" => {
                let mut table = LeaderboardTable::new(self.http.clone(), self.config.page_size);
                table.collection.refresh().await?;
                print_leaderboard(&table);
                self.page = Some(PageView::Leaderboard(table));
            }
            _ => {
                // Section dashboards and the guest screens have no table.
                self.page = None;
                match path {
                    LOGIN_PATH => println!("Use 'login <email> <password>'."),
                    REGISTER_PATH => {
                        println!("Use 'register <name> <email> <country> <password>'.")
                    }
                    _ => self.cmd_menu().await,
                }
            }
        }
        Ok(())
    }

    /// Prints a failure; a dead credential additionally ends the session,
    /// since every later call would fail the same way.
    async fn report(&mut self, e: ServiceError) {
        println!("error: {e}");
        if e.is_credential_failure() && self.auth.snapshot().await.is_authenticated {
            println!("The session is no longer valid. Sign in again.");
            self.cmd_logout().await;
        }
    }

    async fn cmd_users(&mut self, args: &[&str]) {
        let outcome = match &mut self.page {
            Some(PageView::Users(table)) => match args {
                [] => {
                    print_users(table);
                    Ok(())
                }
                ["next"] => page_move(&mut table.collection, true).await.map(|_| {
                    print_users(table);
                }),
                ["prev"] => page_move(&mut table.collection, false).await.map(|_| {
                    print_users(table);
                }),
                ["sort", column] => {
                    table.collection.sort_by(column);
                    print_users(table);
                    Ok(())
                }
                ["refresh"] => table.collection.refresh().await.map(|_| print_users(table)),
                ["create", name, email, password, role] => match role.parse::<Role>() {
                    Ok(role) => {
                        let request = CreateUserRequest {
                            name: name.to_string(),
                            email: email.to_string(),
                            password: password.to_string(),
                            role,
                        };
                        table.create_user(&request).await.map(|_| {
                            println!("User created.");
                            print_users(table);
                        })
                    }
                    Err(message) => {
                        println!("{message}");
                        Ok(())
                    }
                },
                ["update", id, name, email, role] | ["update", id, name, email, role, _] => {
                    match role.parse::<Role>() {
                        Ok(role) => {
                            let request = UpdateUserRequest {
                                name: name.to_string(),
                                email: email.to_string(),
                                password: args.get(5).map(|p| p.to_string()),
                                role,
                            };
                            table.update_user(id, &request).await.map(|_| {
                                println!("User updated.");
                                print_users(table);
                            })
                        }
                        Err(message) => {
                            println!("{message}");
                            Ok(())
                        }
                    }
                }
                ["delete", id] => table.delete_user(id).await.map(|_| {
                    println!("User deleted.");
                    print_users(table);
                }),
                _ => {
                    println!(
                        "usage: users [next|prev|sort <column>|refresh|create <name> <email> <password> <role>|update <id> <name> <email> <role> [password]|delete <id>]"
                    );
                    Ok(())
                }
            },
            _ => {
                println!("Open the user management screen first.");
                Ok(())
            }
        };
        if let Err(e) = outcome {
            self.report(e).await;
        }
    }

    async fn cmd_players(&mut self, args: &[&str]) {
        let state = self.auth.snapshot().await;
        let mutation_gate = RoleGate::new([Role::Admin, Role::Staff]);

        let outcome = match &mut self.page {
            Some(PageView::Players { table, .. }) => match args {
                [] => {
                    print_players(table);
                    Ok(())
                }
                ["next"] => page_move(&mut table.collection, true).await.map(|_| {
                    print_players(table);
                }),
                ["prev"] => page_move(&mut table.collection, false).await.map(|_| {
                    print_players(table);
                }),
                ["sort", column] => {
                    table.collection.sort_by(column);
                    print_players(table);
                    Ok(())
                }
                ["refresh"] => table
                    .collection
                    .refresh()
                    .await
                    .map(|_| print_players(table)),
                ["toggle", id] => {
                    if mutation_gate.decide(&state) != GateOutcome::Shown {
                        println!("That control is not available to your role.");
                        Ok(())
                    } else {
                        table.toggle_active(id).await.map(|active| {
                            println!(
                                "Player is now {}.",
                                if active { "active" } else { "inactive" }
                            );
                            print_players(table);
                        })
                    }
                }
                ["update", id, name, email, country, password] => {
                    if mutation_gate.decide(&state) != GateOutcome::Shown {
                        println!("That control is not available to your role.");
                        Ok(())
                    } else {
                        let request = UpdatePlayerRequest {
                            name: name.to_string(),
                            email: email.to_string(),
                            country: country.to_string(),
                            password: password.to_string(),
                        };
                        table.update_player(id, &request).await.map(|_| {
                            println!("Player updated.");
                            print_players(table);
                        })
                    }
                }
                _ => {
                    println!(
                        "usage: players [next|prev|sort <column>|refresh|toggle <id>|update <id> <name> <email> <country> <password>]"
                    );
                    Ok(())
                }
            },
            _ => {
                println!("Open the player management screen first.");
                Ok(())
            }
        };
        if let Err(e) = outcome {
            self.report(e).await;
        }
    }

    async fn cmd_leaderboard(&mut self, args: &[&str]) {
        let outcome = match &mut self.page {
            Some(PageView::Leaderboard(table)) => match args {
                [] => {
                    print_leaderboard(table);
                    Ok(())
                }
                ["sort", column] => {
                    table.collection.sort_by(column);
                    print_leaderboard(table);
                    Ok(())
                }
                ["refresh"] => table
                    .collection
                    .refresh()
                    .await
                    .map(|_| print_leaderboard(table)),
                _ => {
                    println!("usage: leaderboard [sort <column>|refresh]");
                    Ok(())
                }
            },
            _ => {
                println!("Open a leaderboard screen first.");
                Ok(())
            }
        };
        if let Err(e) = outcome {
            self.report(e).await;
        }
    }

    async fn cmd_search(&mut self, args: &[&str]) {
        let search = match &mut self.page {
            Some(PageView::Players { search, .. }) => search,
            _ => {
                println!("Search lives on the player management screen.");
                return;
            }
        };

        match args.split_first() {
            Some((&"country", value)) => {
                search.input(SearchField::Country, &value.join(" ")).await;
            }
            Some((&"name", value)) => {
                search.input(SearchField::SearchKey, &value.join(" ")).await;
            }
            Some((&"clear", _)) => search.reset().await,
            Some((&"results", _)) | None => print_search(&search.view().await),
            _ => println!("usage: search [country <text>|name <text>|clear|results]"),
        }
    }
}

/// The routing guard for the section a path belongs to, if any.
fn section_guard(path: &str) -> Option<AuthRequiredGuard> {
    [Role::Admin, Role::Staff, Role::Player]
        .into_iter()
        .find(|role| routes::path_allowed(*role, path))
        .map(|role| AuthRequiredGuard::new([role]))
}

async fn page_move<T, F>(collection: &mut RemoteCollection<T, F>, forward: bool) -> ServiceResult<()>
where
    T: SortSource,
    F: PageFetcher<T>,
{
    let moved = if forward {
        collection.next_page().await?
    } else {
        collection.previous_page().await?
    };
    if !moved {
        println!("No further pages that way.");
    }
    Ok(())
}

fn print_caption<T, F>(collection: &RemoteCollection<T, F>)
where
    T: SortSource,
    F: PageFetcher<T>,
{
    let (first, last) = collection.display_range();
    let total = collection.meta().map(|m| m.total_items).unwrap_or(0);
    let pages = collection.meta().map(|m| m.total_pages).unwrap_or(0);
    println!(
        "Showing {first} to {last} of {total} (page {}/{})",
        collection.page(),
        pages
    );
}

fn print_users(table: &UserTable) {
    println!("{:<38} {:<16} {:<28} {:<8}", "ID", "NAME", "EMAIL", "ROLE");
    for user in table.collection.rows() {
        println!(
            "{:<38} {:<16} {:<28} {:<8}",
            user.id, user.name, user.email, user.role
        );
    }
    print_caption(&table.collection);
}

fn print_players(table: &PlayerTable) {
    println!(
        "{:<38} {:<16} {:<8} {:<8} {:>6} {:>7} {:>5} {:>6}",
        "ID", "NAME", "COUNTRY", "ACTIVE", "XP", "PLAYED", "WON", "COINS"
    );
    for player in table.collection.rows() {
        println!(
            "{:<38} {:<16} {:<8} {:<8} {:>6} {:>7} {:>5} {:>6}",
            player.id,
            player.name,
            player.country,
            player.active,
            player.statistics.experience_point,
            player.statistics.games_played,
            player.statistics.games_won,
            player.statistics.coins
        );
    }
    print_caption(&table.collection);
}

fn print_leaderboard(table: &LeaderboardTable) {
    println!(
        "{:<5} {:<16} {:>6} {:>7} {:>5}",
        "RANK", "NAME", "XP", "PLAYED", "WON"
    );
    for (rank, player) in table.ranked() {
        println!(
            "{:<5} {:<16} {:>6} {:>7} {:>5}",
            rank,
            player.name,
            player.statistics.experience_point,
            player.statistics.games_played,
            player.statistics.games_won
        );
    }
}

fn print_search(view: &crate::search::SearchView) {
    if view.loading {
        println!("Searching...");
        return;
    }
    if let Some(error) = &view.error {
        println!("Search failed: {error}");
        return;
    }
    if view.query.is_empty() {
        println!("Type 'search name <text>' or 'search country <text>'.");
        return;
    }
    if view.results.is_empty() {
        println!("No data found");
        return;
    }
    for player in &view.results {
        println!(
            "{:<16} {:<8} xp {:>6}  played {:>5}  won {:>5}",
            player.name,
            player.country,
            player.statistics.experience_point,
            player.statistics.games_played,
            player.statistics.games_won
        );
    }
}

fn print_help() {
    println!("Commands:");
    println!("  login <email> <password>");
    println!("  register <name> <email> <country> <password>");
    println!("  logout | whoami | menu");
    println!("  open <path>            e.g. open /admin/user-management");
    println!("  users [...]            list controls on the user screen");
    println!("  players [...]          list controls on the player screen");
    println!("  leaderboard [...]      ranking controls");
    println!("  search [...]           debounced player search");
    println!("  quit");
}
