use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use gatherly::config::ConfigError;
use gatherly::validate::{LoginForm, RegisterForm};
use gatherly::{
    AuthConfig, FileStorage, GatewayError, HttpGateway, LoginPage, Navigation, Outcome, PageEffect, RegisterPage,
    Route, SessionStore, SubmitError, gate,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("http client setup failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Submit(#[from] SubmitError),
    #[error("{action} failed: {message}")]
    Rejected { action: &'static str, message: String },
    #[error("unknown route: {0}")]
    UnknownRoute(String),
}

#[derive(Parser, Debug)]
#[command(name = "gatherly-cli", about = "Gatherly account login and registration")]
struct Cli {
    /// Overrides `GATHERLY_API_URL`.
    #[arg(long)]
    api_url: Option<String>,

    #[arg(long, env = "GATHERLY_STATE_FILE", default_value = ".gatherly/session.json")]
    state_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "GATHERLY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account.
    Register {
        #[arg(long)]
        fullname: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "GATHERLY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Show the current session state.
    Status,
    /// Print where a navigation to PATH ends up.
    Route { path: String },
}

struct CliContext {
    store: SessionStore,
    gateway: Arc<HttpGateway>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AuthConfig::from_env()?;
    if let Some(api_url) = &cli.api_url {
        config = AuthConfig::new(api_url, config.timeouts)?;
    }
    tracing::debug!(api_url = %config.api_url, state_file = %cli.state_file.display(), "starting");

    let ctx = CliContext {
        store: SessionStore::new(Arc::new(FileStorage::new(cli.state_file))),
        gateway: Arc::new(HttpGateway::new(config)?),
    };

    match cli.command {
        Command::Login { email, password } => run_login(&ctx, LoginForm { email, password }).await,
        Command::Register { fullname, email, password } => {
            run_register(&ctx, RegisterForm { fullname, email, password }).await
        }
        Command::Logout => {
            ctx.store.logout();
            println!("signed out");
            Ok(())
        }
        Command::Status => {
            print_status(&ctx.store);
            Ok(())
        }
        Command::Route { path } => run_route(&ctx.store, &path),
    }
}

async fn run_login(ctx: &CliContext, form: LoginForm) -> Result<(), CliError> {
    let page = LoginPage::new(ctx.store.clone(), ctx.gateway.clone());
    if let Navigation::Redirect(route) = page.open() {
        println!("already signed in; continue at {route}");
        return Ok(());
    }

    println!("{}", page.submit_label());
    let outcome = page.submit(&form)?.join().await;
    print_effects(&page.effects());
    finish("login", outcome)
}

async fn run_register(ctx: &CliContext, form: RegisterForm) -> Result<(), CliError> {
    let page = RegisterPage::new(ctx.store.clone(), ctx.gateway.clone());
    if let Navigation::Redirect(route) = page.open() {
        println!("already signed in; continue at {route}");
        return Ok(());
    }

    let outcome = page.submit(&form)?.join().await;
    print_effects(&page.effects());
    finish("registration", outcome)
}

fn finish<T>(action: &'static str, outcome: Outcome<T>) -> Result<(), CliError> {
    match outcome {
        Outcome::Success(_) => Ok(()),
        Outcome::Failure(message) => Err(CliError::Rejected { action, message }),
        Outcome::Pending => Err(CliError::Rejected {
            action,
            message: GatewayError::Network("request did not resolve".to_owned()).user_message(),
        }),
    }
}

fn print_effects(effects: &[PageEffect]) {
    for effect in effects {
        match effect {
            PageEffect::Toast(message) => eprintln!("error: {message}"),
            PageEffect::Navigate(route) => println!("continue at {route}"),
        }
    }
}

fn print_status(store: &SessionStore) {
    let login = store.login();
    if login.is_authenticated {
        println!("signed in");
    } else {
        println!("signed out");
    }
    println!("landing: {}", gate::resolve(Route::Entry, &login));
}

fn run_route(store: &SessionStore, path: &str) -> Result<(), CliError> {
    let route = Route::from_path(path).ok_or_else(|| CliError::UnknownRoute(path.to_owned()))?;
    let login = store.login();
    match gate::guard(route, &login) {
        Navigation::Allow => println!("{route}"),
        Navigation::Redirect(_) => println!("{route} -> {}", gate::resolve(route, &login)),
    }
    Ok(())
}
