//! Pinebrook storefront client.
//!
//! A headless front end for the Pinebrook e-commerce backend: loads page
//! contexts (index, product, login, admin), manages the local cart
//! snapshot, and runs account flows against the REST API.
//!
//! # Usage
//!
//! ```bash
//! # Render the index page for a category
//! pinebrook page "index.html?catid=2"
//!
//! # Add to the cart (a burst of presses collapses to one add)
//! pinebrook cart add 11 --presses 3
//!
//! # Sign in (password read from stdin)
//! pinebrook login shopper@example.com
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pinebrook_core::ProductId;
use sentry::integrations::tracing as sentry_tracing;
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pinebrook_storefront::cart::CartStore;
use pinebrook_storefront::config::ClientConfig;
use pinebrook_storefront::error::AppError;
use pinebrook_storefront::pages::{self, PageContext, PageOutcome};
use pinebrook_storefront::session;
use pinebrook_storefront::state::Storefront;
use pinebrook_storefront::ui::{ADD_DEBOUNCE_WINDOW, AddDebouncer};
use pinebrook_storefront::upload;

#[derive(Parser)]
#[command(name = "pinebrook")]
#[command(author, version, about = "Pinebrook storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and render a page context
    Page {
        /// Page URL, absolute or site-relative (e.g. "index.html?catid=2")
        url: String,
    },
    /// Manage the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Sign in; the password is read from stdin
    Login {
        /// Account email address
        email: String,
    },
    /// Sign out and clear the session
    Logout,
    /// Change the signed-in user's password; reads current, new, and
    /// confirmation from stdin, one per line
    ChangePassword,
    /// Validate an image file before product upload
    CheckImage {
        /// Path of the image file
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a product to the cart
    Add {
        /// Product id
        pid: String,

        /// Number of rapid presses to simulate; a burst collapses to one add
        #[arg(long, default_value_t = 1)]
        presses: u32,
    },
    /// Remove a product from the cart entirely
    Remove {
        /// Product id
        pid: String,
    },
    /// Set a product's quantity (0 removes it)
    Set {
        /// Product id
        pid: String,

        /// New quantity
        quantity: u32,
    },
    /// Price the cart against the backend and show it
    Show,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", AppError::from(err).present());
            std::process::exit(1);
        }
    };

    // Sentry must come up before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pinebrook_storefront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(err) = run(cli, config).await {
        eprintln!("{}", err.present());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), AppError> {
    let state = Storefront::new(config)?;

    match cli.command {
        Commands::Page { url } => {
            let context = PageContext::from_url(&url)?;
            match pages::load(&state, &context).await? {
                PageOutcome::Rendered(page) => {
                    println!("== {} ==", page.title);
                    for fragment in &page.fragments {
                        println!("-- {} --", fragment.slot);
                        println!("{}", fragment.html);
                    }
                    for notice in &page.notices {
                        println!("!! {notice}");
                    }
                }
                PageOutcome::Redirect(destination) => {
                    println!("-> {}", destination.path());
                }
            }
        }
        Commands::Cart { action } => cart_command(&state, action).await?,
        Commands::Login { email } => {
            let password = read_stdin_line("Password: ")?;
            let destination = session::login(state.api(), &email, &password).await?;
            println!("-> {}", destination.path());
        }
        Commands::Logout => {
            let destination = session::logout(state.api()).await?;
            println!("-> {}", destination.path());
        }
        Commands::ChangePassword => {
            let current = read_stdin_line("Current password: ")?;
            let new = read_stdin_line("New password: ")?;
            let confirm = read_stdin_line("Confirm new password: ")?;
            let destination =
                session::change_password(state.api(), &current, &new, &confirm).await?;
            println!("Password changed, please sign in again");
            println!("-> {}", destination.path());
        }
        Commands::CheckImage { path } => {
            upload::validate_image(&path)?;
            println!("OK: {}", path.display());
        }
    }

    Ok(())
}

async fn cart_command(state: &Storefront, action: CartAction) -> Result<(), AppError> {
    match action {
        CartAction::Add { pid, presses } => {
            // Route presses through the same debouncer the page bindings
            // use, then fold the result back into the shared store.
            let shared = Arc::new(Mutex::new(state.cart().lock().await.clone()));
            let debouncer = AddDebouncer::new(Arc::clone(&shared), ADD_DEBOUNCE_WINDOW);
            let product_id = ProductId::new(pid);
            for _ in 0..presses.max(1) {
                debouncer.press(product_id.clone()).await;
            }
            debouncer.settle().await;
            *state.cart().lock().await = shared.lock().await.clone();
            state.save_cart().await?;
        }
        CartAction::Remove { pid } => {
            state.cart().lock().await.remove(&ProductId::new(pid));
            state.save_cart().await?;
        }
        CartAction::Set { pid, quantity } => {
            state
                .cart()
                .lock()
                .await
                .set_quantity(&ProductId::new(pid), quantity);
            state.save_cart().await?;
        }
        CartAction::Show => {
            let view = {
                let store: CartStore = state.cart().lock().await.clone();
                pinebrook_storefront::cart::render::build_view(&store, state.api()).await?
            };
            for line in &view.lines {
                println!(
                    "{} x{} @ {} = {}",
                    line.name, line.quantity, line.unit_price, line.line_total
                );
            }
            println!("Total: {}", view.total);
            state.save_cart().await?;
        }
    }
    Ok(())
}

/// Read one line from stdin, prompting on stderr so output stays clean.
fn read_stdin_line(prompt: &str) -> Result<String, AppError> {
    eprint!("{prompt}");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|err| AppError::BadRequest(format!("could not read stdin: {err}")))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
