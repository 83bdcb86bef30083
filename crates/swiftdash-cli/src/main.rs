//! # swiftdash
//!
//! Command-line front end for the SwiftDash client state. Each invocation
//! opens the local store, so a sign-in survives between commands while the
//! conversation state lives only for the duration of one command.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::broadcast;
use tracing::{debug, info};

use swiftdash_client::access::{authorize, Route};
use swiftdash_client::directory::UserQuery;
use swiftdash_client::nav::visible_items;
use swiftdash_client::session::validate_login_form;
use swiftdash_client::{AppState, ChatPhase, ClientConfig, Notification, NotificationLevel};
use swiftdash_shared::{ConversationId, ConversationKind, Message, Role, UserStatus};

#[derive(Parser)]
#[command(name = "swiftdash")]
#[command(about = "SwiftDash session, messaging and user administration", long_about = None)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with an email and password
    Login { email: String, password: String },

    /// Create an account and sign in
    Register {
        name: String,
        email: String,
        password: String,
    },

    /// Sign out and clear the stored session
    Logout,

    /// Show the signed-in identity
    Whoami,

    /// Check whether the session holds at least the given role
    Can { role: Role },

    /// Check whether the session may enter a route
    Route { path: String },

    /// List the sidebar entries visible to the session
    Nav,

    /// List conversations
    Chats {
        /// Only `private` or `group` conversations
        #[arg(short, long)]
        kind: Option<ConversationKind>,
    },

    /// Show the message log of a conversation
    Open { conversation: String },

    /// Send a message to a conversation
    Send {
        conversation: String,
        text: String,

        /// Wait for an auto-reply before exiting
        #[arg(long)]
        wait_reply: bool,
    },

    /// List users, optionally filtered (admin only)
    Users {
        /// Case-insensitive match on name or email
        #[arg(short, long, default_value = "")]
        search: String,

        #[arg(short, long)]
        role: Option<Role>,

        #[arg(long)]
        status: Option<UserStatus>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    swiftdash_client::init_tracing();
    let cli = Cli::parse();

    let config = ClientConfig::from_env();
    debug!(?config, "Loaded configuration");

    let app = AppState::open(config).context("failed to open local store")?;
    let mut notifications = app.notifier.subscribe();

    let outcome = run(&app, cli.command, cli.json).await;
    drain(&mut notifications);
    outcome
}

async fn run(app: &AppState, command: Commands, json: bool) -> Result<()> {
    match command {
        Commands::Login { email, password } => {
            if let Err(errors) = validate_login_form(&email, &password) {
                for message in [errors.email, errors.password].into_iter().flatten() {
                    eprintln!("{message}");
                }
                bail!("invalid login form");
            }
            let identity = app.session.login(&email, &password).await?;
            info!(user = %identity.id, "Signed in");
            println!("Signed in as {} ({})", identity.name, identity.role);
        }

        Commands::Register {
            name,
            email,
            password,
        } => {
            let identity = app.session.register(&name, &email, &password).await?;
            println!("Registered {} <{}>", identity.name, identity.email);
        }

        Commands::Logout => {
            app.session.logout()?;
        }

        Commands::Whoami => match app.session.current_identity() {
            Some(identity) if json => println!("{}", serde_json::to_string_pretty(&identity)?),
            Some(identity) => {
                println!("{} <{}>", identity.name, identity.email);
                println!("id:   {}", identity.id);
                println!("role: {}", identity.role);
            }
            None => println!("Not signed in"),
        },

        Commands::Can { role } => {
            let allowed = app.session.has_permission(role);
            println!("{}", if allowed { "yes" } else { "no" });
        }

        Commands::Route { path } => {
            let route = Route::from_path(&path);
            println!("{route}: {:?}", authorize(route, &app.session.snapshot()));
        }

        Commands::Nav => {
            for item in visible_items(&app.session.snapshot()) {
                println!("{:<10} {}", item.label, item.route);
            }
        }

        Commands::Chats { kind } => {
            require_chat(app)?;
            let mut conversations = app.chat.conversations();
            if let Some(kind) = kind {
                conversations.retain(|c| c.kind == kind);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&conversations)?);
                return Ok(());
            }
            for c in conversations {
                let preview = c
                    .last_message
                    .as_ref()
                    .map(|m| m.content.as_str())
                    .unwrap_or("");
                println!(
                    "{:<6} {:<7} {:<22} unread={:<2} {}",
                    c.id.as_str(),
                    c.kind.to_string(),
                    c.display_name,
                    c.unread_count,
                    preview
                );
            }
        }

        Commands::Open { conversation } => {
            open(app, &ConversationId::new(conversation)).await?;
            print_log(&app.chat.messages(), json)?;
        }

        Commands::Send {
            conversation,
            text,
            wait_reply,
        } => {
            open(app, &ConversationId::new(conversation)).await?;
            let Some(sent) = app.chat.send_message(&text, Vec::new()) else {
                bail!("message not sent");
            };
            println!("Sent {}", sent.id);

            if wait_reply {
                let patience = app.config.reply_delay_max.max(app.config.reply_delay_min)
                    + Duration::from_secs(1);
                let mut rx = app.chat.subscribe();
                let replied = tokio::time::timeout(
                    patience,
                    rx.wait_for(|s| s.messages.last().map(|m| &m.id) != Some(&sent.id)),
                )
                .await;
                match replied {
                    Ok(state) => {
                        let state = state?;
                        if let Some(reply) = state.messages.last() {
                            print_message(reply);
                        }
                    }
                    Err(_) => println!("No reply"),
                }
            }
        }

        Commands::Users {
            search,
            role,
            status,
        } => {
            if !app.session.has_permission(Role::Admin) {
                bail!("the user table requires the admin role");
            }
            let query = UserQuery {
                search,
                role,
                status,
            };
            let directory = app.directory();
            let users = directory.filter(&query);
            if json {
                println!("{}", serde_json::to_string_pretty(&users)?);
                return Ok(());
            }
            for u in users {
                let status = u.status.map(|s| s.as_str()).unwrap_or("");
                println!(
                    "{:<4} {:<16} {:<24} {:<6} {}",
                    u.id.as_str(),
                    u.name,
                    u.email,
                    u.role.as_str(),
                    status
                );
            }
        }
    }
    Ok(())
}

fn require_chat(app: &AppState) -> Result<()> {
    if app.chat.phase() == ChatPhase::Inactive {
        bail!("not signed in");
    }
    Ok(())
}

/// Select `id` and wait until its log is loaded.
async fn open(app: &AppState, id: &ConversationId) -> Result<()> {
    require_chat(app)?;
    let mut rx = app.chat.subscribe();
    app.chat.set_active_conversation(Some(id))?;
    rx.wait_for(|s| s.phase == ChatPhase::Ready).await?;
    Ok(())
}

fn print_log(messages: &[Message], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(messages)?);
    } else {
        messages.iter().for_each(print_message);
    }
    Ok(())
}

fn print_message(m: &Message) {
    println!(
        "[{}] {}: {}",
        m.timestamp.format("%Y-%m-%d %H:%M"),
        m.sender_name,
        m.content
    );
    for a in &m.attachments {
        println!("    attachment: {} ({})", a.name, a.url);
    }
}

fn drain(rx: &mut broadcast::Receiver<Notification>) {
    while let Ok(Notification { level, message }) = rx.try_recv() {
        let tag = match level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Info => "info",
            NotificationLevel::Error => "error",
        };
        eprintln!("[{tag}] {message}");
    }
}
