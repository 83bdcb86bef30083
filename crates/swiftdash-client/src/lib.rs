pub mod access;
pub mod config;
pub mod conversations;
pub mod directory;
pub mod error;
pub mod events;
pub mod fixtures;
pub mod nav;
pub mod roster;
pub mod scheduler;
pub mod session;
pub mod state;

use tracing_subscriber::{fmt, EnvFilter};

pub use config::ClientConfig;
pub use conversations::{ChatPhase, ChatState, ConversationStore};
pub use error::{ChatError, DirectoryError, SessionError};
pub use events::{Notification, NotificationLevel, Notifier};
pub use roster::Roster;
pub use session::{SessionState, SessionStore};
pub use state::AppState;

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter. Output goes to stderr so it never mixes with command output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("swiftdash_client=debug,swiftdash_store=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
