/// Durable slot key holding the signed-in identity
pub const SESSION_SLOT_KEY: &str = "dashboardUser";

/// Shared credential accepted for every roster identity
pub const DEMO_PASSWORD: &str = "password";

/// Avatar service; the seed is appended as a query parameter
pub const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/avataaars/svg?seed=";

/// Length of generated user identifiers
pub const GENERATED_ID_LEN: usize = 7;

/// Simulated login/register latency in milliseconds
pub const DEFAULT_AUTH_DELAY_MS: u64 = 1_000;

/// Simulated message-log load latency in milliseconds
pub const DEFAULT_MESSAGE_LOAD_DELAY_MS: u64 = 800;

/// Auto-reply delay bounds in milliseconds
pub const DEFAULT_REPLY_DELAY_MIN_MS: u64 = 3_000;
pub const DEFAULT_REPLY_DELAY_MAX_MS: u64 = 8_000;

/// Chance that a sent message triggers an auto-reply
pub const DEFAULT_REPLY_PROBABILITY: f64 = 0.5;

/// Body of every simulated reply
pub const AUTO_REPLY_TEXT: &str =
    "Thanks for your message! I'll look into this and get back to you soon.";
