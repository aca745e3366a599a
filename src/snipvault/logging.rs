//! Logging initialization.
//!
//! The library only emits `tracing` events: `debug!` for every create,
//! update, delete, save and load, and `warn!` when a loaded counter turns out
//! to lag behind the stored IDs. Installing a subscriber is the embedding
//! application's call; [`init`] is a convenience for doing so once.

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Which subscriber [`init`] installs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Per-entity mutations and file round trips, readable in a terminal
    Development,
    /// Only counter warnings, one JSON object per line for log collectors
    Production,
    /// Swallows everything so test output stays clean
    Test,
}

impl Profile {
    fn default_filter(self) -> &'static str {
        match self {
            Profile::Development => "snipvault=debug",
            Profile::Production => "snipvault=info",
            Profile::Test => "off",
        }
    }
}

static INIT_ONCE: Once = Once::new();

fn filter_for(profile: Profile) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(profile.default_filter()))
}

/// Install a global subscriber for `profile`. `RUST_LOG` overrides the
/// profile's default filter. Only the first call has any effect.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        // try_init: the host process may already have installed a subscriber.
        let _ = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_env_filter(filter_for(profile))
                .finish()
                .try_init(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter_for(profile))
                .finish()
                .try_init(),
            Profile::Test => tracing_subscriber::registry().try_init(),
        };
    });
}
