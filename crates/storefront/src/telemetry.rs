//! Tracing and Sentry initialization.
//!
//! The host shell calls [`init`] once at startup and keeps the returned
//! guard alive for the life of the session.

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::StorefrontConfig;

/// Initialize Sentry error tracking and return a guard that must be kept
/// alive. Returns `None` when no DSN is configured.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
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

/// Initialize tracing (EnvFilter + fmt) and Sentry.
///
/// Idempotent: a second call leaves the existing subscriber in place.
pub fn init(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    // Sentry must initialize before the tracing subscriber.
    let guard = init_sentry(config);

    // Defaults to info level for this crate if RUST_LOG is not set.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "souk_storefront=info".into());

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .try_init();

    guard
}
