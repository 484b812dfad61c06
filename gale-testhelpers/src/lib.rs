#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub use gale_testhelpers_macros::test;

use std::sync::LazyLock;
use std::time::Instant;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Timestamps log lines with seconds since the first test in this binary
/// touched the subscriber, so interleaved test output lines up.
struct Uptime;

impl FormatTime for Uptime {
    fn format_time(&self, w: &mut Writer<'_>) -> core::fmt::Result {
        let elapsed = START_TIME.elapsed();
        write!(w, "{:4}.{:03}s", elapsed.as_secs(), elapsed.subsec_millis())
    }
}

static SUBSCRIBER_INIT: LazyLock<()> = LazyLock::new(|| {
    let _ = *START_TIME;

    color_backtrace::install();

    let filter = log_filter(std::env::var("GALE_LOG").ok().as_deref());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_test_writer()
                .with_timer(Uptime)
                .with_target(true)
                .with_level(true)
                .compact(),
        )
        .with(filter)
        .try_init()
        .ok();
});

/// Builds the target filter from a `GALE_LOG` value such as
/// `gale_json::registry=debug,warn`. Unset or unparsable means everything.
fn log_filter(spec: Option<&str>) -> Targets {
    let everything = || Targets::new().with_default(tracing::Level::TRACE);
    match spec {
        None => everything(),
        Some(spec) => spec.parse().unwrap_or_else(|err| {
            eprintln!("ignoring GALE_LOG={spec:?}: {err}");
            everything()
        }),
    }
}

/// Installs the test tracing subscriber and panic printer, once per process.
///
/// Called by `#[gale_testhelpers::test]`; call it directly from tests that
/// need a different harness attribute.
pub fn setup() {
    #[allow(clippy::let_unit_value)]
    let _ = *SUBSCRIBER_INIT;
}
