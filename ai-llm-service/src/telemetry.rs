//! Log formatting shared by every crate of the workspace.
//!
//! The binary composes [`env_filter_with_level`] and [`layer`] into one
//! registry; libraries only emit `tracing` events.

use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Event target prefix of this library.
pub const TARGET_PREFIX: &str = "ai_llm_service";

/// Second-precision UTC timestamps, e.g. `2025-09-12T10:20:30Z`.
#[derive(Clone, Copy, Debug, Default)]
struct UtcSeconds;

impl FormatTime for UtcSeconds {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let ts = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&ts)
    }
}

/// Compact `fmt` layer on stderr restricted to events whose target starts
/// with one of `targets`.
///
/// Lines carry a UTC timestamp, level, target and `file:line`; instrumented
/// spans report their duration on close. Colors are used only when stderr is
/// a terminal. Stdout stays free for program output.
/// The target filter is attached to this layer alone, so other layers in the
/// same registry still see everything.
pub fn layer<S>(targets: &'static [&'static str]) -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    layer_with_writer(targets, io::stderr, io::stderr().is_terminal())
}

/// [`layer`] writing to `writer`.
pub fn layer_with_writer<S, W>(
    targets: &'static [&'static str],
    writer: W,
    ansi: bool,
) -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let listed = filter::filter_fn(move |meta| {
        let target = meta.target();
        targets.iter().any(|t| target.starts_with(t))
    });

    // Every formatting option lives on the event format: `event_format`
    // replaces whatever was configured on the layer before it.
    let format = fmt::format()
        .with_timer(UtcSeconds)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .compact();

    fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(format)
        .with_filter(listed)
}

/// `target=level` directive, e.g. `ai_llm_service=debug`.
pub fn level_directive(target: &str, level: Level) -> Option<Directive> {
    Directive::from_str(&format!("{target}={}", level.as_str().to_lowercase())).ok()
}

/// `RUST_LOG` (or `default` when unset/invalid) with every crate in `targets`
/// raised to `level`.
pub fn env_filter_with_level(default: &str, targets: &[&str], level: Level) -> EnvFilter {
    targets
        .iter()
        .filter_map(|t| level_directive(t, level))
        .fold(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
            EnvFilter::add_directive,
        )
}
