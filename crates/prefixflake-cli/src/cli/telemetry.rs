//! Log output for the CLI.
//!
//! Events go to stderr so that stdout only carries IDs and decoded records.
//! The filter is read from `RUST_LOG` and defaults to `info`. Per-call
//! generator lines are emitted at `trace` under the
//! `prefixflake::generator` target:
//!
//! ```bash
//! RUST_LOG=prefixflake=trace prefixflake generate --count 3
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(true)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339()),
        )
        .try_init()?;
    Ok(())
}
