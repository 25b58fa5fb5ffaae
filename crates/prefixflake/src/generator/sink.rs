use core::fmt;

/// Receives human-readable diagnostic lines from a [`Generator`].
///
/// Lines describe the per-call state (`now`, `lastTime`, `sequence`), the
/// packed components, and the resulting ID. The default sink is
/// [`NoopSink`]. Any `Fn(fmt::Arguments)` closure is a sink:
///
/// ```
/// use prefixflake::{Generator, NoopSink};
/// use std::sync::{Arc, Mutex};
///
/// let lines = Arc::new(Mutex::new(Vec::new()));
/// let captured = Arc::clone(&lines);
/// let generator = Generator::new(1, 1)
///     .unwrap()
///     .with_sink(move |line: core::fmt::Arguments<'_>| {
///         captured.lock().unwrap().push(line.to_string());
///     });
///
/// generator.next_id().unwrap();
/// assert!(lines.lock().unwrap()[0].starts_with("now: "));
/// ```
///
/// [`Generator`]: crate::Generator
pub trait TraceSink: Send + Sync {
    /// Writes one line.
    fn trace(&self, line: fmt::Arguments<'_>);
}

impl<F> TraceSink for F
where
    F: Fn(fmt::Arguments<'_>) + Send + Sync,
{
    fn trace(&self, line: fmt::Arguments<'_>) {
        self(line);
    }
}

/// Discards every line.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {
    #[inline]
    fn trace(&self, _line: fmt::Arguments<'_>) {}
}

/// Forwards lines to [`tracing`] at `TRACE` level.
#[cfg_attr(docsrs, doc(cfg(feature = "tracing")))]
#[cfg(feature = "tracing")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

#[cfg(feature = "tracing")]
impl TraceSink for TracingSink {
    fn trace(&self, line: fmt::Arguments<'_>) {
        tracing::trace!(target: "prefixflake::generator", "{line}");
    }
}
