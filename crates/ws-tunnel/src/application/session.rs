//! Per-session orchestration.
//!
//! Every session ends the same way regardless of mode: one of the two pumps
//! stops, the relay closes both connections, and the outcome is logged.  A
//! clean end-of-stream is routine and logged at `info`; a transport failure is
//! logged at `warn`.  Neither is fatal to the process.

use tracing::{info, warn};
use tunnel_core::{ByteStream, MessageStream, Relay, SessionOutcome};

/// Relays between the two connections of one session and logs how it ended.
///
/// Call this from inside the session's tracing span so the log lines carry the
/// session id and peer address.
pub async fn run_session<B, M>(relay: &Relay, byte_stream: B, message_stream: M) -> SessionOutcome
where
    B: ByteStream,
    M: MessageStream,
{
    info!("proxying");
    let outcome = relay.run(byte_stream, message_stream).await;
    log_outcome(&outcome);
    outcome
}

/// Logs `outcome` at a level matching its severity.
pub fn log_outcome(outcome: &SessionOutcome) {
    let summary = describe_outcome(outcome);
    if outcome.is_error() {
        warn!("session ended: {summary}");
    } else {
        info!("session ended: {summary}");
    }
}

/// One-line human-readable summary of a finished session.
pub fn describe_outcome(outcome: &SessionOutcome) -> String {
    let SessionOutcome {
        stats, elapsed, ..
    } = outcome;
    format!(
        "{outcome}; inbound {} frames / {} bytes, outbound {} frames / {} bytes, {:.3}s",
        stats.inbound.frames,
        stats.inbound.bytes,
        stats.outbound.frames,
        stats.outbound.bytes,
        elapsed.as_secs_f64(),
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
