/// Minimum spacing between accepted key events, in milliseconds.
pub const MIN_KEY_SPACING_MS: u64 = 30;

/// Strict leading-edge rate limiter for operator key input.
///
/// The first event is always accepted; after that an event passes only
/// when more than `MIN_KEY_SPACING_MS` elapsed since the last *accepted*
/// event. Rejected events are discarded, never queued or coalesced, so a
/// burst faster than the window loses everything but its first press.
#[derive(Debug, Default)]
pub struct InputThrottler {
    last_accepted_ms: Option<u64>,
}

impl InputThrottler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true and records `now_ms` when the event passes the gate.
    pub fn accept(&mut self, now_ms: u64) -> bool {
        let accepted = match self.last_accepted_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) > MIN_KEY_SPACING_MS,
        };
        if accepted {
            self.last_accepted_ms = Some(now_ms);
        }
        accepted
    }
}

#[cfg(test)]
#[path = "tests/throttle_tests.rs"]
mod tests;
