use futures::{Stream, StreamExt};
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{LlmError, Result};

/// Frame cadence of the typing animation
#[derive(Debug, Clone)]
pub struct AnimationConfig {
    pub frame_interval: Duration,
    /// Each frame reveals ⌈pending / reveal_divisor⌉ characters
    pub reveal_divisor: usize,
    /// How long frames keep ticking after upstream ends before the rest is flushed
    pub settle: Duration,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
            reveal_divisor: 60,
            settle: Duration::from_millis(200),
        }
    }
}

impl AnimationConfig {
    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn reveal_divisor(mut self, divisor: usize) -> Self {
        self.reveal_divisor = divisor.max(1);
        self
    }

    pub fn settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
}

#[derive(Debug)]
pub enum AnimationOutcome {
    /// Upstream ended and everything was shown
    Completed { text: String },
    /// Upstream raised, or finished without producing any text
    Failed { error: LlmError, displayed: String },
    /// Aborted; `displayed` is whatever had been revealed
    Cancelled { displayed: String },
}

/// Smooths bursty fragments into a steadily growing display string
///
/// `accumulated` holds everything received; the displayed text is always a
/// prefix of it, and `revealed` is the byte offset where that prefix ends.
pub struct ResponseAnimator {
    config: AnimationConfig,
    accumulated: String,
    revealed: usize,
    ticks: u64,
}

impl ResponseAnimator {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            accumulated: String::new(),
            revealed: 0,
            ticks: 0,
        }
    }

    /// Add a received fragment to the pending text
    pub fn push(&mut self, fragment: &str) {
        self.accumulated.push_str(fragment);
    }

    /// Advance one frame, returning the newly revealed slice if any
    pub fn tick(&mut self) -> Option<String> {
        self.ticks += 1;

        let pending = &self.accumulated[self.revealed..];
        if pending.is_empty() {
            return None;
        }

        let remaining = pending.chars().count();
        let count = remaining.div_ceil(self.config.reveal_divisor.max(1)).max(1);
        let end = pending
            .char_indices()
            .nth(count)
            .map(|(offset, _)| self.revealed + offset)
            .unwrap_or(self.accumulated.len());

        let fresh = self.accumulated[self.revealed..end].to_string();
        self.revealed = end;
        Some(fresh)
    }

    /// Reveal everything still pending
    pub fn flush(&mut self) -> Option<String> {
        if self.is_caught_up() {
            return None;
        }
        let fresh = self.accumulated[self.revealed..].to_string();
        self.revealed = self.accumulated.len();
        Some(fresh)
    }

    pub fn display(&self) -> &str {
        &self.accumulated[..self.revealed]
    }

    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    /// Characters received but not yet shown
    pub fn pending_len(&self) -> usize {
        self.accumulated[self.revealed..].chars().count()
    }

    pub fn is_caught_up(&self) -> bool {
        self.revealed == self.accumulated.len()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Drive the animation until upstream ends, fails, or `cancel` fires
    ///
    /// Fragment consumption and the frame ticker share one select loop, so
    /// the buffers need no locking. `on_update` receives the display text
    /// and the slice revealed by that frame.
    pub async fn run<S, F>(
        mut self,
        fragments: S,
        cancel: &CancellationToken,
        mut on_update: F,
    ) -> AnimationOutcome
    where
        S: Stream<Item = Result<String>>,
        F: FnMut(&str, &str),
    {
        let mut fragments = Box::pin(fragments);
        let mut ticker = interval(self.config.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut upstream_open = true;
        let mut settle_deadline: Option<Instant> = None;

        loop {
            if cancel.is_cancelled() {
                return self.cancelled();
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return self.cancelled();
                }
                _ = ticker.tick() => {
                    if let Some(fresh) = self.tick() {
                        on_update(self.display(), &fresh);
                    }
                    if settle_deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                        break;
                    }
                }
                fragment = fragments.next(), if upstream_open => match fragment {
                    Some(Ok(text)) => self.push(&text),
                    Some(Err(error)) => {
                        debug!("Animation upstream failed: {}", error);
                        return AnimationOutcome::Failed {
                            error,
                            displayed: self.display().to_string(),
                        };
                    }
                    None => {
                        upstream_open = false;
                        settle_deadline = Some(Instant::now() + self.config.settle);
                    }
                },
            }
        }

        if let Some(fresh) = self.flush() {
            on_update(self.display(), &fresh);
        }
        debug!("Animation finished after {} frames", self.ticks);

        if self.accumulated.is_empty() {
            AnimationOutcome::Failed {
                error: LlmError::EmptyResponse,
                displayed: String::new(),
            }
        } else {
            AnimationOutcome::Completed {
                text: self.accumulated,
            }
        }
    }

    fn cancelled(&self) -> AnimationOutcome {
        debug!("Animation cancelled after {} frames", self.ticks);
        AnimationOutcome::Cancelled {
            displayed: self.display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn fragments(parts: &[&str]) -> impl Stream<Item = Result<String>> {
        let owned: Vec<Result<String>> = parts.iter().map(|p| Ok(p.to_string())).collect();
        stream::iter(owned)
    }

    #[test]
    fn test_tick_reveals_proportional_slice() {
        let mut animator = ResponseAnimator::new(AnimationConfig::default());
        animator.push(&"x".repeat(120));

        assert_eq!(animator.tick().unwrap().len(), 2);
        assert_eq!(animator.pending_len(), 118);
    }

    #[test]
    fn test_tick_reveals_at_least_one_char() {
        let mut animator = ResponseAnimator::new(AnimationConfig::default());
        animator.push("ab");

        assert_eq!(animator.tick().as_deref(), Some("a"));
        assert_eq!(animator.tick().as_deref(), Some("b"));
        assert_eq!(animator.tick(), None);
        assert!(animator.is_caught_up());
    }

    #[test]
    fn test_tick_respects_char_boundaries() {
        let mut animator = ResponseAnimator::new(AnimationConfig::default());
        animator.push("ấ");
        animator.tick();
        animator.push("ưu điểm");

        while animator.tick().is_some() {
            assert!(animator.accumulated().starts_with(animator.display()));
        }
        assert_eq!(animator.display(), "ấưu điểm");
    }

    #[test]
    fn test_catch_up_is_bounded() {
        let mut animator = ResponseAnimator::new(AnimationConfig::default());
        animator.push(&"y".repeat(1000));

        let mut frames = 0;
        while animator.tick().is_some() {
            frames += 1;
        }

        assert!(frames <= 1000);
        assert!(frames <= 240, "took {} frames", frames);
        assert_eq!(animator.display().len(), 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_completes_with_full_text() {
        let animator = ResponseAnimator::new(AnimationConfig::default());
        let cancel = CancellationToken::new();
        let mut updates: Vec<String> = Vec::new();

        let outcome = animator
            .run(fragments(&["Hello, ", "world", "!"]), &cancel, |display, _| {
                updates.push(display.to_string())
            })
            .await;

        match outcome {
            AnimationOutcome::Completed { text } => assert_eq!(text, "Hello, world!"),
            other => panic!("Expected Completed, got {:?}", other),
        }
        assert_eq!(updates.last().map(String::as_str), Some("Hello, world!"));
        for pair in updates.windows(2) {
            assert!(pair[1].starts_with(&pair[0]));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_empty_upstream_fails() {
        let animator = ResponseAnimator::new(AnimationConfig::default());
        let cancel = CancellationToken::new();

        let outcome = animator.run(fragments(&[]), &cancel, |_, _| {}).await;

        assert!(matches!(
            outcome,
            AnimationOutcome::Failed { error: LlmError::EmptyResponse, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_upstream_error_fails() {
        let animator = ResponseAnimator::new(AnimationConfig::default());
        let cancel = CancellationToken::new();
        let upstream = stream::iter(vec![
            Ok("partial".to_string()),
            Err(LlmError::Stream("connection reset".to_string())),
        ]);

        let outcome = animator.run(upstream, &cancel, |_, _| {}).await;

        assert!(matches!(
            outcome,
            AnimationOutcome::Failed { error: LlmError::Stream(_), .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_cancel_keeps_partial_display() {
        let animator = ResponseAnimator::new(AnimationConfig::default());
        let cancel = CancellationToken::new();
        let upstream = fragments(&["a long answer that never finishes"]).chain(stream::pending());

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let mut last_display = String::new();
        let outcome = animator
            .run(upstream, &cancel, |display, _| last_display = display.to_string())
            .await;

        match outcome {
            AnimationOutcome::Cancelled { displayed } => {
                assert_eq!(displayed, last_display);
                assert!("a long answer that never finishes".starts_with(&displayed));
                assert!(!displayed.is_empty());
            }
            other => panic!("Expected Cancelled, got {:?}", other),
        }
    }
}
