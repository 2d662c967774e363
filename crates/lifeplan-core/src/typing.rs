//! Typewriter message reveal.
//!
//! Wall-clock driven like the welcome carousel: the caller ticks, the
//! typewriter works out how many characters are visible by now.
//!
//! ```text
//! Idle --start--> Typing(n) --tick/skip_to_end--> Complete
//!   ^                 |
//!   +-----cancel------+
//! ```

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TypingState {
    Idle,
    Typing { revealed: usize },
    Complete,
}

type CompletionHook = Box<dyn FnMut() + Send>;

pub struct Typewriter {
    text: String,
    char_count: usize,
    interval: Duration,
    state: TypingState,
    started_at: Option<Instant>,
    on_complete: Option<CompletionHook>,
}

impl fmt::Debug for Typewriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Typewriter")
            .field("text", &self.text)
            .field("interval", &self.interval)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Typewriter {
    /// `interval` is the delay per character; zero reveals everything on the
    /// first tick.
    pub fn new(text: impl Into<String>, interval: Duration) -> Self {
        let text = text.into();
        Self {
            char_count: text.chars().count(),
            text,
            interval,
            state: TypingState::Idle,
            started_at: None,
            on_complete: None,
        }
    }

    /// Called once each time a run reaches the end, whether by ticking or by
    /// skipping. Cancelled runs never call it.
    pub fn on_complete(mut self, hook: impl FnMut() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(hook));
        self
    }

    pub fn state(&self) -> TypingState {
        self.state
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_complete(&self) -> bool {
        self.state == TypingState::Complete
    }

    /// The revealed prefix. Always ends on a char boundary.
    pub fn visible(&self) -> &str {
        match self.state {
            TypingState::Idle => "",
            TypingState::Complete => &self.text,
            TypingState::Typing { revealed } => {
                let end = self
                    .text
                    .char_indices()
                    .nth(revealed)
                    .map(|(i, _)| i)
                    .unwrap_or(self.text.len());
                &self.text[..end]
            }
        }
    }

    /// Begin a run. Ignored unless idle.
    pub fn start(&mut self, now: Instant) {
        if self.state != TypingState::Idle {
            return;
        }
        self.started_at = Some(now);
        self.state = TypingState::Typing { revealed: 0 };
        if self.char_count == 0 {
            self.finish();
        }
    }

    /// Reveal whatever is due by `now`. Returns whether the visible text
    /// changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let (TypingState::Typing { revealed }, Some(started_at)) = (self.state, self.started_at)
        else {
            return false;
        };

        let due = if self.interval.is_zero() {
            self.char_count
        } else {
            let elapsed = now.saturating_duration_since(started_at);
            let ticks = elapsed.as_nanos() / self.interval.as_nanos();
            usize::try_from(ticks).unwrap_or(usize::MAX)
        };
        let due = due.min(self.char_count);
        if due == revealed {
            return false;
        }
        if due == self.char_count {
            self.finish();
        } else {
            self.state = TypingState::Typing { revealed: due };
        }
        true
    }

    /// Jump to the full text.
    pub fn skip_to_end(&mut self) {
        if matches!(self.state, TypingState::Typing { .. }) {
            self.finish();
        }
    }

    /// Stop without completing; the text disappears.
    pub fn cancel(&mut self) {
        self.state = TypingState::Idle;
        self.started_at = None;
    }

    /// Replace the text and start a new run.
    pub fn restart(&mut self, text: impl Into<String>, now: Instant) {
        self.text = text.into();
        self.char_count = self.text.chars().count();
        self.cancel();
        self.start(now);
    }

    fn finish(&mut self) {
        self.state = TypingState::Complete;
        self.started_at = None;
        if let Some(hook) = self.on_complete.as_mut() {
            hook();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let hook_count = count.clone();
        (count, move || {
            hook_count.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn reveals_one_char_per_interval() {
        let start = Instant::now();
        let mut tw = Typewriter::new("Hello", Duration::from_millis(30));
        assert_eq!(tw.visible(), "");

        tw.start(start);
        assert!(!tw.tick(start + Duration::from_millis(10)));
        assert!(tw.tick(start + Duration::from_millis(65)));
        assert_eq!(tw.visible(), "He");
        assert_eq!(tw.state(), TypingState::Typing { revealed: 2 });

        assert!(tw.tick(start + Duration::from_secs(1)));
        assert!(tw.is_complete());
        assert_eq!(tw.visible(), "Hello");
    }

    #[test]
    fn sub_millisecond_interval_reveals_by_elapsed_time() {
        let start = Instant::now();
        let mut tw = Typewriter::new("Hello", Duration::from_micros(500));
        tw.start(start);
        assert!(tw.tick(start + Duration::from_millis(1)));
        assert_eq!(tw.visible(), "He");
        assert!(tw.tick(start + Duration::from_millis(3)));
        assert!(tw.is_complete());
    }

    #[test]
    fn visible_respects_char_boundaries() {
        let start = Instant::now();
        let mut tw = Typewriter::new("héllo wörld", Duration::from_millis(10));
        tw.start(start);
        tw.tick(start + Duration::from_millis(20));
        assert_eq!(tw.visible(), "hé");
    }

    #[test]
    fn completion_hook_fires_once_per_run() {
        let (count, hook) = counter();
        let start = Instant::now();
        let mut tw = Typewriter::new("Hi", Duration::from_millis(10)).on_complete(hook);

        tw.start(start);
        tw.skip_to_end();
        tw.skip_to_end();
        tw.tick(start + Duration::from_secs(5));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tw.restart("Again", start);
        tw.tick(start + Duration::from_secs(5));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cancel_never_completes() {
        let (count, hook) = counter();
        let start = Instant::now();
        let mut tw = Typewriter::new("Hello", Duration::from_millis(10)).on_complete(hook);
        tw.start(start);
        tw.tick(start + Duration::from_millis(20));
        tw.cancel();

        assert_eq!(tw.state(), TypingState::Idle);
        assert!(!tw.tick(start + Duration::from_secs(5)));
        assert_eq!(tw.visible(), "");
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_text_completes_on_start() {
        let (count, hook) = counter();
        let mut tw = Typewriter::new("", Duration::from_millis(10)).on_complete(hook);
        tw.start(Instant::now());
        assert!(tw.is_complete());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
