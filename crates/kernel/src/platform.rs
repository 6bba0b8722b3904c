use std::time::Duration;

use cadence_render::{DebugTextRenderer, DrawList, Renderer};

use crate::{Environment, ManualClock};

/// Fatal window / surface problems.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("failed to create window: {0}")]
    Window(String),
    #[error("failed to create rendering context: {0}")]
    Context(String),
    #[error("failed to present frame: {0}")]
    Present(String),
}

/// Window, event source and presentation surface driven by the scheduler.
///
/// `poll_events` is the only place raw events enter the runtime; it writes
/// key state, focus and window size into the environment.
pub trait Platform {
    fn open(&mut self, env: &mut Environment) -> Result<(), PlatformError>;

    fn poll_events(&mut self, env: &mut Environment);

    fn is_focused(&self) -> bool;

    fn close_requested(&self) -> bool;

    fn present(&mut self, frame: &DrawList, env: &Environment) -> Result<(), PlatformError>;

    /// Release the window and rendering context. Called once per `open`.
    fn shutdown(&mut self);
}

/// Window-less platform: always focused, optionally asks to close after a
/// number of polls, and keeps the last presented frame as text.
///
/// With [`HeadlessPlatform::simulated`] every poll advances a shared
/// [`ManualClock`], which makes whole runs deterministic.
#[derive(Debug, Default)]
pub struct HeadlessPlatform {
    close_after: Option<u64>,
    sim: Option<(ManualClock, Duration)>,
    polls: u64,
    presented: u64,
    shutdowns: u32,
    last_frame: String,
    renderer: DebugTextRenderer,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request close once `polls` event polls have happened.
    pub fn close_after(mut self, polls: u64) -> Self {
        self.close_after = Some(polls);
        self
    }

    /// Advance `clock` by `per_poll` on every event poll.
    pub fn simulated(mut self, clock: ManualClock, per_poll: Duration) -> Self {
        self.sim = Some((clock, per_poll));
        self
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    pub fn shutdowns(&self) -> u32 {
        self.shutdowns
    }

    /// Text dump of the most recently presented frame.
    pub fn last_frame(&self) -> &str {
        &self.last_frame
    }
}

impl Platform for HeadlessPlatform {
    fn open(&mut self, env: &mut Environment) -> Result<(), PlatformError> {
        tracing::debug!(
            width = env.window.width,
            height = env.window.height,
            "headless platform opened"
        );
        Ok(())
    }

    fn poll_events(&mut self, _env: &mut Environment) {
        self.polls += 1;
        if let Some((clock, per_poll)) = &self.sim {
            clock.advance(*per_poll);
        }
    }

    fn is_focused(&self) -> bool {
        true
    }

    fn close_requested(&self) -> bool {
        self.close_after.is_some_and(|n| self.polls >= n)
    }

    fn present(&mut self, frame: &DrawList, env: &Environment) -> Result<(), PlatformError> {
        self.last_frame = self.renderer.render(frame, &env.camera);
        self.presented += 1;
        Ok(())
    }

    fn shutdown(&mut self) {
        self.shutdowns += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_physics::SimpleWorld;

    #[test]
    fn headless_closes_after_requested_polls() {
        let mut env = Environment::new(Box::new(SimpleWorld::new()));
        let mut platform = HeadlessPlatform::new().close_after(2);
        platform.open(&mut env).unwrap();
        platform.poll_events(&mut env);
        assert!(!platform.close_requested());
        platform.poll_events(&mut env);
        assert!(platform.close_requested());
        assert!(platform.is_focused());
    }

    #[test]
    fn simulated_polls_advance_the_clock() {
        use crate::Clock;

        let mut env = Environment::new(Box::new(SimpleWorld::new()));
        let clock = ManualClock::new();
        let mut platform =
            HeadlessPlatform::new().simulated(clock.clone(), Duration::from_millis(10));
        platform.poll_events(&mut env);
        platform.poll_events(&mut env);
        assert_eq!(clock.now(), Duration::from_millis(20));
        assert_eq!(platform.polls(), 2);
    }

    #[test]
    fn headless_keeps_last_frame_text() {
        let env = Environment::new(Box::new(SimpleWorld::new()));
        let mut platform = HeadlessPlatform::new();
        platform.present(&DrawList::new(), &env).unwrap();
        assert_eq!(platform.presented(), 1);
        assert!(platform.last_frame().contains("0 draws"));
    }

    #[test]
    fn platform_errors_describe_the_failure() {
        let err = PlatformError::Context("no adapter".into());
        assert_eq!(err.to_string(), "failed to create rendering context: no adapter");
    }
}
