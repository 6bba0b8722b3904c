use std::time::Duration;

use cadence_render::DrawList;
use serde::{Deserialize, Serialize};

use crate::{Clock, Environment, FixedTimestep, Game, Platform, PlatformError, SystemClock};

/// Scheduler tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Fixed steps per second.
    pub frame_cap: u32,
    /// Most fixed steps run in one loop iteration before backlog is dropped.
    pub max_steps_per_frame: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            frame_cap: 60,
            max_steps_per_frame: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("scheduler is already running")]
    AlreadyRunning,
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Counters since the scheduler was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub iterations: u64,
    pub steps: u64,
    pub frames: u64,
    pub paused_iterations: u64,
    pub dropped_steps: u64,
}

/// Fixed-timestep frame loop: input and update at a fixed rate, render once
/// per iteration that stepped, pause while the window is unfocused.
pub struct Scheduler<P: Platform, C: Clock = SystemClock> {
    platform: P,
    clock: C,
    timestep: FixedTimestep,
    frame_cap: u32,
    state: RunState,
    last_tick: Duration,
    focused: bool,
    needs_teardown: bool,
    stats: FrameStats,
    fps_window_start: Duration,
    fps_frames: u32,
    draw: DrawList,
}

impl<P: Platform> Scheduler<P> {
    pub fn new(platform: P, config: SchedulerConfig) -> Self {
        Self::with_clock(platform, SystemClock::new(), config)
    }
}

impl<P: Platform, C: Clock> Scheduler<P, C> {
    pub fn with_clock(platform: P, clock: C, config: SchedulerConfig) -> Self {
        let now = clock.now();
        Self {
            platform,
            clock,
            timestep: FixedTimestep::new(config.frame_cap, config.max_steps_per_frame),
            frame_cap: config.frame_cap,
            state: RunState::Stopped,
            last_tick: now,
            focused: true,
            needs_teardown: false,
            stats: FrameStats::default(),
            fps_window_start: now,
            fps_frames: 0,
            draw: DrawList::new(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn timestep(&self) -> &FixedTimestep {
        &self.timestep
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Open the platform and run the loop until stopped, then tear down.
    pub fn start<G: Game + ?Sized>(
        &mut self,
        game: &mut G,
        env: &mut Environment,
    ) -> Result<(), SchedulerError> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.needs_teardown = true;
        if let Err(e) = self.platform.open(env) {
            self.teardown();
            return Err(e.into());
        }

        self.state = RunState::Running;
        self.reset_clock();
        tracing::info!(
            frame_cap = self.frame_cap,
            max_steps = self.timestep.max_steps(),
            "scheduler started"
        );

        let mut result = Ok(());
        while self.is_running() {
            if let Err(e) = self.iterate(game, env) {
                result = Err(e);
                break;
            }
        }

        self.state = RunState::Stopped;
        tracing::info!(
            frames = self.stats.frames,
            steps = self.stats.steps,
            "scheduler stopped"
        );
        self.teardown();
        result
    }

    /// Ask the loop to finish. Takes effect at the top of the next iteration.
    pub fn stop(&mut self) {
        if self.state == RunState::Running {
            tracing::debug!("stop requested");
        }
        self.state = RunState::Stopped;
    }

    /// One loop iteration. Returns how many fixed steps ran.
    pub fn iterate<G: Game + ?Sized>(
        &mut self,
        game: &mut G,
        env: &mut Environment,
    ) -> Result<u32, SchedulerError> {
        self.platform.poll_events(env);
        self.stats.iterations += 1;

        if !self.platform.is_focused() {
            if self.focused {
                tracing::info!("focus lost, pausing");
                self.focused = false;
            }
            self.reset_clock();
            self.stats.paused_iterations += 1;
            if self.platform.close_requested() {
                self.stop();
            }
            return Ok(0);
        }
        if !self.focused {
            tracing::info!("focus regained, resuming");
            self.focused = true;
        }

        let now = self.clock.now();
        self.timestep.accumulate(now.saturating_sub(self.last_tick));
        self.last_tick = now;

        let dt = self.timestep.step_secs();
        let mut steps = 0;
        while steps < self.timestep.max_steps() && self.timestep.consume() {
            steps += 1;
            if self.platform.close_requested() {
                self.stop();
            }
            game.input(dt, env);
            game.update(dt, env);
        }
        self.stats.steps += u64::from(steps);

        let dropped = self.timestep.discard_backlog();
        if dropped > 0 {
            tracing::debug!(dropped, "frame budget exceeded, dropping backlog");
            self.stats.dropped_steps += dropped;
        }

        if steps > 0 {
            self.draw.clear();
            game.render(env, &mut self.draw);
            self.platform.present(&self.draw, env)?;
            self.stats.frames += 1;
            self.count_frame(now);
        }

        Ok(steps)
    }

    /// Shut the platform down if it was opened. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if std::mem::take(&mut self.needs_teardown) {
            self.platform.shutdown();
            tracing::debug!("platform shut down");
        }
    }

    fn reset_clock(&mut self) {
        self.timestep.reset();
        self.last_tick = self.clock.now();
    }

    fn count_frame(&mut self, now: Duration) {
        self.fps_frames += 1;
        if now.saturating_sub(self.fps_window_start) >= Duration::from_secs(1) {
            tracing::debug!(fps = self.fps_frames, "frames per second");
            self.fps_frames = 0;
            self.fps_window_start = now;
        }
    }
}

impl<P: Platform, C: Clock> Drop for Scheduler<P, C> {
    fn drop(&mut self) {
        self.teardown();
    }
}
