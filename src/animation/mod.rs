//! # Ping-Pong Animation Driver
//!
//! [`AnimationController`] counts a step from 0 up to `steps` and back down to 0, one
//! step per interval, calling a mutator and then redrawing its target on every tick.
//! Only one animation can run per controller; starting another while one is running
//! is rejected with [`BothyError::AnimationBusy`].
//!
//! The controller owns no timer. The host calls [`AnimationController::poll`] from
//! its event loop and uses [`AnimationController::next_deadline`] to schedule the
//! next wake-up.
//!
//! ## Usage
//!
//! ```
//! use std::time::{Duration, Instant};
//! use bothy::animation::{AnimationController, Redraw, StepDirection};
//!
//! #[derive(Default)]
//! struct Door { angle: f32, frames: usize }
//!
//! impl Redraw for Door {
//!     fn redraw(&mut self) -> bothy::Result<()> {
//!         self.frames += 1;
//!         Ok(())
//!     }
//! }
//!
//! let mut door = Door::default();
//! let mut controller = AnimationController::new();
//! controller
//!     .run(1000, 10, |door: &mut Door, direction: StepDirection, _step| {
//!         door.angle += 9.0 * direction.sign() as f32;
//!         Ok(())
//!     }, None)
//!     .unwrap();
//!
//! controller.poll(Instant::now() + Duration::from_secs(2), &mut door).unwrap();
//! assert!(!controller.is_running());
//! assert_eq!(door.frames, 20);
//! assert_eq!(door.angle, 0.0);
//! ```

use std::time::{Duration, Instant};

use crate::error::{BothyError, Result};

/// Something that can be redrawn after an animation step mutates it
pub trait Redraw {
    fn redraw(&mut self) -> Result<()>;
}

/// Direction the step counter is moving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Forward,
    Backward,
}

impl StepDirection {
    /// `1` going forward, `-1` coming back
    pub fn sign(self) -> i32 {
        match self {
            StepDirection::Forward => 1,
            StepDirection::Backward => -1,
        }
    }
}

/// Per-tick mutation: receives the target, the current direction and the new step
pub type StepMutator<T> = Box<dyn FnMut(&mut T, StepDirection, u32) -> Result<()>>;

/// Called once when the counter returns to zero
pub type CompletionCallback<T> = Box<dyn FnOnce(&mut T)>;

struct RunningAnimation<T> {
    steps: u32,
    step: u32,
    direction: StepDirection,
    interval: Duration,
    next_deadline: Instant,
    mutator: StepMutator<T>,
    on_complete: Option<CompletionCallback<T>>,
}

/// Idle until [`run`](Self::run), running until the ping-pong cycle completes
pub struct AnimationController<T> {
    running: Option<RunningAnimation<T>>,
}

impl<T: Redraw> AnimationController<T> {
    pub fn new() -> Self {
        Self { running: None }
    }

    /// Start a cycle of `2 * steps` ticks spread over `total_ms` per direction.
    ///
    /// Fails with [`BothyError::AnimationBusy`] while another cycle is running and
    /// with [`BothyError::Validation`] when `steps` is zero.
    pub fn run<F>(
        &mut self,
        total_ms: u64,
        steps: u32,
        mutator: F,
        on_complete: Option<CompletionCallback<T>>,
    ) -> Result<()>
    where
        F: FnMut(&mut T, StepDirection, u32) -> Result<()> + 'static,
    {
        if self.running.is_some() {
            log::warn!("Rejected animation start: another animation is running");
            return Err(BothyError::AnimationBusy);
        }
        if steps == 0 {
            return Err(BothyError::Validation(
                "animation needs at least one step".to_string(),
            ));
        }

        let interval = Duration::from_millis(total_ms) / steps;
        log::info!(
            "Starting animation: {} steps every {:?}",
            steps,
            interval
        );
        self.running = Some(RunningAnimation {
            steps,
            step: 0,
            direction: StepDirection::Forward,
            interval,
            next_deadline: Instant::now() + interval,
            mutator: Box::new(mutator),
            on_complete,
        });
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Step counter of the running animation
    pub fn current_step(&self) -> Option<u32> {
        self.running.as_ref().map(|running| running.step)
    }

    pub fn direction(&self) -> Option<StepDirection> {
        self.running.as_ref().map(|running| running.direction)
    }

    /// When the next tick is due, if an animation is running
    pub fn next_deadline(&self) -> Option<Instant> {
        self.running.as_ref().map(|running| running.next_deadline)
    }

    /// Fire every tick due at `now`, in order. Returns how many ticks fired.
    pub fn poll(&mut self, now: Instant, target: &mut T) -> Result<usize> {
        let mut fired = 0;
        while let Some(deadline) = self.next_deadline() {
            if deadline > now {
                break;
            }
            self.tick(target)?;
            fired += 1;
        }
        Ok(fired)
    }

    /// Advance one step immediately, ignoring the schedule.
    ///
    /// A failing mutator or redraw stops the animation without calling the
    /// completion callback.
    pub fn tick(&mut self, target: &mut T) -> Result<()> {
        let Some(running) = self.running.as_mut() else {
            return Ok(());
        };

        running.step = match running.direction {
            StepDirection::Forward => running.step + 1,
            StepDirection::Backward => running.step - 1,
        };
        let direction = running.direction;
        let step = running.step;

        let result = (running.mutator)(target, direction, step).and_then(|_| target.redraw());
        if let Err(error) = result {
            log::warn!("Animation stopped at step {}: {}", step, error);
            self.running = None;
            return Err(error);
        }

        running.next_deadline += running.interval;
        if direction == StepDirection::Forward && step == running.steps {
            running.direction = StepDirection::Backward;
        } else if direction == StepDirection::Backward && step == 0 {
            let finished = self.running.take();
            log::info!("Animation finished");
            if let Some(on_complete) = finished.and_then(|running| running.on_complete) {
                on_complete(target);
            }
        }
        Ok(())
    }

    /// Stop the running animation where it is. The completion callback is not called.
    pub fn cancel(&mut self) -> bool {
        match self.running.take() {
            Some(running) => {
                log::info!("Animation cancelled at step {}", running.step);
                true
            }
            None => false,
        }
    }
}

impl<T: Redraw> Default for AnimationController<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Target {
        ticks: Vec<(StepDirection, u32)>,
        redraws: usize,
        completions: usize,
        fail_redraw: bool,
    }

    impl Redraw for Target {
        fn redraw(&mut self) -> Result<()> {
            if self.fail_redraw {
                return Err(BothyError::ResourceLookup("res/missing.jpg".into()));
            }
            self.redraws += 1;
            Ok(())
        }
    }

    fn record(target: &mut Target, direction: StepDirection, step: u32) -> Result<()> {
        target.ticks.push((direction, step));
        Ok(())
    }

    fn on_complete() -> Option<CompletionCallback<Target>> {
        Some(Box::new(|target: &mut Target| target.completions += 1))
    }

    fn later() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    #[test]
    fn test_ping_pong_sequence() {
        let mut target = Target::default();
        let mut controller = AnimationController::new();
        controller.run(1000, 10, record, on_complete()).unwrap();

        let fired = controller.poll(later(), &mut target).unwrap();

        let steps: Vec<u32> = target.ticks.iter().map(|(_, step)| *step).collect();
        assert_eq!(fired, 20);
        assert_eq!(steps, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
        assert!(target.ticks[..10]
            .iter()
            .all(|(direction, _)| *direction == StepDirection::Forward));
        assert!(target.ticks[10..]
            .iter()
            .all(|(direction, _)| *direction == StepDirection::Backward));
        assert_eq!(target.redraws, 20);
        assert_eq!(target.completions, 1);
        assert!(!controller.is_running());

        assert_eq!(controller.poll(later(), &mut target).unwrap(), 0);
        assert_eq!(target.completions, 1);
    }

    #[test]
    fn test_run_while_running_is_rejected() {
        let mut target = Target::default();
        let mut controller = AnimationController::new();
        controller.run(1000, 3, record, None).unwrap();
        controller.tick(&mut target).unwrap();

        assert!(matches!(
            controller.run(1000, 3, record, None),
            Err(BothyError::AnimationBusy)
        ));
        assert_eq!(controller.current_step(), Some(1));

        controller.poll(later(), &mut target).unwrap();
        assert!(controller.run(1000, 3, record, None).is_ok());
    }

    #[test]
    fn test_zero_steps_is_rejected() {
        let mut controller = AnimationController::<Target>::new();
        assert!(matches!(
            controller.run(1000, 0, record, None),
            Err(BothyError::Validation(_))
        ));
        assert!(!controller.is_running());
    }

    #[test]
    fn test_poll_respects_deadlines() {
        let mut target = Target::default();
        let mut controller = AnimationController::new();
        controller.run(1000, 10, record, None).unwrap();

        let first = controller.next_deadline().unwrap();
        assert_eq!(controller.poll(first - Duration::from_millis(1), &mut target).unwrap(), 0);
        assert_eq!(controller.poll(first, &mut target).unwrap(), 1);
        assert_eq!(controller.next_deadline(), Some(first + Duration::from_millis(100)));
        assert_eq!(
            controller.poll(first + Duration::from_millis(250), &mut target).unwrap(),
            2
        );
        assert_eq!(controller.current_step(), Some(3));
    }

    #[test]
    fn test_cancel_skips_completion() {
        let mut target = Target::default();
        let mut controller = AnimationController::new();
        controller.run(100, 5, record, on_complete()).unwrap();
        controller.tick(&mut target).unwrap();

        assert!(controller.cancel());
        assert!(!controller.cancel());
        assert_eq!(controller.poll(later(), &mut target).unwrap(), 0);
        assert_eq!(target.completions, 0);
    }

    #[test]
    fn test_failed_redraw_stops_animation() {
        let mut target = Target {
            fail_redraw: true,
            ..Default::default()
        };
        let mut controller = AnimationController::new();
        controller.run(100, 5, record, on_complete()).unwrap();

        assert!(controller.poll(later(), &mut target).is_err());
        assert!(!controller.is_running());
        assert_eq!(target.ticks.len(), 1);
        assert_eq!(target.completions, 0);
    }

    #[test]
    fn test_single_step_cycle() {
        let mut target = Target::default();
        let mut controller = AnimationController::new();
        controller.run(10, 1, record, on_complete()).unwrap();
        controller.poll(later(), &mut target).unwrap();

        let steps: Vec<u32> = target.ticks.iter().map(|(_, step)| *step).collect();
        assert_eq!(steps, vec![1, 0]);
        assert_eq!(target.completions, 1);
    }
}
