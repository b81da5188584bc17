//! Deferred action sequences
//!
//! A sequence is a list of `(delay, action)` steps. Each step waits its delay
//! after the previous step fired. `advance(dt)` walks every sequence forward by
//! frame time and returns the actions that came due, in firing order.

use std::collections::VecDeque;

/// Slack when comparing accumulated frame time against a delay
const TIME_EPSILON: f64 = 1e-6;

/// One step: wait `delay` seconds, then fire `action`
#[derive(Debug, Clone, PartialEq)]
pub struct Step<A> {
    pub delay: f32,
    pub action: A,
}

#[derive(Debug, Clone)]
struct Sequence<A> {
    steps: VecDeque<Step<A>>,
    /// Time waited on the front step so far
    waited: f64,
}

/// Queue of in-flight sequences. No cancellation.
#[derive(Debug, Clone)]
pub struct Scheduler<A> {
    sequences: Vec<Sequence<A>>,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self {
            sequences: Vec::new(),
        }
    }
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new sequence
    pub fn run(&mut self, steps: impl IntoIterator<Item = (f32, A)>) {
        let steps: VecDeque<Step<A>> = steps
            .into_iter()
            .map(|(delay, action)| Step {
                delay: delay.max(0.0),
                action,
            })
            .collect();
        if !steps.is_empty() {
            self.sequences.push(Sequence { steps, waited: 0.0 });
        }
    }

    /// Number of sequences still running
    pub fn pending(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_idle(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Advance all sequences by `dt` and collect due actions.
    /// Sequences fire in the order they were started.
    pub fn advance(&mut self, dt: f32) -> Vec<A> {
        let mut due = Vec::new();
        for seq in &mut self.sequences {
            let mut budget = f64::from(dt);
            while let Some(front) = seq.steps.front() {
                let remaining = f64::from(front.delay) - seq.waited;
                if remaining > budget + TIME_EPSILON {
                    seq.waited += budget;
                    break;
                }
                budget -= remaining.max(0.0);
                seq.waited = 0.0;
                if let Some(step) = seq.steps.pop_front() {
                    due.push(step.action);
                }
            }
        }
        self.sequences.retain(|s| !s.steps.is_empty());
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_delay_fires_once() {
        let mut scheduler = Scheduler::new();
        scheduler.run([(4.0, "recover")]);

        for _ in 0..7 {
            assert!(scheduler.advance(0.5).is_empty());
        }
        assert_eq!(scheduler.advance(0.5), vec!["recover"]);
        assert!(scheduler.is_idle());
        assert!(scheduler.advance(10.0).is_empty());
    }

    #[test]
    fn test_zero_delay_fires_on_next_advance() {
        let mut scheduler = Scheduler::new();
        scheduler.run([(0.0, 1), (0.25, 2)]);
        assert_eq!(scheduler.advance(0.0), vec![1]);
        assert_eq!(scheduler.advance(0.25), vec![2]);
    }

    #[test]
    fn test_large_step_fires_everything_in_order() {
        let mut scheduler = Scheduler::new();
        scheduler.run([(0.0, 'a'), (0.5, 'b'), (0.5, 'c')]);
        scheduler.run([(0.75, 'x')]);
        assert_eq!(scheduler.advance(2.0), vec!['a', 'b', 'c', 'x']);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_sixty_hertz_frames_fire_on_time() {
        let mut scheduler = Scheduler::new();
        scheduler.run([(4.0, "recover")]);
        let frames = (1..=300)
            .find(|_| !scheduler.advance(1.0 / 60.0).is_empty())
            .unwrap();
        assert_eq!(frames, 240);
    }

    #[test]
    fn test_leftover_time_carries_into_next_step() {
        let mut scheduler = Scheduler::new();
        scheduler.run([(0.5, 1), (0.5, 2)]);
        // 0.75 fires step 1 and banks 0.25 toward step 2
        assert_eq!(scheduler.advance(0.75), vec![1]);
        assert!(scheduler.advance(0.125).is_empty());
        assert_eq!(scheduler.advance(0.125), vec![2]);
    }
}
