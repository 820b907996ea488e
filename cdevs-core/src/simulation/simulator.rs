use crate::atomic::AtomicModel;
use crate::context::Context;
use crate::errors::{DevsError, DevsResult};
use crate::message::Message;
use crate::time::{is_valid_advance, Time, INFINITY};

/// Drives a single atomic model and keeps its clock.
#[derive(Debug)]
pub struct Simulator {
    model: AtomicModel,
    time_last: Time,
    time_next: Time,
}

impl Simulator {
    pub fn new(model: AtomicModel) -> Self {
        Self {
            model,
            time_last: 0.0,
            time_next: INFINITY,
        }
    }

    pub fn model(&self) -> &AtomicModel {
        &self.model
    }

    pub fn time_last(&self) -> Time {
        self.time_last
    }

    pub fn time_next(&self) -> Time {
        self.time_next
    }

    fn violation(&self, clock: Time, now: Time, reason: impl Into<String>) -> DevsError {
        DevsError::ClockInvariantViolation {
            model: self.model.path().to_string(),
            phase: self.model.phase().to_string(),
            time: now,
            clock,
            reason: reason.into(),
        }
    }

    /// Query the time advance of the current phase and schedule the next event from now.
    fn schedule(&mut self, ctx: &mut Context) -> DevsResult<()> {
        let now = ctx.now();
        let duration = self.model.time_advance(ctx)?;
        if !is_valid_advance(duration) {
            return Err(self.violation(
                self.time_next,
                now,
                format!("time advance {duration} is not a non-negative duration"),
            ));
        }
        self.time_last = now;
        self.time_next = now + duration;
        Ok(())
    }

    pub fn initialise(&mut self, ctx: &mut Context) -> DevsResult<()> {
        self.schedule(ctx)
    }

    pub fn internal_transition(&mut self, ctx: &mut Context) -> DevsResult<Option<Message>> {
        let now = ctx.now();
        if now != self.time_next {
            return Err(self.violation(
                self.time_next,
                now,
                "internal transition requested away from the scheduled time",
            ));
        }
        let message = self.model.internal_transition(ctx)?;
        self.schedule(ctx)?;
        Ok(message)
    }

    pub fn external_transition(&mut self, ctx: &mut Context, input: &Message) -> DevsResult<()> {
        let now = ctx.now();
        if now < self.time_last || now > self.time_next {
            let clock = if now < self.time_last {
                self.time_last
            } else {
                self.time_next
            };
            return Err(self.violation(
                clock,
                now,
                format!(
                    "input outside [{}, {}]",
                    self.time_last, self.time_next
                ),
            ));
        }
        let elapsed = now - self.time_last;
        if self.model.external_transition(ctx, elapsed, input)? {
            self.schedule(ctx)?;
        }
        Ok(())
    }
}
