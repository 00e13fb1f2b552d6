//! Petting and eye-poking.
//!
//! Continuous pointer gestures are folded into discrete synthetic prompts.
//! A trigger that finds the pet busy or speaking is dropped, never deferred.

use crate::config::{GestureConfig, PersonaConfig};
use crate::pet::{InteractionPipeline, Submission, TurnHandle};
use std::str::FromStr;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EyeSide {
    Left,
    Right,
}

impl FromStr for EyeSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(EyeSide::Left),
            "right" | "r" => Ok(EyeSide::Right),
            other => Err(format!("unknown eye '{other}' (expected left or right)")),
        }
    }
}

#[derive(Default)]
struct EyeHold {
    closed: bool,
    timer: Option<JoinHandle<()>>,
}

impl EyeHold {
    fn release(&mut self) {
        self.closed = false;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

pub struct GestureAccumulator {
    pipeline: InteractionPipeline,
    config: GestureConfig,
    petting_prompt: String,
    eye_poke_prompt: String,
    petting_score: u32,
    left: EyeHold,
    right: EyeHold,
}

impl GestureAccumulator {
    pub fn new(pipeline: InteractionPipeline, config: &GestureConfig, persona: &PersonaConfig) -> Self {
        Self {
            pipeline,
            config: config.clone(),
            petting_prompt: persona.petting_prompt.clone(),
            eye_poke_prompt: persona.eye_poke_prompt.clone(),
            petting_score: 0,
            left: EyeHold::default(),
            right: EyeHold::default(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn petting_score(&self) -> u32 {
        self.petting_score
    }

    pub fn eye_closed(&self, side: EyeSide) -> bool {
        self.eye(side).closed
    }

    /// One stroke of petting. Returns the turn it triggered, if any.
    ///
    /// The score is only consumed by a trigger; while the pet is busy it keeps
    /// growing.
    pub fn record_petting(&mut self) -> Option<TurnHandle> {
        if !self.config.enabled {
            return None;
        }

        self.petting_score = self.petting_score.saturating_add(1);
        if self.petting_score <= self.config.petting_threshold {
            return None;
        }

        if !self.pipeline.is_idle() {
            debug!("Petting trigger dropped, pet is busy (score {})", self.petting_score);
            return None;
        }

        match self
            .pipeline
            .try_start(Submission::synthetic(self.petting_prompt.clone()))
        {
            Ok(turn) => {
                info!("Petting threshold reached");
                self.petting_score = 0;
                Some(turn)
            }
            Err(reason) => {
                debug!("Petting trigger rejected: {:?}", reason);
                None
            }
        }
    }

    /// An eye was pressed shut. Holding it past the hold duration makes the
    /// pet react once; pressing again while held does nothing.
    pub fn record_eye_hold_start(&mut self, side: EyeSide) {
        if !self.config.enabled || self.eye(side).closed {
            return;
        }

        let pipeline = self.pipeline.clone();
        let prompt = self.eye_poke_prompt.clone();
        let deadline = Instant::now() + self.config.eye_hold();
        let timer = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;

            if !pipeline.is_idle() {
                debug!("Eye poke on {:?} dropped, pet is busy", side);
                return;
            }
            match pipeline.try_start(Submission::synthetic(prompt)) {
                Ok(_) => info!("{:?} eye held shut", side),
                Err(reason) => debug!("Eye poke rejected: {:?}", reason),
            }
        });

        let eye = self.eye_mut(side);
        eye.closed = true;
        eye.timer = Some(timer);
        self.publish_eyes();
    }

    /// The eye was let go; a pending trigger is cancelled.
    pub fn record_eye_hold_end(&mut self, side: EyeSide) {
        let eye = self.eye_mut(side);
        if !eye.closed {
            return;
        }
        eye.release();
        self.publish_eyes();
    }

    fn eye(&self, side: EyeSide) -> &EyeHold {
        match side {
            EyeSide::Left => &self.left,
            EyeSide::Right => &self.right,
        }
    }

    fn eye_mut(&mut self, side: EyeSide) -> &mut EyeHold {
        match side {
            EyeSide::Left => &mut self.left,
            EyeSide::Right => &mut self.right,
        }
    }

    fn publish_eyes(&self) {
        let (left, right) = (self.left.closed, self.right.closed);
        self.pipeline.store().update(|s| {
            let changed = s.left_eye_closed != left || s.right_eye_closed != right;
            s.left_eye_closed = left;
            s.right_eye_closed = right;
            changed
        });
    }
}

impl Drop for GestureAccumulator {
    fn drop(&mut self) {
        self.left.release();
        self.right.release();
    }
}
