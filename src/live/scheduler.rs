use crate::audio::mixer::{FrameClock, OutputClock, ScheduledBuffer};
use crate::{AdArchitectError, Result};
use crossbeam_channel::Sender;
use std::collections::HashSet;
use tracing::debug;

/// Where and how long a buffer was placed on the output clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scheduled {
    pub id: u64,
    pub start: f64,
    pub duration: f64,
}

/// Gapless playback scheduler.
///
/// Each buffer starts at `max(cursor, now)` and pushes the cursor forward by
/// its duration, so buffers play back-to-back in arrival order. The active
/// set tracks buffers handed to the mixer that have not finished yet.
pub struct PlaybackScheduler<C: OutputClock = FrameClock> {
    clock: C,
    sample_rate: u32,
    cursor: f64,
    active: HashSet<u64>,
    next_id: u64,
    sink: Sender<ScheduledBuffer>,
}

impl<C: OutputClock> PlaybackScheduler<C> {
    pub fn new(clock: C, sample_rate: u32, sink: Sender<ScheduledBuffer>) -> Self {
        Self {
            clock,
            sample_rate: sample_rate.max(1),
            cursor: 0.0,
            active: HashSet::new(),
            next_id: 0,
            sink,
        }
    }

    /// Queue mono samples to start right after everything already queued
    pub fn schedule(&mut self, samples: Vec<f32>) -> Result<Scheduled> {
        let now = self.clock.now();
        let start = self.cursor.max(now);
        let duration = samples.len() as f64 / self.sample_rate as f64;

        let id = self.next_id;
        self.next_id += 1;

        let start_frame = (start * self.sample_rate as f64).round() as u64;
        self.sink
            .send(ScheduledBuffer {
                id,
                start_frame,
                samples,
            })
            .map_err(|_| AdArchitectError::AudioDeviceError("Playback mixer is gone".to_string()))?;

        self.cursor = start + duration;
        self.active.insert(id);

        debug!(
            "Scheduled buffer {} at {:.3}s for {:.3}s ({} active)",
            id,
            start,
            duration,
            self.active.len()
        );

        Ok(Scheduled { id, start, duration })
    }

    /// Mark a buffer as played.
    /// Returns true if it was still active
    pub fn finish(&mut self, id: u64) -> bool {
        self.active.remove(&id)
    }

    pub fn is_speaking(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Time, in output-clock seconds, at which the next buffer would start
    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    /// Forget every active buffer
    pub fn clear(&mut self) {
        self.active.clear();
    }
}
