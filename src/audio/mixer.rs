//! Output clock and mixer for scheduled playback
//!
//! The mixer runs inside the output device callback. Buffers arrive already
//! stamped with a start frame on the output clock; the mixer renders every
//! buffer that overlaps the requested block, advances the clock, and reports
//! each buffer once it has been fully played.
//!
//! A buffer stamped behind the block being rendered (the device moved on
//! while it was in flight) is pushed forward to the block start, and every
//! buffer queued behind it in the same burst moves by the same amount.

use crossbeam_channel::Receiver;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// A source of "current time" for playback scheduling, in seconds
pub trait OutputClock: Send {
    fn now(&self) -> f64;
}

/// Output clock driven by the number of frames the device has rendered
#[derive(Clone, Debug)]
pub struct FrameClock {
    frames: Arc<AtomicU64>,
    sample_rate: u32,
}

impl FrameClock {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            sample_rate: sample_rate.max(1),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    pub fn advance(&self, frames: u64) {
        self.frames.fetch_add(frames, Ordering::AcqRel);
    }

    pub fn seconds_to_frames(&self, seconds: f64) -> u64 {
        (seconds.max(0.0) * self.sample_rate as f64).round() as u64
    }
}

impl OutputClock for FrameClock {
    fn now(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }
}

/// A mono buffer stamped with its start position on the output clock
#[derive(Debug, Clone)]
pub struct ScheduledBuffer {
    pub id: u64,
    pub start_frame: u64,
    pub samples: Vec<f32>,
}

impl ScheduledBuffer {
    fn end_frame(&self) -> u64 {
        self.start_frame + self.samples.len() as u64
    }
}

/// Renders scheduled buffers into device blocks
pub struct Mixer {
    clock: FrameClock,
    incoming: Receiver<ScheduledBuffer>,
    ended_tx: UnboundedSender<u64>,
    voices: Vec<ScheduledBuffer>,
    /// Frames the current burst has been pushed back by
    lag: u64,
    pending: Arc<AtomicUsize>,
}

impl Mixer {
    pub fn new(
        clock: FrameClock,
        incoming: Receiver<ScheduledBuffer>,
        ended_tx: UnboundedSender<u64>,
    ) -> Self {
        Self {
            clock,
            incoming,
            ended_tx,
            voices: Vec::new(),
            lag: 0,
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Shared count of buffers received but not yet fully rendered
    pub fn pending_handle(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.pending)
    }

    /// True once every buffer handed to the mixer has finished playing
    pub fn is_drained(&self) -> bool {
        self.voices.is_empty() && self.incoming.is_empty()
    }

    /// Render one interleaved block of `channels` channels
    pub fn render(&mut self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let block_start = self.clock.frames();

        while let Ok(buffer) = self.incoming.try_recv() {
            self.admit(buffer, block_start);
        }

        out.fill(0.0);

        let frames = (out.len() / channels) as u64;
        let block_end = block_start + frames;

        for voice in &self.voices {
            let lo = voice.start_frame.max(block_start);
            let hi = voice.end_frame().min(block_end);

            for frame in lo..hi {
                let sample = voice.samples[(frame - voice.start_frame) as usize];
                let offset = (frame - block_start) as usize * channels;
                for slot in &mut out[offset..offset + channels] {
                    *slot += sample;
                }
            }
        }

        self.clock.advance(frames);

        let ended_tx = &self.ended_tx;
        let pending = &self.pending;
        self.voices.retain(|voice| {
            if voice.end_frame() <= block_end {
                pending.fetch_sub(1, Ordering::AcqRel);
                if ended_tx.send(voice.id).is_err() {
                    debug!("Playback ended for buffer {} after session closed", voice.id);
                }
                false
            } else {
                true
            }
        });
    }

    fn admit(&mut self, mut buffer: ScheduledBuffer, block_start: u64) {
        // An idle mixer starts a new burst
        if self.voices.is_empty() {
            self.lag = 0;
        }

        buffer.start_frame += self.lag;
        if buffer.start_frame < block_start {
            let behind = block_start - buffer.start_frame;
            debug!("Buffer {} arrived {} frames late, retiming", buffer.id, behind);
            self.lag += behind;
            buffer.start_frame = block_start;
        }

        self.pending.fetch_add(1, Ordering::AcqRel);
        self.voices.push(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use tokio::sync::mpsc::unbounded_channel;

    fn mixer(rate: u32) -> (
        Mixer,
        crossbeam_channel::Sender<ScheduledBuffer>,
        tokio::sync::mpsc::UnboundedReceiver<u64>,
    ) {
        let (tx, rx) = unbounded();
        let (ended_tx, ended_rx) = unbounded_channel();
        (Mixer::new(FrameClock::new(rate), rx, ended_tx), tx, ended_rx)
    }

    #[test]
    fn test_clock_advances_with_rendered_frames() {
        let (mut mixer, _tx, _ended) = mixer(100);
        let mut block = vec![0.0f32; 50 * 2];
        mixer.render(&mut block, 2);
        assert_eq!(mixer.clock().frames(), 50);
        assert!((mixer.clock().now() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_buffer_plays_at_start_frame() {
        let (mut mixer, tx, mut ended) = mixer(100);
        tx.send(ScheduledBuffer {
            id: 7,
            start_frame: 2,
            samples: vec![0.25, 0.5],
        })
        .unwrap();

        let mut block = vec![1.0f32; 6];
        mixer.render(&mut block, 1);
        assert_eq!(block, vec![0.0, 0.0, 0.25, 0.5, 0.0, 0.0]);
        assert_eq!(ended.try_recv().unwrap(), 7);
        assert!(mixer.is_drained());
    }

    #[test]
    fn test_buffer_spanning_blocks_is_reported_once() {
        let (mut mixer, tx, mut ended) = mixer(100);
        tx.send(ScheduledBuffer {
            id: 1,
            start_frame: 0,
            samples: vec![0.1; 6],
        })
        .unwrap();

        let mut block = vec![0.0f32; 4];
        mixer.render(&mut block, 1);
        assert!(ended.try_recv().is_err());
        assert_eq!(mixer.pending_handle().load(Ordering::Acquire), 1);

        mixer.render(&mut block, 1);
        assert_eq!(block, vec![0.1, 0.1, 0.0, 0.0]);
        assert_eq!(ended.try_recv().unwrap(), 1);
        assert!(ended.try_recv().is_err());
        assert_eq!(mixer.pending_handle().load(Ordering::Acquire), 0);
    }

    #[test]
    fn test_late_buffer_keeps_its_head() {
        let (mut mixer, tx, mut ended) = mixer(100);
        let mut block = vec![0.0f32; 4];

        // The device renders a block before the buffers reach it
        mixer.render(&mut block, 1);
        tx.send(ScheduledBuffer {
            id: 1,
            start_frame: 0,
            samples: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        })
        .unwrap();
        tx.send(ScheduledBuffer {
            id: 2,
            start_frame: 6,
            samples: vec![7.0, 8.0],
        })
        .unwrap();

        mixer.render(&mut block, 1);
        assert_eq!(block, vec![1.0, 2.0, 3.0, 4.0]);
        mixer.render(&mut block, 1);
        assert_eq!(block, vec![5.0, 6.0, 7.0, 8.0]);
        assert_eq!(ended.try_recv().unwrap(), 1);
        assert_eq!(ended.try_recv().unwrap(), 2);
        assert!(mixer.is_drained());
    }

    #[test]
    fn test_lag_resets_after_idle() {
        let (mut mixer, tx, _ended) = mixer(100);
        let mut block = vec![0.0f32; 4];

        mixer.render(&mut block, 1);
        tx.send(ScheduledBuffer {
            id: 1,
            start_frame: 0,
            samples: vec![0.5; 2],
        })
        .unwrap();
        mixer.render(&mut block, 1);
        assert_eq!(block, vec![0.5, 0.5, 0.0, 0.0]);

        tx.send(ScheduledBuffer {
            id: 2,
            start_frame: 9,
            samples: vec![0.25],
        })
        .unwrap();
        mixer.render(&mut block, 1);
        assert_eq!(block, vec![0.0, 0.25, 0.0, 0.0]);
    }

    #[test]
    fn test_mono_is_duplicated_across_channels() {
        let (mut mixer, tx, _ended) = mixer(100);
        tx.send(ScheduledBuffer {
            id: 1,
            start_frame: 0,
            samples: vec![0.5],
        })
        .unwrap();

        let mut block = vec![0.0f32; 4];
        mixer.render(&mut block, 2);
        assert_eq!(block, vec![0.5, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_seconds_to_frames() {
        let clock = FrameClock::new(24000);
        assert_eq!(clock.seconds_to_frames(10.5), 252000);
        assert_eq!(clock.seconds_to_frames(-1.0), 0);
    }
}
