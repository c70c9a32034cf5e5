use ringbuf::{traits::*, HeapRb};
use tracing::warn;

/// Fixed-size window framer for captured audio.
///
/// The capture device delivers chunks of whatever size the host chooses; the
/// live wire format wants windows of exactly `window` samples.
pub struct CaptureWindow {
    buffer: HeapRb<f32>,
    window: usize,
    dropped: u64,
}

impl CaptureWindow {
    /// Create a framer holding at most `backlog` full windows
    pub fn new(window: usize, backlog: usize) -> Self {
        let window = window.max(1);
        Self {
            buffer: HeapRb::new(window * backlog.max(1)),
            window,
            dropped: 0,
        }
    }

    /// Append captured samples.
    /// Returns the number of samples actually written
    pub fn push(&mut self, samples: &[f32]) -> usize {
        let mut written = 0;

        for &sample in samples {
            if self.buffer.try_push(sample).is_ok() {
                written += 1;
            } else {
                // Buffer is full, drop old samples
                let _ = self.buffer.try_pop();
                let _ = self.buffer.try_push(sample);
                self.dropped += 1;
                written += 1;
            }
        }

        if self.dropped > 0 && self.dropped % self.window as u64 == 0 {
            warn!("Capture backlog overflowed, {} samples dropped", self.dropped);
        }

        written
    }

    /// Take the next complete window, if one is buffered
    pub fn next_window(&mut self) -> Option<Vec<f32>> {
        if self.buffer.occupied_len() < self.window {
            return None;
        }

        let mut window = vec![0.0f32; self.window];
        let read = self.buffer.pop_slice(&mut window);
        debug_assert_eq!(read, self.window);
        Some(window)
    }

    /// Samples waiting for the current window to fill
    pub fn len(&self) -> usize {
        self.buffer.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn window_size(&self) -> usize {
        self.window
    }

    /// Total samples discarded because the backlog was full
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
