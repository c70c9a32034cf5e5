use crossbeam_channel::{bounded, Receiver, Sender};

/// Command and event channel pairs for a worker thread
pub struct WorkerChannels<C, E> {
    pub command_tx: Sender<C>,
    pub command_rx: Receiver<C>,
    pub event_tx: Sender<E>,
    pub event_rx: Receiver<E>,
}

impl<C, E> WorkerChannels<C, E> {
    pub fn new(command_capacity: usize, event_capacity: usize) -> Self {
        let (command_tx, command_rx) = bounded(command_capacity);
        let (event_tx, event_rx) = bounded(event_capacity);

        Self {
            command_tx,
            command_rx,
            event_tx,
            event_rx,
        }
    }
}

impl<C, E> Default for WorkerChannels<C, E> {
    fn default() -> Self {
        Self::new(100, 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels_are_bounded() {
        let channels: WorkerChannels<u8, String> = WorkerChannels::new(1, 2);
        assert_eq!(channels.command_tx.capacity(), Some(1));
        assert_eq!(channels.event_tx.capacity(), Some(2));

        channels.command_tx.send(7).unwrap();
        assert!(channels.command_tx.try_send(8).is_err());
        assert_eq!(channels.command_rx.recv().unwrap(), 7);
    }
}
