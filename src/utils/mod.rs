pub mod channels;

pub use channels::WorkerChannels;
