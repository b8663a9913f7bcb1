//! Audio output: appending synthesized segments into one file.

pub mod sink;

pub use sink::AudioSink;
