// MIDI message model

pub mod message;

pub use message::Message;
