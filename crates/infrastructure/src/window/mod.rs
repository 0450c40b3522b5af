//! Window host implementations.

mod channel_host;

pub use channel_host::{ChannelWindowHost, OpenedPopup};
