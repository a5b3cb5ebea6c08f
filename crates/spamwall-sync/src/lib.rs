//! Sync layer: the comment channel seam and an in-process broadcast relay.

mod event;
mod relay;

pub use event::{ChannelError, ChannelEvent};
pub use relay::{ClientId, CommentChannel, Relay, RelayClient, RelayPublisher};
