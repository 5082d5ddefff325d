//! `atrium-realtime` — the real-time collaborator contract and an
//! in-process broadcast implementation of it.
//!
//! The executors only ever see [`RealtimeNotifier`]; whether events fan out
//! through the in-process hub or a hosted pub/sub provider is wiring.

pub mod channel;
pub mod hub;
pub mod notifier;

pub use channel::{TYPING_TTL, channel_for_post, event};
pub use hub::{BroadcastHub, ChannelMessage};
pub use notifier::{ClientToken, RealtimeNotifier};
