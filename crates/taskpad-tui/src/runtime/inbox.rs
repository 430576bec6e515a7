//! Inbox channel types.
//!
//! Spawned handlers send their result events here; the runtime drains
//! the receiver each frame.

use tokio::sync::mpsc;

use crate::events::UiEvent;

pub type UiEventSender = mpsc::UnboundedSender<UiEvent>;
pub type UiEventReceiver = mpsc::UnboundedReceiver<UiEvent>;
