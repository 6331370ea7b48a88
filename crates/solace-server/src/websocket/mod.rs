//! Chat over WebSocket.
//!
//! - [`session`]: one task per socket; decodes frames and drives heartbeats.
//! - [`relay`]: one task for the whole server; owns the [`registry`] and
//!   fans messages out to room members.

pub mod connection;
pub mod frame;
pub mod registry;
pub mod relay;
pub mod session;

pub use connection::ClientConnection;
pub use frame::FrameError;
pub use relay::{ChatRelay, RelayCommand, RelayHandle};
pub use session::run_ws_session;
