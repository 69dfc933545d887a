//! Realtime delivery of board events over WebSockets.
//!
//! [`BoardHub`] owns the room map; the handler joins a socket to its
//! board's room and leaves on disconnect; the heartbeat keeps idle sockets
//! alive.

mod handler;
mod heartbeat;
pub mod hub;

pub use handler::board_socket;
pub use heartbeat::start_heartbeat;
pub use hub::BoardHub;
