//! dropfour server library - rooms, registry and transport
//!
//! Players create named rooms over HTTP, join them over WebSockets, and
//! take turns dropping pieces. Game rules live in [`dropfour_connect4`];
//! this crate adds the concurrency and lifecycle around them.
//!
//! # Architecture
//!
//! - **Room**: one game plus its player connections behind one lock, and
//!   the run loop that applies moves and broadcasts results
//! - **RoomRegistry**: shared name → room directory with empty-room expiry
//! - **Protocol**: JSON messages sent to players and listing entries
//! - **HTTP**: axum router for create / list / join
//!
//! # Example
//!
//! ```no_run
//! use dropfour_server::{RoomRegistry, ServerConfig, router};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::default();
//! let registry = RoomRegistry::new(&config);
//! let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
//! axum::serve(listener, router(registry)).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod http;
mod protocol;
mod registry;
mod room;

// Crate-level exports - Configuration
pub use config::{ConfigError, ConfigOverrides, ServerConfig};

// Crate-level exports - Errors
pub use error::{ErrorKind, RoomError};

// Crate-level exports - Transport
pub use http::{JoinRoomQuery, NewRoomQuery, router, validate_player_id};

// Crate-level exports - Wire protocol
pub use protocol::{GameSnapshot, RoomSummary, ServerMessage};

// Crate-level exports - Rooms
pub use registry::RoomRegistry;
pub use room::{Connection, Room, RoomEvent};
