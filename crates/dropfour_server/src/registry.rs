//! Directory of active rooms keyed by name.

use crate::config::ServerConfig;
use crate::error::RoomError;
use crate::protocol::RoomSummary;
use crate::room::Room;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Concurrency-safe directory of rooms.
///
/// Cloning is cheap and every clone shares the same rooms. The registry
/// lock is never held while a room lock is taken.
#[derive(Debug, Clone)]
pub struct RoomRegistry {
    rooms: Arc<Mutex<HashMap<String, Arc<Room>>>>,
    columns: usize,
    rows: usize,
    expiry: Duration,
}

impl RoomRegistry {
    /// Creates an empty registry whose rooms use the configured board size
    /// and empty-room expiry.
    #[instrument(skip(config))]
    pub fn new(config: &ServerConfig) -> Self {
        info!(
            columns = config.columns(),
            rows = config.rows(),
            expiry = ?config.expiry(),
            "Creating room registry"
        );
        Self {
            rooms: Arc::new(Mutex::new(HashMap::new())),
            columns: *config.columns(),
            rows: *config.rows(),
            expiry: config.expiry(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<Room>>> {
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts `room` under `name`.
    ///
    /// # Errors
    ///
    /// [`RoomError::RoomExists`] if the name is taken.
    #[instrument(skip(self, room))]
    pub fn add(&self, name: &str, room: Arc<Room>) -> Result<(), RoomError> {
        match self.lock().entry(name.to_string()) {
            Entry::Occupied(_) => {
                warn!("Room already exists");
                Err(RoomError::RoomExists(name.to_string()))
            }
            Entry::Vacant(slot) => {
                slot.insert(room);
                Ok(())
            }
        }
    }

    /// Looks up a room by name.
    ///
    /// # Errors
    ///
    /// [`RoomError::RoomNotFound`] if absent.
    pub fn get(&self, name: &str) -> Result<Arc<Room>, RoomError> {
        self.lock().get(name).cloned().ok_or_else(|| {
            debug!(room = name, "Room not found");
            RoomError::RoomNotFound(name.to_string())
        })
    }

    /// Removes a room. Removing an absent name is a no-op; the return value
    /// tells whether anything was removed.
    #[instrument(skip(self))]
    pub fn delete(&self, name: &str) -> bool {
        let removed = self.lock().remove(name).is_some();
        if removed {
            info!("Room deleted");
        }
        removed
    }

    /// Removes `name` only if it still maps to `room`.
    fn delete_if_same(&self, name: &str, room: &Weak<Room>) -> bool {
        let mut rooms = self.lock();
        let same = rooms
            .get(name)
            .is_some_and(|current| Arc::downgrade(current).ptr_eq(room));
        if same {
            rooms.remove(name);
        }
        same
    }

    /// Room summaries sorted by name.
    pub fn list(&self) -> Vec<RoomSummary> {
        let rooms: Vec<Arc<Room>> = self.lock().values().cloned().collect();
        let mut summaries: Vec<_> = rooms.iter().map(|room| room.summary()).collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }

    /// Number of registered rooms.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true when no room is registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Creates and registers a new room, then schedules its empty-room
    /// check.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// [`RoomError::InvalidName`] for an empty name,
    /// [`RoomError::RoomExists`] if the name is taken.
    #[instrument(skip(self))]
    pub fn create(&self, name: &str) -> Result<Arc<Room>, RoomError> {
        if name.is_empty() {
            return Err(RoomError::InvalidName);
        }
        let room = Arc::new(Room::new(name.to_string(), self.columns, self.rows));
        self.add(name, Arc::clone(&room))?;
        info!("Room '{}' was created", name);

        self.schedule_expiry(name, &room);
        Ok(room)
    }

    /// Deletes the room after the expiry delay if nobody has joined it.
    ///
    /// The check runs once and re-reads the player count when it fires. A
    /// room that was replaced under the same name in the meantime is left
    /// alone.
    fn schedule_expiry(&self, name: &str, room: &Arc<Room>) -> JoinHandle<()> {
        let registry = self.clone();
        let name = name.to_string();
        let room = Arc::downgrade(room);
        let delay = self.expiry;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let empty = room.upgrade().is_some_and(|r| r.player_count() == 0);
            if empty && registry.delete_if_same(&name, &room) {
                info!(
                    room = %name,
                    "Deleting room '{}'. Room is empty after {:?}", name, delay
                );
            }
        })
    }

    /// Removes a room whose run loop never started, if its name still maps
    /// to it. Called when a player leaves before the game began.
    ///
    /// A room launched concurrently may still be removed here; its run loop
    /// then ends on the queued disconnect.
    #[instrument(skip(self, room), fields(room = %room.name()))]
    pub fn abandon(&self, room: &Arc<Room>) -> bool {
        if room.is_started() {
            return false;
        }
        let removed = self.delete_if_same(room.name(), &Arc::downgrade(room));
        if removed {
            info!("Room '{}' was abandoned before its game started", room.name());
        }
        removed
    }

    /// Spawns the room's run loop and removes the room once it ends.
    ///
    /// A failing room is logged and removed; other rooms are unaffected.
    #[instrument(skip(self, room), fields(room = %room.name()))]
    pub fn launch(&self, room: Arc<Room>) -> JoinHandle<()> {
        let registry = self.clone();
        info!("Room '{}' is starting", room.name());

        tokio::spawn(async move {
            match room.run().await {
                Ok(state) => info!(room = %room.name(), %state, "Room finished"),
                Err(err) => error!(room = %room.name(), error = %err, "Room failed"),
            }
            if registry.delete_if_same(room.name(), &Arc::downgrade(&room)) {
                info!(room = %room.name(), "Room removed after game end");
            }
        })
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(&ServerConfig::default())
    }
}
