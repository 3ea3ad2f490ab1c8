//! Treasure hunt register.
//!
//! Keeps the maps a player still has to dig up, ordered by straight-line
//! distance from where they currently stand. Every change is written to the
//! backing store straight away.

use serde::{Deserialize, Serialize};

use crate::domain::{Line, Point, Server};
use crate::geometry::calc_real_distance;
use crate::storage::{self, KeyValueStore, StorageKey, StoreError};

/// Grid references are at most three characters, e.g. `M12`.
pub const MAX_GRID_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreasureMap {
    pub position: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TreasureMap {
    pub fn at(position: Point) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_grid(mut self, grid: impl Into<String>) -> Self {
        self.grid = Some(grid.into());
        self
    }

    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Drops blank optional fields and truncates the grid reference, the
    /// way the entry form treats them.
    fn normalized(mut self) -> Self {
        self.grid = self
            .grid
            .map(|grid| grid.trim().chars().take(MAX_GRID_LEN).collect::<String>())
            .filter(|grid| !grid.is_empty());
        self.notes = self.notes.filter(|notes| !notes.trim().is_empty());
        self.quality = self.quality.filter(|quality| *quality != 0.0);
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("no treasure map at index {index} (register holds {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct TreasureRegister<S: KeyValueStore> {
    store: S,
    maps: Vec<TreasureMap>,
    current_position: Option<Point>,
    server: Server,
}

impl<S: KeyValueStore> TreasureRegister<S> {
    /// Loads persisted state. Missing or malformed values fall back to an
    /// empty list, no position and the default server.
    pub fn open(store: S) -> Self {
        let maps = storage::load(&store, StorageKey::TreasureMaps).unwrap_or_default();
        let current_position = storage::load(&store, StorageKey::CurrentPosition);
        let server = storage::load(&store, StorageKey::Server).unwrap_or_default();
        let mut register = Self {
            store,
            maps,
            current_position,
            server,
        };
        register.refresh_distances();
        log::debug!(
            "loaded {} treasure maps (position {:?}, server {})",
            register.maps.len(),
            register.current_position,
            register.server
        );
        register
    }

    pub fn maps(&self) -> &[TreasureMap] {
        &self.maps
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn current_position(&self) -> Option<Point> {
        self.current_position
    }

    pub fn server(&self) -> Server {
        self.server
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// The closest map, once a current position is known.
    pub fn target(&self) -> Option<&TreasureMap> {
        self.current_position.and(self.maps.first())
    }

    pub fn map_link(&self, index: usize) -> Option<String> {
        self.maps
            .get(index)
            .map(|map| self.server.map_link(map.position))
    }

    pub fn add(&mut self, map: TreasureMap) -> Result<(), RegisterError> {
        let before = self.snapshot();
        self.maps.push(map.normalized());
        self.refresh_distances();
        self.persist(before, false)
    }

    pub fn edit(&mut self, index: usize, map: TreasureMap) -> Result<(), RegisterError> {
        self.check_index(index)?;
        let before = self.snapshot();
        self.maps[index] = map.normalized();
        self.refresh_distances();
        self.persist(before, false)
    }

    pub fn delete(&mut self, index: usize) -> Result<TreasureMap, RegisterError> {
        self.check_index(index)?;
        let before = self.snapshot();
        let removed = self.maps.remove(index);
        self.refresh_distances();
        self.persist(before, false)?;
        Ok(removed)
    }

    /// The treasure was found: the map is used up and the player now stands
    /// where it was buried.
    pub fn claim(&mut self, index: usize) -> Result<TreasureMap, RegisterError> {
        self.check_index(index)?;
        let before = self.snapshot();
        let claimed = self.maps.remove(index);
        self.current_position = Some(claimed.position);
        self.refresh_distances();
        self.persist(before, true)?;
        Ok(claimed)
    }

    /// Digging turned up another map instead of treasure: the player now
    /// stands at the old map's spot and the entry takes the new position and
    /// grid. Quality and notes left empty on `map` carry over from the old
    /// entry.
    pub fn replace(&mut self, index: usize, map: TreasureMap) -> Result<(), RegisterError> {
        self.check_index(index)?;
        let before = self.snapshot();
        let previous = &self.maps[index];
        let mut map = map.normalized();
        if map.quality.is_none() {
            map.quality = previous.quality;
        }
        if map.notes.is_none() {
            map.notes = previous.notes.clone();
        }
        self.current_position = Some(previous.position);
        self.maps[index] = map;
        self.refresh_distances();
        self.persist(before, true)
    }

    pub fn set_current_position(&mut self, position: Point) -> Result<(), RegisterError> {
        let before = self.snapshot();
        self.current_position = Some(position);
        self.refresh_distances();
        self.persist(before, true)
    }

    pub fn set_server(&mut self, server: Server) -> Result<(), RegisterError> {
        let previous = self.server;
        self.server = server;
        if let Err(err) = storage::save(&mut self.store, StorageKey::Server, &self.server) {
            self.server = previous;
            return Err(err.into());
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), RegisterError> {
        if index < self.maps.len() {
            Ok(())
        } else {
            Err(RegisterError::IndexOutOfRange {
                index,
                len: self.maps.len(),
            })
        }
    }

    fn refresh_distances(&mut self) {
        let Some(origin) = self.current_position else {
            for map in &mut self.maps {
                map.distance = None;
            }
            return;
        };
        for map in &mut self.maps {
            map.distance = Some(calc_real_distance(&Line::new(origin, map.position)));
        }
        self.maps.sort_by(|a, b| {
            a.distance
                .unwrap_or_default()
                .total_cmp(&b.distance.unwrap_or_default())
        });
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            maps: self.maps.clone(),
            current_position: self.current_position,
        }
    }

    /// Writes the list, then the position when it moved. On failure memory
    /// goes back to `before` and an already written list is rewritten;
    /// memory and store agree either way.
    fn persist(&mut self, before: Snapshot, position_moved: bool) -> Result<(), RegisterError> {
        let mut maps_saved = false;
        let mut result = self.save_maps();
        if result.is_ok() {
            maps_saved = true;
            if position_moved {
                result = self.save_position();
            }
        }
        let Err(err) = result else {
            return Ok(());
        };

        log::warn!("treasure register not saved, reverting: {err}");
        self.maps = before.maps;
        self.current_position = before.current_position;
        if maps_saved {
            if let Err(restore_err) = self.save_maps() {
                log::error!("failed to restore saved treasure maps: {restore_err}");
            }
        }
        Err(err)
    }

    fn save_maps(&mut self) -> Result<(), RegisterError> {
        storage::save(&mut self.store, StorageKey::TreasureMaps, &self.maps)?;
        Ok(())
    }

    fn save_position(&mut self) -> Result<(), RegisterError> {
        match self.current_position {
            Some(position) => {
                storage::save(&mut self.store, StorageKey::CurrentPosition, &position)?
            }
            None => storage::remove(&mut self.store, StorageKey::CurrentPosition)?,
        }
        Ok(())
    }
}

struct Snapshot {
    maps: Vec<TreasureMap>,
    current_position: Option<Point>,
}
