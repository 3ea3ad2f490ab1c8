//! Treasure register behaviour over a file-backed store.

use std::fs;

use tempfile::tempdir;
use wurm_utils::storage::{JsonFileStore, KeyValueStore, StorageKey};
use wurm_utils::treasures::RegisterError;
use wurm_utils::{Point, Server, TreasureMap, TreasureRegister};

fn positions(register: &TreasureRegister<JsonFileStore>) -> Vec<Point> {
    register.maps().iter().map(|map| map.position).collect()
}

fn distances(register: &TreasureRegister<JsonFileStore>) -> Vec<f64> {
    register
        .maps()
        .iter()
        .map(|map| map.distance.unwrap_or(f64::NAN))
        .collect()
}

#[test]
fn test_hunt_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");

    {
        let mut register = TreasureRegister::open(JsonFileStore::open(&path).unwrap());
        register
            .add(TreasureMap::at(Point::new(60.0, 80.0)).with_grid("B12"))
            .unwrap();
        register
            .add(TreasureMap::at(Point::new(6.0, 8.0)).with_quality(42.0))
            .unwrap();
        register
            .add(TreasureMap::at(Point::new(30.0, 40.0)).with_notes("near the lake"))
            .unwrap();
        register.set_current_position(Point::new(0.0, 0.0)).unwrap();
        register.set_server(Server::Exodus).unwrap();
        assert_eq!(distances(&register), vec![10.0, 50.0, 100.0]);
    }

    let register = TreasureRegister::open(JsonFileStore::open(&path).unwrap());
    assert_eq!(register.server(), Server::Exodus);
    assert_eq!(register.current_position(), Some(Point::new(0.0, 0.0)));
    assert_eq!(
        positions(&register),
        vec![
            Point::new(6.0, 8.0),
            Point::new(30.0, 40.0),
            Point::new(60.0, 80.0)
        ]
    );
    assert_eq!(register.maps()[0].quality, Some(42.0));
    assert_eq!(register.maps()[1].notes.as_deref(), Some("near the lake"));
    assert_eq!(register.maps()[2].grid.as_deref(), Some("B12"));
    assert_eq!(
        register.map_link(1).as_deref(),
        Some("https://exodus.yaga.host/#30,40")
    );
}

#[test]
fn test_reopening_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");

    let mut register = TreasureRegister::open(JsonFileStore::open(&path).unwrap());
    register.set_current_position(Point::new(5.0, 5.0)).unwrap();
    register.add(TreasureMap::at(Point::new(9.0, 8.0))).unwrap();
    register.add(TreasureMap::at(Point::new(5.0, 6.0))).unwrap();
    let first = fs::read_to_string(&path).unwrap();

    let reopened = TreasureRegister::open(JsonFileStore::open(&path).unwrap());
    assert_eq!(reopened.maps(), register.maps());
    assert_eq!(fs::read_to_string(&path).unwrap(), first);
}

#[test]
fn test_claim_then_replace_walks_the_trail() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");
    let mut register = TreasureRegister::open(JsonFileStore::open(&path).unwrap());

    register.set_current_position(Point::new(0.0, 0.0)).unwrap();
    register.add(TreasureMap::at(Point::new(0.0, 10.0))).unwrap();
    register.add(TreasureMap::at(Point::new(0.0, 30.0))).unwrap();

    let claimed = register.claim(0).unwrap();
    assert_eq!(claimed.position, Point::new(0.0, 10.0));
    assert_eq!(register.current_position(), Some(Point::new(0.0, 10.0)));
    assert_eq!(distances(&register), vec![20.0]);

    register
        .replace(0, TreasureMap::at(Point::new(0.0, 40.0)).with_grid("C3"))
        .unwrap();
    assert_eq!(register.current_position(), Some(Point::new(0.0, 30.0)));
    assert_eq!(positions(&register), vec![Point::new(0.0, 40.0)]);
    assert_eq!(distances(&register), vec![10.0]);

    let reopened = TreasureRegister::open(JsonFileStore::open(&path).unwrap());
    assert_eq!(reopened.current_position(), Some(Point::new(0.0, 30.0)));
    assert_eq!(reopened.maps()[0].grid.as_deref(), Some("C3"));
}

#[test]
fn test_out_of_range_leaves_store_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");
    let mut register = TreasureRegister::open(JsonFileStore::open(&path).unwrap());
    register.add(TreasureMap::at(Point::new(1.0, 1.0))).unwrap();
    let before = fs::read_to_string(&path).unwrap();

    assert!(matches!(
        register.claim(3),
        Err(RegisterError::IndexOutOfRange { index: 3, len: 1 })
    ));
    assert!(matches!(
        register.delete(1),
        Err(RegisterError::IndexOutOfRange { .. })
    ));
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_malformed_entries_fall_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");
    let mut store = JsonFileStore::open(&path).unwrap();
    store
        .set(StorageKey::TreasureMaps.as_str(), "[{\"broken\"".to_string())
        .unwrap();
    store
        .set(StorageKey::Server.as_str(), "\"ATLANTIS\"".to_string())
        .unwrap();
    store
        .set(StorageKey::CurrentPosition.as_str(), "[3,4]".to_string())
        .unwrap();

    let register = TreasureRegister::open(JsonFileStore::open(&path).unwrap());
    assert!(register.is_empty());
    assert_eq!(register.server(), Server::Xanadu);
    assert_eq!(register.current_position(), Some(Point::new(3.0, 4.0)));
}
