pub mod bridges;
pub mod config;
pub mod domain;
pub mod geometry;
pub mod highways;
pub mod map;
pub mod storage;
pub mod treasures;
pub mod tunnels;
pub mod web;

pub use config::Config;
pub use domain::{ItemCode, Line, MaterialAmounts, Point, Server};
pub use treasures::{TreasureMap, TreasureRegister};
