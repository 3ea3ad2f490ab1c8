//! Pan and zoom arithmetic for the treasure map overlay.
//!
//! Map coordinates are tiles; the view draws the server map into a square of
//! `display_size` pixels, scaled by `zoom` and shifted by `offset`.

use serde::Serialize;

use crate::domain::{Point, Server};
use crate::storage::KeyValueStore;
use crate::treasures::TreasureRegister;

pub const DEFAULT_DISPLAY_SIZE: [f64; 2] = [600.0, 600.0];
pub const FULL_SCREEN_PADDING: f64 = 100.0;
pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 30.0;
const WHEEL_ZOOM_FACTOR: f64 = 0.01;

pub const POSITION_COLOR: &str = "#E53E3E";
pub const TREASURE_COLOR: &str = "#3182CE";
pub const TARGET_COLOR: &str = "#319795";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    pub display_size: [f64; 2],
    pub map_size: [f64; 2],
    pub zoom: f64,
    pub offset: [f64; 2],
    pub full_screen: bool,
}

impl MapView {
    pub fn new(map_size: [f64; 2]) -> Self {
        Self {
            display_size: DEFAULT_DISPLAY_SIZE,
            map_size,
            zoom: MIN_ZOOM,
            offset: [0.0, 0.0],
            full_screen: false,
        }
    }

    pub fn for_server(server: Server) -> Self {
        Self::new(server.map_data().map_size)
    }

    /// Switching servers swaps the map and resets the view.
    pub fn set_server(&mut self, server: Server) {
        self.map_size = server.map_data().map_size;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.zoom = MIN_ZOOM;
        self.offset = [0.0, 0.0];
    }

    /// Tile coordinate to display pixel.
    pub fn transform_position(&self, point: Point) -> [f64; 2] {
        let [display_w, display_h] = self.display_size;
        let [map_w, map_h] = self.map_size;
        [
            (point.x * display_w / map_w) * self.zoom + self.offset[0],
            (point.y * display_h / map_h) * self.zoom + self.offset[1],
        ]
    }

    /// Keeps the zoomed image covering the whole display.
    pub fn clamp_offset(&self, [ox, oy]: [f64; 2], zoom: f64) -> [f64; 2] {
        let [display_w, display_h] = self.display_size;
        let content_w = (display_w * zoom).max(display_w);
        let content_h = (display_h * zoom).max(display_h);
        let min_x = (display_w - content_w).min(0.0);
        let min_y = (display_h - content_h).min(0.0);
        [ox.min(0.0).max(min_x), oy.min(0.0).max(min_y)]
    }

    /// Wheel zoom around the cursor: the map point under `mouse` stays put.
    /// Returns false when the zoom is already at its limit.
    pub fn zoom_at(&mut self, mouse: [f64; 2], delta_y: f64) -> bool {
        let new_zoom = (self.zoom - delta_y * WHEEL_ZOOM_FACTOR).clamp(MIN_ZOOM, MAX_ZOOM);
        if new_zoom == self.zoom {
            return false;
        }
        let in_map_x = (mouse[0] - self.offset[0]) / self.zoom;
        let in_map_y = (mouse[1] - self.offset[1]) / self.zoom;
        let offset = [mouse[0] - in_map_x * new_zoom, mouse[1] - in_map_y * new_zoom];
        self.zoom = new_zoom;
        self.offset = self.clamp_offset(offset, new_zoom);
        true
    }

    pub fn drag(&mut self, dx: f64, dy: f64) {
        let offset = [self.offset[0] + dx, self.offset[1] + dy];
        self.offset = self.clamp_offset(offset, self.zoom);
    }

    /// Fits a square view into the available window area.
    pub fn resize(&mut self, available_w: f64, available_h: f64) {
        let side = (available_w - FULL_SCREEN_PADDING).min(available_h - FULL_SCREEN_PADDING);
        self.display_size = [side, side];
        self.offset = self.clamp_offset(self.offset, self.zoom);
    }

    pub fn expand(&mut self, window_w: f64, window_h: f64) {
        self.full_screen = true;
        self.resize(window_w, window_h);
        self.reset();
    }

    pub fn collapse(&mut self) {
        self.full_screen = false;
        self.display_size = DEFAULT_DISPLAY_SIZE;
        self.reset();
    }

    pub fn overlay_markers<S: KeyValueStore>(
        &self,
        register: &TreasureRegister<S>,
        hovered: Option<usize>,
        target: Option<usize>,
    ) -> Vec<OverlayMarker> {
        let mut markers = Vec::with_capacity(register.len() + 1);
        if let Some(position) = register.current_position() {
            markers.push(OverlayMarker {
                position: self.transform_position(position),
                label: position.to_string(),
                color: POSITION_COLOR,
                opacity: 1.0,
                index: None,
            });
        }
        for (index, map) in register.maps().iter().enumerate() {
            markers.push(OverlayMarker {
                position: self.transform_position(map.position),
                label: map.position.to_string(),
                color: if target == Some(index) {
                    TARGET_COLOR
                } else {
                    TREASURE_COLOR
                },
                opacity: if hovered == Some(index) { 0.5 } else { 1.0 },
                index: Some(index),
            });
        }
        markers
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayMarker {
    pub position: [f64; 2],
    pub label: String,
    pub color: &'static str,
    pub opacity: f64,
    /// Register index, `None` for the current-position marker.
    pub index: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::treasures::TreasureMap;

    #[test]
    fn positions_scale_to_display() {
        let view = MapView::new([2048.0, 2048.0]);
        assert_eq!(view.transform_position(Point::new(1024.0, 512.0)), [300.0, 150.0]);
    }

    #[test]
    fn zoom_keeps_cursor_point_fixed() {
        let mut view = MapView::new([2048.0, 2048.0]);
        assert!(view.zoom_at([300.0, 300.0], -100.0));
        assert_eq!(view.zoom, 2.0);
        assert_eq!(view.offset, [-300.0, -300.0]);
        assert_eq!(view.transform_position(Point::new(1024.0, 1024.0)), [300.0, 300.0]);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut view = MapView::new([2048.0, 2048.0]);
        assert!(!view.zoom_at([0.0, 0.0], 500.0));
        assert_eq!(view.zoom, MIN_ZOOM);
        assert!(view.zoom_at([0.0, 0.0], -10_000.0));
        assert_eq!(view.zoom, MAX_ZOOM);
    }

    #[test]
    fn drag_cannot_expose_outside_map() {
        let mut view = MapView::new([2048.0, 2048.0]);
        view.drag(50.0, -50.0);
        assert_eq!(view.offset, [0.0, 0.0]);

        view.zoom_at([0.0, 0.0], -100.0);
        view.drag(-1000.0, -250.0);
        assert_eq!(view.offset, [-600.0, -250.0]);
    }

    #[test]
    fn expand_and_collapse_reset_view() {
        let mut view = MapView::new([4096.0, 4096.0]);
        view.zoom_at([100.0, 100.0], -300.0);
        view.expand(1400.0, 900.0);
        assert!(view.full_screen);
        assert_eq!(view.display_size, [800.0, 800.0]);
        assert_eq!(view.zoom, MIN_ZOOM);
        view.collapse();
        assert_eq!(view.display_size, DEFAULT_DISPLAY_SIZE);
        assert_eq!(view.offset, [0.0, 0.0]);
    }

    #[test]
    fn markers_follow_register() {
        let mut register = TreasureRegister::open(MemoryStore::new());
        register.set_current_position(Point::new(0.0, 0.0)).unwrap();
        register.add(TreasureMap::at(Point::new(2048.0, 0.0))).unwrap();
        register.add(TreasureMap::at(Point::new(1024.0, 0.0))).unwrap();

        let view = MapView::for_server(Server::Exodus);
        let markers = view.overlay_markers(&register, Some(1), Some(0));
        assert_eq!(markers.len(), 3);
        assert_eq!(markers[0].color, POSITION_COLOR);
        assert_eq!(markers[1].position, [300.0, 0.0]);
        assert_eq!(markers[1].color, TARGET_COLOR);
        assert_eq!(markers[2].opacity, 0.5);
        assert_eq!(markers[2].label, "(2048, 0)");
    }
}
