// mapty-tui/src/app/viewport.rs
use mapty_lib::map::degrees_per_view;
use mapty_lib::Coords;
use ratatui::layout::Rect;

/// Map tiles shown across the pane at any zoom level.
const TILES_ACROSS: f64 = 3.0;

/// The lat/lng window drawn into a terminal area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl Viewport {
    pub fn new(center: Coords, zoom: u8, area: Rect) -> Self {
        let lng_span = (degrees_per_view(zoom) * TILES_ACROSS).min(360.0);
        // Terminal cells are roughly twice as tall as they are wide
        let aspect = if area.width == 0 {
            1.0
        } else {
            f64::from(area.height) * 2.0 / f64::from(area.width)
        };
        let lat_span = (lng_span * aspect).min(180.0);
        Self {
            x_bounds: [center.lng - lng_span / 2.0, center.lng + lng_span / 2.0],
            y_bounds: [center.lat - lat_span / 2.0, center.lat + lat_span / 2.0],
        }
    }

    pub fn lng_span(&self) -> f64 {
        self.x_bounds[1] - self.x_bounds[0]
    }

    pub fn lat_span(&self) -> f64 {
        self.y_bounds[1] - self.y_bounds[0]
    }

    pub fn contains(&self, point: Coords) -> bool {
        (self.x_bounds[0]..=self.x_bounds[1]).contains(&point.lng)
            && (self.y_bounds[0]..=self.y_bounds[1]).contains(&point.lat)
    }

    /// Coordinates under the middle of cell (`column`, `row`), or `None`
    /// when the cell is outside `area`. Results are clamped to valid ranges.
    pub fn coords_at(&self, area: Rect, column: u16, row: u16) -> Option<Coords> {
        let inside = column >= area.x
            && row >= area.y
            && column < area.x.saturating_add(area.width)
            && row < area.y.saturating_add(area.height);
        if !inside {
            return None;
        }
        let fx = (f64::from(column - area.x) + 0.5) / f64::from(area.width);
        let fy = (f64::from(row - area.y) + 0.5) / f64::from(area.height);
        Some(clamp_coords(Coords::new(
            self.y_bounds[1] - fy * self.lat_span(),
            self.x_bounds[0] + fx * self.lng_span(),
        )))
    }
}

/// Clamps latitude and wraps longitude into [-180, 180).
pub fn clamp_coords(coords: Coords) -> Coords {
    Coords::new(
        coords.lat.clamp(-90.0, 90.0),
        (coords.lng + 180.0).rem_euclid(360.0) - 180.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_is_centered() {
        let center = Coords::new(10.0, 20.0);
        let viewport = Viewport::new(center, 10, Rect::new(0, 0, 100, 50));
        assert!((viewport.lng_span() - 360.0 / 1024.0 * 3.0).abs() < 1e-12);
        assert!((viewport.lat_span() - viewport.lng_span()).abs() < 1e-12);
        assert!(viewport.contains(center));
    }

    #[test]
    fn test_coords_at_maps_cells() {
        let area = Rect::new(10, 5, 4, 2);
        let viewport = Viewport {
            x_bounds: [0.0, 4.0],
            y_bounds: [0.0, 2.0],
        };
        assert_eq!(viewport.coords_at(area, 10, 5), Some(Coords::new(1.5, 0.5)));
        assert_eq!(viewport.coords_at(area, 13, 6), Some(Coords::new(0.5, 3.5)));
        assert_eq!(viewport.coords_at(area, 14, 6), None);
        assert_eq!(viewport.coords_at(area, 9, 5), None);
    }

    #[test]
    fn test_clamp_coords() {
        assert_eq!(clamp_coords(Coords::new(95.0, 190.0)), Coords::new(90.0, -170.0));
        assert_eq!(clamp_coords(Coords::new(-10.0, -181.0)), Coords::new(-10.0, 179.0));
    }
}
