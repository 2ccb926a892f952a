// src/map.rs
use std::collections::BTreeMap;
use tracing::debug;

use crate::workout::{Coords, WorkoutType};

pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 19;

/// Degrees of longitude covered by one 256px tile at `zoom`.
#[must_use]
pub fn degrees_per_view(zoom: u8) -> f64 {
    360.0 / 2f64.powi(i32::from(zoom.clamp(MIN_ZOOM, MAX_ZOOM)))
}

/// Largest zoom level whose view still covers `span` degrees.
#[must_use]
pub fn zoom_for_span(span: f64) -> u8 {
    if !span.is_finite() || span <= 0.0 {
        return MAX_ZOOM;
    }
    let zoom = (360.0 / span).log2().floor();
    if zoom < f64::from(MIN_ZOOM) {
        MIN_ZOOM
    } else if zoom > f64::from(MAX_ZOOM) {
        MAX_ZOOM
    } else {
        zoom as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(u64);

impl MarkerId {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Popup attached to a marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub content: String,
    pub class_name: String,
    pub max_width: u16,
    pub min_width: u16,
    pub auto_close: bool,
    pub close_on_click: bool,
}

impl Popup {
    /// Workout popups stay open and use a `<type>-popup` style class.
    #[must_use]
    pub fn for_workout(workout_type: WorkoutType, content: String) -> Self {
        Self {
            content,
            class_name: format!("{workout_type}-popup"),
            max_width: 250,
            min_width: 200,
            auto_close: false,
            close_on_click: false,
        }
    }
}

/// Smallest box enclosing a set of coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: Coords,
    pub north_east: Coords,
}

impl Bounds {
    /// Returns `None` for an empty iterator.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coords>,
    {
        points.into_iter().fold(None, |acc: Option<Self>, p| {
            Some(match acc {
                None => Self {
                    south_west: p,
                    north_east: p,
                },
                Some(b) => Self {
                    south_west: Coords::new(b.south_west.lat.min(p.lat), b.south_west.lng.min(p.lng)),
                    north_east: Coords::new(b.north_east.lat.max(p.lat), b.north_east.lng.max(p.lng)),
                },
            })
        })
    }

    #[must_use]
    pub fn center(&self) -> Coords {
        Coords::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    #[must_use]
    pub fn lat_span(&self) -> f64 {
        self.north_east.lat - self.south_west.lat
    }

    #[must_use]
    pub fn lng_span(&self) -> f64 {
        self.north_east.lng - self.south_west.lng
    }

    #[must_use]
    pub fn contains(&self, point: Coords) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&point.lng)
    }
}

/// Boundary to the interactive map widget.
///
/// Clicks travel the other way: the front end turns a click on the map
/// surface into `Coords` and hands them to `App::handle_map_click`.
pub trait MapView {
    fn set_view(&mut self, center: Coords, zoom: u8);
    /// Places a marker and opens its popup immediately.
    fn add_marker(&mut self, at: Coords, popup: Popup) -> MarkerId;
    fn remove_marker(&mut self, marker: MarkerId);
    fn pan_to(&mut self, center: Coords, zoom: u8, animate: bool);
    /// `padding` is the fraction of the span added on each side.
    fn fit_bounds(&mut self, bounds: Bounds, padding: f64);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub coords: Coords,
    pub popup: Popup,
    pub popup_open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub center: Coords,
    pub zoom: u8,
    /// Whether the last move was requested as an animated pan.
    pub animated: bool,
}

/// Headless map: keeps the view and the markers so a front end can draw them.
#[derive(Debug, Default)]
pub struct MarkerMap {
    view: Option<ViewState>,
    markers: BTreeMap<MarkerId, Marker>,
    next_id: u64,
}

impl MarkerMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn view(&self) -> Option<ViewState> {
        self.view
    }

    #[must_use]
    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.get(&id)
    }

    pub fn markers(&self) -> impl Iterator<Item = (MarkerId, &Marker)> {
        self.markers.iter().map(|(id, m)| (*id, m))
    }

    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Changes the zoom around the current center. No-op before `set_view`.
    pub fn set_zoom(&mut self, zoom: u8) {
        if let Some(view) = self.view.as_mut() {
            view.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
            view.animated = false;
        }
    }

    pub fn zoom_in(&mut self) {
        if let Some(view) = self.view {
            self.set_zoom(view.zoom.saturating_add(1));
        }
    }

    pub fn zoom_out(&mut self) {
        if let Some(view) = self.view {
            self.set_zoom(view.zoom.saturating_sub(1));
        }
    }
}

impl MapView for MarkerMap {
    fn set_view(&mut self, center: Coords, zoom: u8) {
        debug!(%center, zoom, "Map view set");
        self.view = Some(ViewState {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            animated: false,
        });
    }

    fn add_marker(&mut self, at: Coords, popup: Popup) -> MarkerId {
        self.next_id += 1;
        let id = MarkerId(self.next_id);
        self.markers.insert(
            id,
            Marker {
                coords: at,
                popup,
                popup_open: true,
            },
        );
        id
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        self.markers.remove(&marker);
    }

    fn pan_to(&mut self, center: Coords, zoom: u8, animate: bool) {
        debug!(%center, zoom, animate, "Map pan");
        self.view = Some(ViewState {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            animated: animate,
        });
    }

    fn fit_bounds(&mut self, bounds: Bounds, padding: f64) {
        let span = bounds.lat_span().max(bounds.lng_span()) * (1.0 + 2.0 * padding.max(0.0));
        let zoom = zoom_for_span(span);
        debug!(center = %bounds.center(), zoom, "Map fit to bounds");
        self.view = Some(ViewState {
            center: bounds.center(),
            zoom,
            animated: false,
        });
    }
}
