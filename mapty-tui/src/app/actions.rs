// mapty-tui/src/app/actions.rs
use mapty_lib::{Coords, MapView};
use tracing::debug;

use super::navigation_helpers::{list_next, list_previous};
use super::state::{ActiveModal, App, ConfirmAction, Focus, LIST_ENTRY_HEIGHT};
use super::viewport::clamp_coords;

// Cursor moves this fraction of the visible span per key press
const CURSOR_STEP: f64 = 0.05;

impl App {
    /// Forwards a map click. Ignored when no map is loaded.
    pub(crate) fn click_map_at(&mut self, at: Coords) {
        if self.service.app.is_degraded() {
            return;
        }
        self.cursor = at;
        self.service.app.handle_map_click(at);
    }

    pub(crate) fn click_map_at_cursor(&mut self) {
        self.click_map_at(self.cursor);
    }

    /// Moves the crosshair by whole steps, panning once it leaves the view.
    pub(crate) fn move_cursor(&mut self, east: f64, north: f64) {
        let Some(viewport) = self.viewport() else {
            return;
        };
        let next = clamp_coords(Coords::new(
            self.cursor.lat + north * viewport.lat_span() * CURSOR_STEP,
            self.cursor.lng + east * viewport.lng_span() * CURSOR_STEP,
        ));
        self.cursor = next;
        if !viewport.contains(next) {
            if let Some(map) = self.service.app.map_mut() {
                let zoom = map.view().map_or(self.service.config.map.zoom, |v| v.zoom);
                map.pan_to(next, zoom, false);
            }
        }
    }

    pub(crate) fn zoom_in(&mut self) {
        if let Some(map) = self.service.app.map_mut() {
            map.zoom_in();
        }
    }

    pub(crate) fn zoom_out(&mut self) {
        if let Some(map) = self.service.app.map_mut() {
            map.zoom_out();
        }
    }

    pub(crate) fn select_next(&mut self) {
        let len = self.service.app.list().len();
        list_next(&mut self.list_state, len);
    }

    pub(crate) fn select_previous(&mut self) {
        let len = self.service.app.list().len();
        list_previous(&mut self.list_state, len);
    }

    /// Pans the map to the selected workout and moves the crosshair there.
    pub(crate) fn activate_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if self.service.app.activate_entry(&id) {
            if let Some(view) = self.service.app.map().and_then(|m| m.view()) {
                self.cursor = view.center;
            }
        }
    }

    pub(crate) fn edit_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if !self.service.app.begin_edit(&id) {
            self.set_error("Close the open form before editing another workout");
        }
    }

    pub(crate) fn open_delete_confirmation(&mut self) {
        if let Some(id) = self.selected_id() {
            self.active_modal = ActiveModal::Confirm(ConfirmAction::Delete(id));
        }
    }

    pub(crate) fn open_delete_all_confirmation(&mut self) {
        if !self.service.app.list().is_empty() {
            self.active_modal = ActiveModal::Confirm(ConfirmAction::DeleteAll);
        }
    }

    pub(crate) fn open_reset_confirmation(&mut self) {
        self.active_modal = ActiveModal::Confirm(ConfirmAction::Reset);
    }

    pub(crate) fn confirm(&mut self, action: ConfirmAction) {
        self.active_modal = ActiveModal::None;
        match action {
            ConfirmAction::Delete(id) => {
                if self.service.app.delete(&id) {
                    self.set_info(format!("Deleted workout {id}"));
                }
            }
            ConfirmAction::DeleteAll => {
                self.service.app.delete_all();
                self.set_info("All workouts deleted");
            }
            ConfirmAction::Reset => {
                self.service.app.reset();
                self.set_info("Saved workouts reset");
            }
        }
    }

    /// Submits the open form and selects the saved entry. Validation errors
    /// arrive as notices on the next refresh.
    pub(crate) fn submit_form(&mut self) {
        match self.service.app.submit() {
            Ok(Some(id)) => {
                let position = self.service.app.list().position(&id);
                self.list_state.select(position);
            }
            Ok(None) => {}
            Err(e) => debug!(error = %e, "Form submit rejected"),
        }
    }

    /// Coordinates under a terminal cell of the map pane.
    pub(crate) fn map_coords_at(&self, column: u16, row: u16) -> Option<Coords> {
        let area = self.map_area?;
        self.viewport()?.coords_at(area, column, row)
    }

    /// Index of the list entry under a terminal cell.
    pub(crate) fn list_index_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.list_area?;
        let inside = column >= area.x
            && row >= area.y
            && column < area.x.saturating_add(area.width)
            && row < area.y.saturating_add(area.height);
        if !inside {
            return None;
        }
        let index = self.list_state.offset() + usize::from((row - area.y) / LIST_ENTRY_HEIGHT);
        (index < self.service.app.list().len()).then_some(index)
    }

    pub(crate) fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Map => Focus::List,
            Focus::List if self.service.app.is_degraded() => Focus::List,
            Focus::List => Focus::Map,
        };
    }
}
