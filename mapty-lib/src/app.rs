// src/app.rs
use chrono::Utc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::form::{ValidationError, WorkoutForm};
use crate::geolocation::Geolocator;
use crate::list::WorkoutListView;
use crate::map::{Bounds, MapView, MarkerId};
use crate::notify::{Notice, Notifier};
use crate::render::{popup_for, render_entry};
use crate::storage::{KeyValueStore, WorkoutStorage};
use crate::workout::{Coords, Workout, WorkoutId, WorkoutType};

/// Where the controller is in the create/edit cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Idle,
    Creating { at: Coords },
    Editing { id: WorkoutId },
}

/// Settings the controller needs from the config file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppSettings {
    pub zoom: u8,
    pub fit_padding: f64,
    pub animate_pan: bool,
    pub form_restore_delay: Duration,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for AppSettings {
    fn from(config: &Config) -> Self {
        Self {
            zoom: config.map.zoom,
            fit_padding: config.map.fit_padding,
            animate_pan: config.map.animate,
            form_restore_delay: config.form.restore_delay(),
        }
    }
}

/// A workout plus the marker currently showing it, if any.
#[derive(Debug)]
struct Logged {
    workout: Workout,
    marker: Option<MarkerId>,
}

/// Owns the workout collection and wires form, map, list and storage together.
///
/// Without a map (geolocation failed) the controller runs in degraded mode:
/// listing, editing and deleting still work, marker operations are skipped.
pub struct App<K, M, L, N>
where
    K: KeyValueStore,
    M: MapView,
    L: WorkoutListView,
    N: Notifier,
{
    workouts: Vec<Logged>,
    storage: WorkoutStorage<K>,
    map: Option<M>,
    list: L,
    notifier: N,
    form: WorkoutForm,
    mode: Mode,
    settings: AppSettings,
}

impl<K, M, L, N> App<K, M, L, N>
where
    K: KeyValueStore,
    M: MapView,
    L: WorkoutListView,
    N: Notifier,
{
    /// Loads persisted workouts and renders them into the list.
    /// A storage failure is reported and the session starts empty.
    pub fn new(storage: WorkoutStorage<K>, list: L, notifier: N, settings: AppSettings) -> Self {
        let mut app = Self {
            workouts: Vec::new(),
            storage,
            map: None,
            list,
            notifier,
            form: WorkoutForm::new(settings.form_restore_delay),
            mode: Mode::Idle,
            settings,
        };
        match app.storage.load() {
            Ok(workouts) => {
                info!(count = workouts.len(), "Restored workouts");
                app.workouts = workouts
                    .into_iter()
                    .map(|workout| Logged {
                        workout,
                        marker: None,
                    })
                    .collect();
            }
            Err(e) => {
                warn!(error = %e, "Could not load stored workouts");
                app.notifier
                    .notify(Notice::warning(format!("Could not load saved workouts: {e}")));
            }
        }
        for logged in &app.workouts {
            app.list.insert_entry(render_entry(&logged.workout));
        }
        app
    }

    /// Asks for the current position once. On success the map is loaded,
    /// otherwise the user is warned and the app stays in degraded mode.
    pub fn start<G: Geolocator>(&mut self, locator: &G, map: M) {
        match locator.current_position() {
            Ok(position) => self.load_map(map, position),
            Err(e) => {
                warn!(error = %e, "Geolocation failed; running without a map");
                self.notifier
                    .notify(Notice::warning(format!("Could not get your position: {e}")));
            }
        }
    }

    /// Centers `map` on `center`, draws a marker per workout and fits the
    /// view to them when there are any.
    pub fn load_map(&mut self, mut map: M, center: Coords) {
        map.set_view(center, self.settings.zoom);
        for logged in &mut self.workouts {
            logged.marker = Some(map.add_marker(logged.workout.coords(), popup_for(&logged.workout)));
        }
        self.map = Some(map);
        self.fit_to_workouts();
        info!(%center, "Map loaded");
    }

    fn fit_to_workouts(&mut self) {
        let Some(map) = self.map.as_mut() else {
            return;
        };
        if let Some(bounds) = Bounds::enclosing(self.workouts.iter().map(|l| l.workout.coords())) {
            map.fit_bounds(bounds, self.settings.fit_padding);
        }
    }

    /// A click on the map surface. Opens the form when idle; while creating
    /// it moves the pending location; while editing it is ignored.
    pub fn handle_map_click(&mut self, at: Coords) {
        match self.mode {
            Mode::Idle => {
                self.form.show(at);
                self.mode = Mode::Creating { at };
            }
            Mode::Creating { .. } => {
                self.form.retarget(at);
                self.mode = Mode::Creating { at };
            }
            Mode::Editing { .. } => debug!(%at, "Map click ignored while editing"),
        }
    }

    /// Switches the form between running and cycling fields.
    pub fn toggle_workout_type(&mut self) {
        self.form.toggle_fields_for_type();
    }

    pub fn set_workout_type(&mut self, workout_type: WorkoutType) {
        self.form.set_type(workout_type);
    }

    /// Opens the form prefilled with the workout `id`. Only valid while idle;
    /// an unknown id is a no-op. Returns true if editing started.
    pub fn begin_edit(&mut self, id: &WorkoutId) -> bool {
        if self.mode != Mode::Idle {
            debug!(%id, "Edit requested while the form is busy");
            return false;
        }
        let Some(index) = self.index_of(id) else {
            debug!(%id, "Edit target not found");
            return false;
        };
        self.form.show_for_edit(&self.workouts[index].workout);
        self.mode = Mode::Editing { id: id.clone() };
        true
    }

    /// Submits the form for the current mode.
    ///
    /// Invalid input is reported to the user and returned; the mode and the
    /// collection are left untouched. Submitting while idle does nothing.
    /// # Errors
    /// Returns the `ValidationError` for the first bad field.
    pub fn submit(&mut self) -> Result<Option<WorkoutId>, ValidationError> {
        let mode = self.mode.clone();
        match mode {
            Mode::Idle => Ok(None),
            Mode::Creating { at } => self.submit_new(at).map(Some),
            Mode::Editing { id } => self.submit_edit(&id).map(|()| Some(id)),
        }
    }

    fn read_form(&mut self) -> Result<crate::workout::WorkoutInput, ValidationError> {
        self.form.read().map_err(|e| {
            debug!(error = %e, "Form rejected");
            self.notifier.notify(Notice::error(e.to_string()));
            e
        })
    }

    fn submit_new(&mut self, at: Coords) -> Result<WorkoutId, ValidationError> {
        let input = self.read_form()?;
        let workout = Workout::new(at, input, Utc::now());
        let id = workout.id().clone();

        let marker = self
            .map
            .as_mut()
            .map(|map| map.add_marker(workout.coords(), popup_for(&workout)));
        self.list.insert_entry(render_entry(&workout));
        info!(%id, kind = %workout.workout_type(), "Workout created");
        self.workouts.push(Logged { workout, marker });

        self.form.hide(Instant::now());
        self.mode = Mode::Idle;
        self.persist();
        Ok(id)
    }

    fn submit_edit(&mut self, id: &WorkoutId) -> Result<(), ValidationError> {
        let input = self.read_form()?;
        match self.index_of(id) {
            Some(index) => {
                self.workouts[index].workout.apply_edit(
                    input.distance_km,
                    input.duration_min,
                    input.type_specific,
                );
                info!(%id, "Workout edited");
                self.persist();
                self.reload_view();
            }
            None => debug!(%id, "Edit target disappeared before submit"),
        }
        self.form.hide(Instant::now());
        self.mode = Mode::Idle;
        Ok(())
    }

    /// Hides the form and returns to idle without changing any workout.
    pub fn cancel(&mut self) {
        if self.mode != Mode::Idle {
            self.form.hide(Instant::now());
            self.mode = Mode::Idle;
        }
    }

    /// Clears and redraws the whole list and every marker from the collection.
    pub fn reload_view(&mut self) {
        self.list.clear();
        if let Some(map) = self.map.as_mut() {
            for logged in &mut self.workouts {
                if let Some(marker) = logged.marker.take() {
                    map.remove_marker(marker);
                }
                logged.marker = Some(map.add_marker(logged.workout.coords(), popup_for(&logged.workout)));
            }
        }
        for logged in &self.workouts {
            self.list.insert_entry(render_entry(&logged.workout));
        }
        self.fit_to_workouts();
    }

    /// Deletes the first workout with `id`. Returns false if it was not found.
    pub fn delete(&mut self, id: &WorkoutId) -> bool {
        let Some(index) = self.index_of(id) else {
            debug!(%id, "Delete target not found");
            return false;
        };
        if matches!(&self.mode, Mode::Editing { id: editing } if editing == id) {
            self.cancel();
        }
        let logged = self.workouts.remove(index);
        if let (Some(map), Some(marker)) = (self.map.as_mut(), logged.marker) {
            map.remove_marker(marker);
        }
        self.list.remove_entry(id);
        info!(%id, "Workout deleted");
        self.persist();
        true
    }

    /// Removes every workout and persists an empty list.
    pub fn delete_all(&mut self) {
        self.clear_everything();
        info!("All workouts deleted");
        self.persist();
    }

    /// Removes every workout and the stored key itself.
    pub fn reset(&mut self) {
        self.clear_everything();
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "Could not remove stored workouts");
            self.notifier
                .notify(Notice::warning(format!("Could not reset saved workouts: {e}")));
        }
        info!("Workouts reset");
    }

    fn clear_everything(&mut self) {
        self.cancel();
        if let Some(map) = self.map.as_mut() {
            for marker in self.workouts.iter().filter_map(|l| l.marker) {
                map.remove_marker(marker);
            }
        }
        self.workouts.clear();
        self.list.clear();
    }

    /// A click on a list entry outside its buttons: count it and pan the map
    /// to the workout. Returns false if `id` is unknown.
    pub fn activate_entry(&mut self, id: &WorkoutId) -> bool {
        let Some(index) = self.index_of(id) else {
            debug!(%id, "Activated entry not found");
            return false;
        };
        let workout = &mut self.workouts[index].workout;
        workout.record_click();
        if let Some(map) = self.map.as_mut() {
            map.pan_to(workout.coords(), self.settings.zoom, self.settings.animate_pan);
        }
        true
    }

    /// Drives time-based UI work. Returns true if anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.form.tick(now)
    }

    fn persist(&mut self) {
        let workouts = self.workouts.iter().map(|l| &l.workout);
        if let Err(e) = self.storage.save(workouts) {
            warn!(error = %e, "Could not save workouts");
            self.notifier.notify(Notice::warning(format!(
                "Could not save workouts: {e}. Changes are kept for this session only."
            )));
        }
    }

    fn index_of(&self, id: &WorkoutId) -> Option<usize> {
        self.workouts.iter().position(|l| l.workout.id() == id)
    }

    /// Workouts in collection (creation) order.
    pub fn workouts(
        &self,
    ) -> impl DoubleEndedIterator<Item = &Workout> + ExactSizeIterator + '_ {
        self.workouts.iter().map(|l| &l.workout)
    }

    #[must_use]
    pub fn workout(&self, id: &WorkoutId) -> Option<&Workout> {
        self.index_of(id).map(|i| &self.workouts[i].workout)
    }

    #[must_use]
    pub fn marker_of(&self, id: &WorkoutId) -> Option<MarkerId> {
        self.index_of(id).and_then(|i| self.workouts[i].marker)
    }

    #[must_use]
    pub const fn mode(&self) -> &Mode {
        &self.mode
    }

    #[must_use]
    pub const fn form(&self) -> &WorkoutForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut WorkoutForm {
        &mut self.form
    }

    #[must_use]
    pub const fn map(&self) -> Option<&M> {
        self.map.as_ref()
    }

    pub fn map_mut(&mut self) -> Option<&mut M> {
        self.map.as_mut()
    }

    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.map.is_none()
    }

    #[must_use]
    pub const fn list(&self) -> &L {
        &self.list
    }

    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    #[must_use]
    pub const fn storage(&self) -> &WorkoutStorage<K> {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut WorkoutStorage<K> {
        &mut self.storage
    }

    #[must_use]
    pub const fn settings(&self) -> &AppSettings {
        &self.settings
    }
}
