// mapty-tui/src/app/state.rs
use mapty_lib::{AppService, Coords, Notice, NoticeLevel, WorkoutId};
use ratatui::{layout::Rect, widgets::ListState};
use std::time::{Duration, Instant};
use tracing::debug;

use super::viewport::Viewport;

const NOTICE_DISPLAY_TIME: Duration = Duration::from_secs(5);

/// Rows used by one entry in the workout list.
pub const LIST_ENTRY_HEIGHT: u16 = 2;

// Which pane receives navigation keys when no form is open
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Map,
    List,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfirmAction {
    Delete(WorkoutId),
    DeleteAll,
    Reset,
}

impl ConfirmAction {
    pub fn prompt(&self) -> String {
        match self {
            Self::Delete(id) => format!("Delete workout {id}?"),
            Self::DeleteAll => "Delete all workouts?".to_string(),
            Self::Reset => "Reset saved workouts? This removes the stored list.".to_string(),
        }
    }
}

// Represents the state of active modals
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActiveModal {
    None,
    Help,
    Confirm(ConfirmAction),
}

pub struct App {
    pub service: AppService,
    pub should_quit: bool,
    pub active_modal: ActiveModal,
    pub focus: Focus,
    /// Crosshair position on the map; keyboard clicks land here.
    pub cursor: Coords,
    pub list_state: ListState,
    // Inner areas from the last draw, for mouse hit testing
    pub map_area: Option<Rect>,
    pub list_area: Option<Rect>,
    pub last_notice: Option<Notice>,
    pub notice_clear_time: Option<Instant>,
}

impl App {
    pub fn new(service: AppService) -> Self {
        let cursor = service
            .app
            .map()
            .and_then(|m| m.view())
            .map_or(Coords::new(0.0, 0.0), |v| v.center);
        let focus = if service.app.is_degraded() {
            Focus::List
        } else {
            Focus::Map
        };
        let mut app = Self {
            service,
            should_quit: false,
            active_modal: ActiveModal::None,
            focus,
            cursor,
            list_state: ListState::default(),
            map_area: None,
            list_area: None,
            last_notice: None,
            notice_clear_time: None,
        };
        if !app.service.app.list().is_empty() {
            app.list_state.select(Some(0));
        }
        app
    }

    /// Per-frame housekeeping: timers, notices and list selection bounds.
    pub fn refresh(&mut self, now: Instant) {
        if self.service.app.tick(now) {
            debug!("Form layout restored");
        }
        let notices = self.service.app.notifier_mut().drain();
        for notice in notices {
            self.show_notice(notice, now);
        }
        self.clear_expired_notice(now);

        let len = self.service.app.list().len();
        match self.list_state.selected() {
            Some(i) if i >= len => self.list_state.select(len.checked_sub(1)),
            None if len > 0 => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    pub fn show_notice(&mut self, notice: Notice, now: Instant) {
        self.last_notice = Some(notice);
        self.notice_clear_time = Some(now + NOTICE_DISPLAY_TIME);
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.show_notice(Notice::error(msg), Instant::now());
    }

    pub fn set_info(&mut self, msg: impl Into<String>) {
        self.show_notice(Notice::info(msg), Instant::now());
    }

    fn clear_expired_notice(&mut self, now: Instant) {
        if let Some(clear_time) = self.notice_clear_time {
            if now >= clear_time {
                self.last_notice = None;
                self.notice_clear_time = None;
            }
        }
    }

    #[must_use]
    pub fn notice_level(&self) -> Option<NoticeLevel> {
        self.last_notice.as_ref().map(|n| n.level)
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<WorkoutId> {
        self.list_state
            .selected()
            .and_then(|i| self.service.app.list().get(i))
            .map(|entry| entry.id.clone())
    }

    /// Geographic window of the map pane, if a map is loaded.
    #[must_use]
    pub fn viewport(&self) -> Option<Viewport> {
        let view = self.service.app.map()?.view()?;
        let area = self.map_area.unwrap_or(Rect::new(0, 0, 80, 24));
        Some(Viewport::new(view.center, view.zoom, area))
    }

    #[must_use]
    pub fn form_open(&self) -> bool {
        *self.service.app.mode() != mapty_lib::Mode::Idle
    }
}
