// mapty-tui/src/app/input.rs
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use mapty_lib::FormField;

use super::state::{ActiveModal, App, Focus};

impl App {
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }
        // Handle based on active modal first
        if self.active_modal != ActiveModal::None {
            self.handle_modal_input(key);
            return Ok(());
        }
        if self.form_open() {
            self.handle_form_input(key);
            return Ok(());
        }

        // Global keys
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.active_modal = ActiveModal::Help,
            KeyCode::Tab | KeyCode::BackTab => self.toggle_focus(),
            KeyCode::Char('D') => self.open_delete_all_confirmation(),
            KeyCode::Char('R') => self.open_reset_confirmation(),
            _ => match self.focus {
                Focus::Map => self.handle_map_input(key),
                Focus::List => self.handle_list_input(key),
            },
        }
        Ok(())
    }

    fn handle_modal_input(&mut self, key: KeyEvent) {
        match &self.active_modal {
            ActiveModal::Help => match key.code {
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter | KeyCode::Char('?') => {
                    self.active_modal = ActiveModal::None;
                }
                _ => {}
            },
            ActiveModal::Confirm(action) => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    let action = action.clone();
                    self.confirm(action);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.active_modal = ActiveModal::None;
                }
                _ => {}
            },
            ActiveModal::None => {}
        }
    }

    fn handle_form_input(&mut self, key: KeyEvent) {
        let on_type = self.service.app.form().focused() == FormField::Type;
        match key.code {
            KeyCode::Esc => self.service.app.cancel(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Tab | KeyCode::Down => self.service.app.form_mut().focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.service.app.form_mut().focus_previous(),
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') if on_type => {
                self.service.app.toggle_workout_type();
            }
            KeyCode::Backspace => self.service.app.form_mut().backspace(),
            KeyCode::Char(c) => self.service.app.form_mut().push_char(c),
            _ => {}
        }
    }

    fn handle_map_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => self.move_cursor(-1.0, 0.0),
            KeyCode::Char('l') | KeyCode::Right => self.move_cursor(1.0, 0.0),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(0.0, 1.0),
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(0.0, -1.0),
            KeyCode::Enter | KeyCode::Char(' ') => self.click_map_at_cursor(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom_in(),
            KeyCode::Char('-') => self.zoom_out(),
            _ => {}
        }
    }

    fn handle_list_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('k') | KeyCode::Up => self.select_previous(),
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Enter => self.activate_selected(),
            KeyCode::Char('e') => self.edit_selected(),
            KeyCode::Char('d') | KeyCode::Delete => self.open_delete_confirmation(),
            _ => {}
        }
    }

    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<()> {
        if self.active_modal != ActiveModal::None {
            return Ok(());
        }
        let over_map = self.map_coords_at(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(at) = over_map {
                    self.focus = Focus::Map;
                    self.click_map_at(at);
                } else if let Some(index) = self.list_index_at(mouse.column, mouse.row) {
                    self.focus = Focus::List;
                    self.list_state.select(Some(index));
                    self.activate_selected();
                }
            }
            MouseEventKind::ScrollUp if over_map.is_some() => self.zoom_in(),
            MouseEventKind::ScrollDown if over_map.is_some() => self.zoom_out(),
            _ => {}
        }
        Ok(())
    }
}
