// mapty-tui/src/ui/sidebar.rs
use crate::app::{App, Focus};
use crate::ui::tui_color;
use mapty_lib::{FormField, Mode, WorkoutEntry};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

const LABEL_WIDTH: u16 = 11;

pub fn render_sidebar(f: &mut Frame, app: &mut App, area: Rect) {
    let form_height = if app.service.app.form().is_displayed() {
        6
    } else {
        0
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(form_height), Constraint::Min(0)])
        .split(area);

    if form_height > 0 {
        render_form(f, app, chunks[0]);
    }
    render_workout_list(f, app, chunks[1]);
}

fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let title = match app.service.app.mode() {
        Mode::Editing { id } => format!("Edit workout {id}"),
        _ => "New workout".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let form = app.service.app.form();
    let fields = form.visible_fields();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(1); 4])
        .split(inner);

    for (field, row) in fields.iter().zip(rows.iter()) {
        let focused = form.focused() == *field;
        let value_style = if focused {
            Style::default().reversed()
        } else {
            Style::default()
        };
        let label = Span::styled(
            format!("{:<width$}", field.label(), width = usize::from(LABEL_WIDTH)),
            Style::default().fg(Color::LightBlue),
        );
        let value = match field {
            FormField::Type => {
                let workout_type = form.workout_type();
                let text = if form.is_type_locked() {
                    format!(" {} ", workout_type.label())
                } else {
                    format!("< {} >", workout_type.label())
                };
                Span::styled(
                    text,
                    value_style.fg(tui_color(app.service.config.theme.color_for(workout_type))),
                )
            }
            _ => {
                let input = form.value(*field);
                if input.is_empty() {
                    Span::styled(field.placeholder(), value_style.fg(Color::DarkGray))
                } else {
                    Span::styled(input.to_string(), value_style)
                }
            }
        };
        f.render_widget(Paragraph::new(Line::from(vec![label, value])), *row);

        if focused && *field != FormField::Type {
            let typed = u16::try_from(form.value(*field).chars().count()).unwrap_or(u16::MAX);
            let x = row
                .x
                .saturating_add(LABEL_WIDTH)
                .saturating_add(typed)
                .min(row.right().saturating_sub(1));
            f.set_cursor(x, row.y);
        }
    }
}

fn entry_item<'a>(entry: &'a WorkoutEntry, color: Color) -> ListItem<'a> {
    let title = Line::from(vec![
        Span::styled(
            format!("{} ", entry.workout_type.icon()),
            Style::default().fg(color),
        ),
        Span::styled(
            entry.title.as_str(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ]);
    let details: Vec<Span> = entry
        .details
        .iter()
        .flat_map(|d| {
            [
                Span::raw(format!("  {} ", d.icon)),
                Span::raw(d.value.as_str()),
                Span::styled(format!(" {}", d.unit), Style::default().fg(Color::DarkGray)),
            ]
        })
        .collect();
    ListItem::new(vec![title, Line::from(details)])
}

fn render_workout_list(f: &mut Frame, app: &mut App, area: Rect) {
    let focused = app.focus == Focus::List && !app.form_open();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Workouts ({})", app.service.app.list().len()))
        .border_style(if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        });
    app.list_area = Some(block.inner(area));

    let theme = &app.service.config.theme;
    let entries = app.service.app.list().entries();
    if entries.is_empty() {
        let hint = if app.service.app.is_degraded() {
            "No workouts yet."
        } else {
            "No workouts yet. Click the map to log one."
        };
        let paragraph = Paragraph::new(hint)
            .block(block)
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| entry_item(entry, tui_color(theme.color_for(entry.workout_type))))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, &mut app.list_state);
}
