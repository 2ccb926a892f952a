// mapty-tui/src/ui/map_pane.rs
use mapty_lib::{Coords, Mode};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Map, MapResolution, Points},
        Block, Borders, Paragraph, Wrap,
    },
    Frame,
};

use crate::app::{App, Focus};
use crate::ui::tui_color;

struct MarkerSprite {
    coords: Coords,
    label: Option<String>,
    color: Color,
}

pub fn render_map(f: &mut Frame, app: &mut App, area: Rect) {
    let border_style = if app.focus == Focus::Map && !app.form_open() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(map_title(app))
        .border_style(border_style);
    let inner = block.inner(area);
    app.map_area = Some(inner);

    let (Some(map), Some(viewport)) = (app.service.app.map(), app.viewport()) else {
        render_map_unavailable(f, block, area);
        return;
    };

    let theme = &app.service.config.theme;
    let sprites: Vec<MarkerSprite> = app
        .service
        .app
        .workouts()
        .filter_map(|workout| {
            let marker = map.marker(app.service.app.marker_of(workout.id())?)?;
            Some(MarkerSprite {
                coords: marker.coords,
                label: marker.popup_open.then(|| marker.popup.content.clone()),
                color: tui_color(theme.color_for(workout.workout_type())),
            })
        })
        .collect();
    let pending = app.service.app.form().pending();
    let cursor = app.cursor;

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds(viewport.x_bounds)
        .y_bounds(viewport.y_bounds)
        .paint(move |ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            ctx.layer();
            for sprite in &sprites {
                ctx.draw(&Points {
                    coords: &[(sprite.coords.lng, sprite.coords.lat)],
                    color: sprite.color,
                });
            }
            for sprite in &sprites {
                if let Some(label) = &sprite.label {
                    ctx.print(
                        sprite.coords.lng,
                        sprite.coords.lat,
                        Span::styled(format!("▌{label}"), Style::default().fg(sprite.color)),
                    );
                }
            }
            if let Some(at) = pending {
                ctx.print(
                    at.lng,
                    at.lat,
                    Span::styled("◉", Style::default().fg(Color::LightRed)),
                );
            }
            ctx.print(
                cursor.lng,
                cursor.lat,
                Span::styled(
                    "+",
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            );
        });
    f.render_widget(canvas, area);
}

fn map_title(app: &App) -> String {
    let zoom = app
        .service
        .app
        .map()
        .and_then(|m| m.view())
        .map(|v| format!(" z{}", v.zoom))
        .unwrap_or_default();
    let hint = match app.service.app.mode() {
        Mode::Creating { .. } => " (click to move the pin)",
        Mode::Editing { .. } => " (editing)",
        Mode::Idle => "",
    };
    format!("Map {}{zoom}{hint}", app.cursor)
}

fn render_map_unavailable(f: &mut Frame, block: Block, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from("Could not get your position, so the map is not loaded."),
        Line::from(""),
        Line::from("Set one with `mapty set-location <lat> <lng>` and restart."),
        Line::from("Your workouts can still be listed, edited and deleted."),
    ];
    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(paragraph, area);
}
