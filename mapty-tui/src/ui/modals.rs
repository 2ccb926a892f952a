// mapty-tui/src/ui/modals.rs
use crate::{
    app::{ActiveModal, App, ConfirmAction},
    ui::layout::centered_rect,
};
use ratatui::{
    layout::{Alignment, Margin},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn render_modal(f: &mut Frame, app: &App) {
    match &app.active_modal {
        ActiveModal::Help => render_help_modal(f),
        ActiveModal::Confirm(action) => render_confirm_modal(f, action),
        ActiveModal::None => {}
    }
}

fn render_help_modal(f: &mut Frame) {
    let block = Block::default()
        .title("Help (?)")
        .borders(Borders::ALL)
        .title_style(Style::new().bold())
        .border_style(Style::new().yellow());
    let area = centered_rect(60, 70, f.size());
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let help_text = vec![
        Line::from("--- Global ---").style(Style::new().bold().underlined()),
        Line::from(" q / Ctrl-C: Quit Application"),
        Line::from(" ?: Show/Hide This Help"),
        Line::from(" Tab: Switch Focus (Map <=> Workouts)"),
        Line::from(" D: Delete All Workouts"),
        Line::from(" R: Reset Saved Workouts"),
        Line::from(""),
        Line::from("--- Map ---").style(Style::new().bold().underlined()),
        Line::from(" h/j/k/l / arrows: Move Crosshair"),
        Line::from(" Enter / Space / Left Click: Log a Workout Here"),
        Line::from(" + / - / Mouse Wheel: Zoom"),
        Line::from(""),
        Line::from("--- Workouts ---").style(Style::new().bold().underlined()),
        Line::from(" k/j / ↑/↓: Navigate"),
        Line::from(" Enter / Left Click: Show on Map"),
        Line::from(" e: Edit Selected Workout"),
        Line::from(" d / Delete: Delete Selected Workout"),
        Line::from(""),
        Line::from("--- Workout Form ---").style(Style::new().bold().underlined()),
        Line::from(" Tab / ↑/↓: Next / Previous Field"),
        Line::from(" ← / → / Space on Type: Running <=> Cycling"),
        Line::from(" Enter: Save, Esc: Cancel"),
        Line::from(""),
        Line::from(Span::styled(
            " Press Esc, ?, or Enter to close ",
            Style::new().italic().yellow(),
        )),
    ];

    let paragraph = Paragraph::new(help_text).wrap(Wrap { trim: false });
    f.render_widget(
        paragraph,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn render_confirm_modal(f: &mut Frame, action: &ConfirmAction) {
    let block = Block::default()
        .title("Confirm")
        .borders(Borders::ALL)
        .border_style(Style::new().red());
    let area = centered_rect(50, 20, f.size());
    f.render_widget(Clear, area);

    let text = vec![
        Line::from(""),
        Line::from(action.prompt()),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y]", Style::new().bold().green()),
            Span::raw(" Yes    "),
            Span::styled("[n]", Style::new().bold().red()),
            Span::raw(" No"),
        ]),
    ];
    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
