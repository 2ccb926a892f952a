// mapty-tui/src/ui/status_bar.rs
use crate::app::{ActiveModal, App, Focus};
use mapty_lib::NoticeLevel;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

fn key_hints(app: &App) -> &'static str {
    match app.active_modal {
        ActiveModal::Help => " [Esc/Enter/?] Close Help ",
        ActiveModal::Confirm(_) => " [y/Enter] Confirm | [n/Esc] Cancel ",
        ActiveModal::None if app.form_open() => {
            " [Enter] Save | [Esc] Cancel | [Tab/↑↓] Field | [←→/Space] Type | [Click] Move pin "
        }
        ActiveModal::None => match app.focus {
            Focus::Map => {
                " [Tab] Focus | [hjkl/←↓↑→] Move | [Enter] Log here | [+/-] Zoom | [?] Help | [q] Quit "
            }
            Focus::List => {
                " [Tab] Focus | [↑↓/jk] Nav | [Enter] Show | [e]dit | [d]elete | [D] Delete all | [?] Help | [q] Quit "
            }
        },
    }
}

pub fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let notice_text = app
        .last_notice
        .as_ref()
        .map(|n| n.message.as_str())
        .unwrap_or("");
    let notice_color = match app.notice_level() {
        Some(NoticeLevel::Error) => Color::Red,
        Some(NoticeLevel::Warning) => Color::Yellow,
        Some(NoticeLevel::Info) | None => Color::White,
    };

    let status_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let status_paragraph =
        Paragraph::new(key_hints(app)).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(status_paragraph, status_chunks[0]);

    let notice_paragraph = Paragraph::new(notice_text)
        .style(Style::default().bg(Color::DarkGray).fg(notice_color))
        .alignment(Alignment::Right);
    f.render_widget(notice_paragraph, status_chunks[1]);
}
