use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use tasklane_core::user::User;

#[derive(Debug, Default)]
pub struct UserTable {
    state: TableState,
}

impl UserTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key(&mut self, key: KeyEvent, len: usize) {
        if len == 0 {
            self.state.select(None);
            return;
        }
        let current = self.state.selected().unwrap_or(0);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.select(Some((current + 1).min(len - 1))),
            KeyCode::Char('k') | KeyCode::Up => self.state.select(Some(current.saturating_sub(1))),
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame, users: &[User], loading: bool, area: Rect) {
        let block = Block::default()
            .title(format!(" Users ({}) ", users.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        if users.is_empty() {
            let text = if loading { "Loading..." } else { "No users found" };
            frame.render_widget(
                Paragraph::new(text)
                    .style(Style::default().fg(Color::DarkGray))
                    .block(block),
                area,
            );
            return;
        }

        let header = Row::new(["Username", "Email", "Joined"])
            .style(Style::default().fg(Color::Yellow).bold());
        let rows = users.iter().map(|u| {
            Row::new(vec![
                Cell::from(u.username.as_str()),
                Cell::from(u.email.as_str()),
                Cell::from(u.joined_on()),
            ])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Percentage(30),
                Constraint::Percentage(50),
                Constraint::Percentage(20),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan));

        let mut state = self.state.clone();
        frame.render_stateful_widget(table, area, &mut state);
    }
}
