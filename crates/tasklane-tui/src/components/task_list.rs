use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use tasklane_core::task::Task;

/// Selection state over the dashboard's task list. The tasks themselves
/// live in the controller and are passed in on every call.
#[derive(Debug, Default)]
pub struct TaskListView {
    list_state: ListState,
}

impl TaskListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.list_state.selected()
    }

    pub fn selected<'a>(&self, tasks: &'a [Task]) -> Option<&'a Task> {
        tasks.get(self.list_state.selected()?)
    }

    /// Keep the selection inside the list after it grew or shrank.
    pub fn clamp(&mut self, len: usize) {
        match (self.list_state.selected(), len) {
            (_, 0) => self.list_state.select(None),
            (None, _) => self.list_state.select(Some(0)),
            (Some(i), len) if i >= len => self.list_state.select(Some(len - 1)),
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, len: usize) {
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if current + 1 < len {
                    self.list_state.select(Some(current + 1));
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.list_state.select(Some(current.saturating_sub(1)));
            }
            KeyCode::Char('g') => self.list_state.select(Some(0)),
            KeyCode::Char('G') => self.list_state.select(Some(len - 1)),
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame, tasks: &[Task], loading: bool, focused: bool, area: Rect) {
        let done = tasks.iter().filter(|t| t.completed).count();
        let title = format!(" Todos ({done}/{}) ", tasks.len());
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        if tasks.is_empty() {
            let text = if loading { "Loading..." } else { "No todos added yet" };
            let placeholder = Paragraph::new(text)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(placeholder, area);
            return;
        }

        let items: Vec<ListItem> = tasks
            .iter()
            .map(|task| {
                let (check_style, title_style) = if task.completed {
                    (
                        Style::default().fg(Color::Green),
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::CROSSED_OUT),
                    )
                } else {
                    (Style::default().fg(Color::Yellow), Style::default())
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{} ", task.checkbox()), check_style),
                    Span::styled(&task.title, title_style),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan).bold())
            .highlight_symbol("> ");

        let mut state = self.list_state.clone();
        frame.render_stateful_widget(list, area, &mut state);
    }
}
