use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::centered_rect;
use crate::controllers::{LoginField, LoginForm, RegisterField, RegisterForm};

fn field_line<'a>(label: &'a str, value: String, focused: bool) -> Line<'a> {
    let label_style = if focused {
        Style::default().fg(Color::Cyan).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
        Span::styled(format!("{label:>26}: "), label_style),
        Span::raw(value),
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
    ])
}

fn secret(value: &str, reveal: bool) -> String {
    if reveal {
        value.to_string()
    } else {
        "*".repeat(value.chars().count())
    }
}

fn message_lines(error: Option<&str>, notice: Option<&str>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let Some(notice) = notice {
        lines.push(Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(Color::Green),
        )));
    }
    if let Some(error) = error {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )));
    }
    lines
}

fn button(label: &str, busy_label: &str, busy: bool) -> Line<'static> {
    let (text, style) = if busy {
        (busy_label, Style::default().fg(Color::DarkGray))
    } else {
        (label, Style::default().fg(Color::Black).bg(Color::Cyan).bold())
    };
    Line::from(Span::styled(format!(" {text} "), style)).alignment(Alignment::Center)
}

pub fn render_login(frame: &mut Frame, form: &LoginForm, area: Rect) {
    let popup = centered_rect(70, 60, area);
    frame.render_widget(Clear, popup);

    let mut lines = message_lines(form.error(), form.notice());
    lines.push(Line::raw(""));
    lines.push(field_line(
        "Email",
        form.email().to_string(),
        form.focus() == LoginField::Email,
    ));
    lines.push(field_line(
        "Password",
        secret(form.password(), form.reveals_password()),
        form.focus() == LoginField::Password,
    ));
    lines.push(Line::raw(""));
    lines.push(button("Login", "Logging in...", form.is_submitting()));

    let block = Block::default()
        .title(" Login ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        popup,
    );
}

pub fn render_register(frame: &mut Frame, form: &RegisterForm, area: Rect) {
    let popup = centered_rect(70, 60, area);
    frame.render_widget(Clear, popup);

    let mut lines = message_lines(form.error(), None);
    lines.push(Line::raw(""));
    for field in RegisterField::ALL {
        let value = match field {
            RegisterField::Password => secret(form.value(field), form.reveals_password()),
            _ => form.value(field).to_string(),
        };
        lines.push(field_line(field.label(), value, form.focus() == field));
    }
    lines.push(Line::raw(""));
    lines.push(button("Register", "Registering...", form.is_submitting()));

    let block = Block::default()
        .title(" Register ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        popup,
    );
}
