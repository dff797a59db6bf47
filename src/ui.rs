use chrono::Utc;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Dialog, Notice, NoticeKind, Screen};
use crate::form::{AuthField, AuthForm, TaskField, TaskForm};
use crate::task::{Task, TaskStatus};

pub fn draw(frame: &mut Frame, app: &App) {
    match app.screen {
        Screen::Login => draw_auth_screen(frame, app, false),
        Screen::Register => draw_auth_screen(frame, app, true),
        Screen::Dashboard => draw_dashboard(frame, app),
    }

    match &app.dialog {
        Some(Dialog::TaskForm(form)) => draw_task_form(frame, form),
        Some(Dialog::ConfirmDelete { title, .. }) => draw_confirm_delete(frame, title),
        None => {}
    }

    if let Some(notice) = &app.notice {
        draw_notice(frame, notice);
    }
}

fn draw_auth_screen(frame: &mut Frame, app: &App, registering: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .split(frame.area());

    let (title, color) = if registering {
        (" Create account ", Color::Green)
    } else {
        (" Sign in ", Color::Cyan)
    };
    let auth_block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(color));

    frame.render_widget(auth_block.clone(), chunks[1]);

    let inner = auth_block.inner(chunks[1]);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let form = &app.auth_form;
    let mut row = 0;
    if registering {
        draw_auth_field(frame, rows[row], "Name", &form.name, form.focus == AuthField::Name);
        row += 1;
    }
    draw_auth_field(frame, rows[row], "Email", &form.email, form.focus == AuthField::Email);
    let masked = "*".repeat(form.password.chars().count());
    draw_auth_field(
        frame,
        rows[row + 1],
        "Password",
        &masked,
        form.focus == AuthField::Password,
    );

    let instructions = if registering {
        vec![
            Line::from("Tab to switch fields, Enter to create the account"),
            Line::from("Esc to go back to sign-in"),
        ]
    } else {
        vec![
            Line::from("Tab to switch fields, Enter to sign in"),
            Line::from("Ctrl+R to create an account, Esc to quit"),
        ]
    };
    let instructions = Paragraph::new(instructions)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(instructions, rows[4]);

    set_auth_cursor(frame, &rows, form, registering);
}

fn draw_auth_field(frame: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
    let style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let field = Paragraph::new(format!("{:>8}: {}", label, value)).style(style);
    frame.render_widget(field, area);
}

fn set_auth_cursor(frame: &mut Frame, rows: &[Rect], form: &AuthForm, registering: bool) {
    // Field values start after the right-aligned label and ": ".
    let offset = 10u16;
    let (row, len) = match form.focus {
        AuthField::Name if registering => (rows[0], form.name.chars().count()),
        AuthField::Name => return,
        AuthField::Email => (
            rows[if registering { 1 } else { 0 }],
            form.email.chars().count(),
        ),
        AuthField::Password => (
            rows[if registering { 2 } else { 1 }],
            form.password.chars().count(),
        ),
    };
    frame.set_cursor_position((row.x + offset + len as u16, row.y));
}

fn draw_dashboard(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_stats(frame, app, chunks[1]);
    draw_task_list(frame, app, chunks[2]);

    let hints = Paragraph::new(
        "n new | e edit | d delete | space toggle | r reload | l sign out | q quit",
    )
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(hints, chunks[3]);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let user = match app.user() {
        Some(user) => Line::from(vec![
            Span::styled(
                format!(" {} ", user.initials()),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(user.name.clone(), Style::default().fg(Color::White)),
        ]),
        None => Line::from(""),
    };

    let block = Block::default().borders(Borders::ALL).border_type(BorderType::Thick);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let title = Paragraph::new(Span::styled(
        " taskdeck ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(title, columns[0]);

    let user = Paragraph::new(user).alignment(Alignment::Right);
    frame.render_widget(user, columns[1]);
}

fn draw_stats(frame: &mut Frame, app: &App, area: Rect) {
    let stats = app.stats();
    let cells = [
        ("Total", stats.total, Color::White),
        ("Completed", stats.completed, Color::Green),
        ("Pending", stats.pending, Color::Yellow),
        ("Overdue", stats.overdue, Color::Red),
    ];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    for (i, (label, count, color)) in cells.iter().enumerate() {
        let cell = Paragraph::new(Line::from(vec![
            Span::styled(
                count.to_string(),
                Style::default().fg(*color).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(*label, Style::default().fg(Color::DarkGray)),
        ]))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(cell, columns[i]);
    }
}

fn draw_task_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(format!(" Tasks ({}) ", app.tasks.len()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);

    if app.loading {
        let loading = Paragraph::new("Loading tasks...")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(loading, area);
        return;
    }

    if app.tasks.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from("No tasks yet."),
            Line::from("Press n to create your first task."),
        ])
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let now = Utc::now();
    let items: Vec<ListItem> = app
        .tasks
        .iter()
        .map(|task| task_card(task, task.is_overdue(now)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn task_card(task: &Task, overdue: bool) -> ListItem<'_> {
    let (badge, badge_style) = match task.status {
        TaskStatus::Completed => ("Completed", Style::default().fg(Color::Green)),
        TaskStatus::Pending if overdue => ("Overdue", Style::default().fg(Color::Red)),
        TaskStatus::Pending => ("Pending", Style::default().fg(Color::Yellow)),
    };

    let title_style = if task.status == TaskStatus::Completed {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(format!("[{}] ", badge), badge_style),
        Span::styled(task.title.clone(), title_style),
    ])];
    if !task.description.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("  {}", task.description),
            Style::default().fg(Color::Gray),
        )));
    }
    lines.push(Line::from(Span::styled(
        format!("  Due: {}", task.due_date_display()),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));

    ListItem::new(lines)
}

fn draw_task_form(frame: &mut Frame, form: &TaskForm) {
    let area = centered_rect(60, 50, frame.area());
    let title = if form.is_editing() {
        " Edit task "
    } else {
        " New task "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(Color::Cyan));

    frame.render_widget(Clear, area);
    frame.render_widget(block.clone(), area);

    let inner = block.inner(area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    draw_form_field(frame, rows[0], "Title", &form.title, form.focus == TaskField::Title);
    draw_form_field(
        frame,
        rows[1],
        "Description",
        &form.description,
        form.focus == TaskField::Description,
    );
    draw_form_field(
        frame,
        rows[2],
        "Due (YYYY-MM-DD)",
        &form.due_date,
        form.focus == TaskField::DueDate,
    );
    if form.is_editing() {
        draw_form_field(
            frame,
            rows[3],
            "Status",
            form.status.label(),
            form.focus == TaskField::Status,
        );
    }

    let hint = if form.is_editing() {
        "Enter save | Esc cancel | space flips status"
    } else {
        "Enter save | Esc cancel"
    };
    let hint = Paragraph::new(hint)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(hint, rows[4]);

    let cursor = match form.focus {
        TaskField::Title => Some((rows[0], form.title.chars().count())),
        TaskField::Description => Some((rows[1], form.description.chars().count())),
        TaskField::DueDate => Some((rows[2], form.due_date.chars().count())),
        TaskField::Status => None,
    };
    if let Some((row, len)) = cursor {
        frame.set_cursor_position((row.x + 18 + len as u16, row.y));
    }
}

fn draw_form_field(frame: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
    let style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let field = Paragraph::new(format!("{:>16}: {}", label, value)).style(style);
    frame.render_widget(field, area);
}

fn draw_confirm_delete(frame: &mut Frame, title: &str) {
    let area = centered_rect(50, 20, frame.area());
    let block = Block::default()
        .title(" Delete task ")
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .style(Style::default().fg(Color::Red));

    let text = Paragraph::new(vec![
        Line::from(format!("Delete \"{}\"?", title)),
        Line::from(""),
        Line::from(Span::styled(
            "y / Enter to confirm, n / Esc to cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .wrap(Wrap { trim: true })
    .alignment(Alignment::Center)
    .block(block);

    frame.render_widget(Clear, area);
    frame.render_widget(text, area);
}

fn draw_notice(frame: &mut Frame, notice: &Notice) {
    let area = frame.area();
    if area.height < 2 {
        return;
    }
    let line = Rect::new(area.x, area.y + area.height - 1, area.width, 1);
    let color = match notice.kind {
        NoticeKind::Info => Color::Green,
        NoticeKind::Error => Color::Red,
    };
    let notice = Paragraph::new(format!(" {} ", notice.text))
        .style(Style::default().fg(Color::Black).bg(color));
    frame.render_widget(Clear, line);
    frame.render_widget(notice, line);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
