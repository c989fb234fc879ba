//! UI rendering for the TUI.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::core::{CronDescription, Page};
use crate::state::Forms;

use super::app::{JOB_FIELDS, PROFILE_FIELDS, TuiApp};

/// Main render function - dispatches to page-specific renderers.
pub fn render(frame: &mut Frame, app: &TuiApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer/help
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match app.dashboard.state().page() {
        Page::Start | Page::Home => render_home(frame, app, chunks[1]),
        Page::Jobs => render_jobs(frame, app, chunks[1]),
        Page::Profiles => render_profiles(frame, app, chunks[1]),
    }

    render_footer(frame, app, chunks[2]);

    let forms = app.dashboard.state().forms();
    if forms.job_visible || forms.profile_visible {
        render_form(frame, app, &forms);
    }
}

fn render_header(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let state = app.dashboard.state();
    let health = state.health();
    let status = health.status().unwrap_or("connecting...");

    let mut spans = vec![Span::styled(
        "Cupcake S3  ",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    for page in [Page::Home, Page::Jobs, Page::Profiles] {
        let style = if state.page() == page {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::Cyan)
        };
        spans.push(Span::styled(format!(" {} ", page), style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::raw(format!("  {}  ", state.fragment())));

    let status_color = match status {
        "tasty" => Color::Green,
        "spoiled" => Color::Red,
        _ => Color::DarkGray,
    };
    spans.push(Span::styled(
        format!("Cupcake is {}", status),
        Style::default().fg(status_color),
    ));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_home(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let inventory = app.dashboard.state().inventory();
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Welcome to Cupcake S3",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!(
            "  {} jobs, {} profiles configured.",
            inventory.jobs, inventory.profiles
        )),
        Line::from("  Create a profile with your AWS credentials, then a job to back up a directory."),
    ];

    let block = Block::default()
        .title("Home")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_jobs(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let tail = app.dashboard.state().log_tail();
    if tail.is_open() {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);
        render_job_list(frame, app, chunks[0]);
        render_log(frame, app, chunks[1]);
    } else {
        render_job_list(frame, app, area);
    }
}

fn render_job_list(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let jobs = app.dashboard.state().jobs();
    let block = Block::default()
        .title("Jobs")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if jobs.is_empty() {
        let text = Paragraph::new("  No jobs")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(text, area);
        return;
    }

    let tailed = app.dashboard.state().log_tail().job;
    let items: Vec<ListItem> = jobs
        .iter()
        .enumerate()
        .map(|(i, job)| {
            let is_selected = i == app.selected;
            let style = if is_selected {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let marker = if tailed.as_deref() == Some(job.name.as_str()) {
                Span::styled("●", Style::default().fg(Color::Green))
            } else {
                Span::raw(" ")
            };

            let line = Line::from(vec![
                Span::raw(if is_selected { "> " } else { "  " }),
                marker,
                Span::raw(format!(
                    " {:<20} {:<14} {:<16} {}",
                    job.name,
                    job.schedule,
                    job.last_run_ago.as_deref().unwrap_or("never"),
                    job.profile.as_deref().unwrap_or("-"),
                )),
            ]);

            ListItem::new(line).style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn render_log(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let tail = app.dashboard.state().log_tail();
    let counters = app.dashboard.selected_counters();
    let title = format!(
        "Log: {}  (uploaded {}, downloaded {}, deleted {})",
        tail.job.as_deref().unwrap_or("-"),
        counters.uploaded,
        counters.downloaded,
        counters.deleted
    );

    let mut lines: Vec<Line> = Vec::new();
    for (index, chunk) in &tail.chunks {
        lines.push(Line::from(Span::styled(
            format!("── archived log {} ──", index),
            Style::default().fg(Color::Yellow),
        )));
        lines.extend(chunk.lines().map(|l| Line::from(l.to_string())));
    }
    if !tail.chunks.is_empty() {
        lines.push(Line::from(Span::styled(
            "── live ──",
            Style::default().fg(Color::Yellow),
        )));
    }
    lines.extend(tail.buffer.lines().map(|l| Line::from(l.to_string())));

    // Keep the newest line in view as the buffer grows.
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible) as u16;

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    frame.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);
}

fn render_profiles(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let profiles = app.dashboard.state().profiles();
    let block = Block::default()
        .title("Profiles")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if profiles.is_empty() {
        let text = Paragraph::new("  No profiles")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(text, area);
        return;
    }

    let items: Vec<ListItem> = profiles
        .iter()
        .enumerate()
        .map(|(i, profile)| {
            let style = if i == app.selected {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!(
                "  {:<20} {:<12} {}",
                profile.name, profile.region, profile.role_arn
            ))
            .style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn render_form(frame: &mut Frame, app: &TuiApp, forms: &Forms) {
    let (title, labels, values): (&str, &[&str], Vec<String>) = if forms.job_visible {
        let job = &forms.job;
        (
            "New Job",
            &JOB_FIELDS[..],
            vec![
                job.name.clone(),
                job.schedule.clone(),
                job.source.clone(),
                job.destination.clone(),
                job.profile.clone(),
                job.storage_class.clone(),
            ],
        )
    } else {
        let profile = &forms.profile;
        (
            "New Profile",
            &PROFILE_FIELDS[..],
            vec![
                profile.name.clone(),
                profile.aws_access_key_id.clone(),
                mask(&profile.aws_secret_access_key),
                profile.region.clone(),
                profile.role_arn.clone(),
            ],
        )
    };

    let mut lines: Vec<Line> = labels
        .iter()
        .zip(values)
        .enumerate()
        .map(|(i, (label, value))| {
            let style = if i == app.field {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("  {:<18}", label), style),
                Span::raw(value),
            ])
        })
        .collect();

    if forms.job_visible {
        let preview = match app.dashboard.state().job_schedule_description() {
            CronDescription::Resolved(text) => Span::styled(text, Style::default().fg(Color::Green)),
            CronDescription::Pending => Span::styled("…", Style::default().fg(Color::DarkGray)),
        };
        lines.push(Line::from(""));
        lines.push(Line::from(vec![Span::raw("  Runs: "), preview]));
    }

    let area = centered(frame.area(), 70, (lines.len() + 2) as u16);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_footer(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let help_text = if app.form_open() {
        "[Tab] Next field  [Enter] Save  [Esc] Cancel"
    } else {
        match app.dashboard.state().page() {
            Page::Jobs => {
                "[↑↓] Navigate  [Enter] Log  [a] Archive  [n] New  [d] Delete  [Tab] Page  [q] Quit"
            }
            Page::Profiles => "[↑↓] Navigate  [n] New  [d] Delete  [Tab] Page  [r] Refresh  [q] Quit",
            _ => "[1-3] Page  [Tab] Next page  [n] New job  [r] Refresh  [q] Quit",
        }
    };

    let mut spans = vec![Span::raw(format!("  {}", help_text))];
    if let Some(status) = &app.status {
        spans.push(Span::styled(
            format!("  {}", status),
            Style::default().fg(Color::Yellow),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn mask(secret: &str) -> String {
    "*".repeat(secret.chars().count())
}
