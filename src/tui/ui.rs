use ratatui::prelude::*;
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};

use crate::output::{format_score, truncate_label};
use crate::scoring::{Assessment, Explanation, FeatureAttribution, MAX_SCORE};
use crate::tui::app::{App, FormField, InputMode, ServiceState};

const FORM_WIDTH: u16 = 40;
const LABEL_WIDTH: usize = 20;

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 12 || area.width < 60 {
        let msg = Paragraph::new("Terminal too small")
            .alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Body(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),  // Title bar
        Constraint::Fill(1),    // Form | results
        Constraint::Length(1),  // Status bar
    ])
    .split(area);

    let body = Layout::horizontal([
        Constraint::Length(FORM_WIDTH),
        Constraint::Fill(1),
    ])
    .split(chunks[1]);

    render_title(frame, chunks[0], app);
    render_form(frame, body[0], app);
    render_results(frame, body[1], app);
    render_status_bar(frame, chunks[2], app);

    if app.input_mode == InputMode::Help {
        render_help_popup(frame, app);
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let title = "Credit Risk Assessment";
    let mut spans = vec![Span::styled(title, Style::default().fg(app.theme.title_color).bold())];

    if let Some(a) = &app.assessment {
        let local = a.assessed_at.with_timezone(&chrono::Local);
        let stamp = format!("scored {}", local.format("%H:%M:%S"));
        let padding_len = (area.width as usize).saturating_sub(title.len() + stamp.len());
        spans.push(Span::raw(" ".repeat(padding_len)));
        spans.push(Span::styled(stamp, Style::default().fg(app.theme.muted)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_form(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::bordered()
        .title(" Applicant ")
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    for (i, field) in FormField::ALL.iter().enumerate() {
        let selected = i == app.selected;
        let editing = selected && app.input_mode == InputMode::Editing;

        let value = if editing {
            format!("{}|", app.edit_buffer)
        } else if field.range().is_some() {
            app.field_text(*field)
        } else {
            format!("< {} >", app.field_text(*field))
        };

        let label = format!("{:<w$}", field.label(), w = LABEL_WIDTH);
        let value_style = if editing {
            app.theme.field_editing
        } else if selected {
            app.theme.field_selected
        } else {
            Style::default()
        };

        lines.push(Line::from(vec![
            Span::styled(label, Style::default().fg(app.theme.field_label)),
            Span::styled(value, value_style),
        ]));

        if let Some(range) = field.range() {
            lines.push(Line::from(Span::styled(
                format!("{:<w$}{}..{}", "", range.min, range.max, w = LABEL_WIDTH),
                Style::default().fg(app.theme.muted),
            )));
        }
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_results(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::bordered()
        .title(" Risk Assessment ")
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let ServiceState::Unavailable(reason) = &app.service {
        let lines = vec![
            Line::from(Span::styled(
                "Scoring service unavailable",
                Style::default().fg(app.theme.flash_error).bold(),
            )),
            Line::from(""),
            Line::from(Span::styled(reason.clone(), Style::default().fg(app.theme.muted))),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
        return;
    }

    if let Some(error) = &app.request_error {
        let banner = Paragraph::new(error.clone())
            .style(Style::default().fg(app.theme.flash_error).bold())
            .wrap(Wrap { trim: true });
        frame.render_widget(banner, inner);
        return;
    }

    let Some(assessment) = &app.assessment else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(3),  // Score, level, gauge
        Constraint::Length(6),  // Narrative
        Constraint::Fill(1),    // Explanation
    ])
    .split(inner);

    render_score(frame, chunks[0], app, assessment);
    render_narrative(frame, chunks[1], app, assessment);
    render_explanation(frame, chunks[2], app, &assessment.explanation);
}

fn render_score(frame: &mut Frame, area: Rect, app: &App, assessment: &Assessment) {
    let level_color = app.theme.level_color(assessment.level);
    let gauge_width = (area.width as usize).saturating_sub(2).min(50);

    let lines = vec![
        Line::from(vec![
            Span::raw("Risk Score  "),
            Span::styled(format_score(assessment.score), Style::default().bold()),
        ]),
        Line::from(vec![
            Span::raw("Risk Level  "),
            Span::styled(
                format!(" {} ", assessment.level),
                Style::default().fg(Color::Black).bg(level_color).bold(),
            ),
        ]),
        score_bar(assessment.score, gauge_width, level_color, app.theme.bar_empty),
    ];

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_narrative(frame: &mut Frame, area: Rect, app: &App, assessment: &Assessment) {
    let lines = vec![
        Line::from(Span::styled("Summary", Style::default().fg(app.theme.title_color).bold())),
        Line::from(assessment.narrative),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

fn render_explanation(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    explanation: &Result<Explanation, crate::scoring::ScoringError>,
) {
    let mut lines = vec![Line::from(Span::styled(
        "What drove this score",
        Style::default().fg(app.theme.title_color).bold(),
    ))];

    match explanation {
        Ok(explanation) => {
            let bar_width = (area.width as usize).saturating_sub(LABEL_WIDTH + 12).min(40);
            let max = explanation
                .top
                .iter()
                .map(|a| a.contribution.abs())
                .fold(0.0_f64, f64::max);
            for attribution in &explanation.top {
                lines.push(attribution_line(attribution, max, bar_width, app));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "red raises default risk, green lowers it (log-odds)",
                Style::default().fg(app.theme.muted),
            )));
        }
        Err(e) => {
            lines.push(Line::from(Span::styled(
                e.to_string(),
                Style::default().fg(app.theme.level_medium),
            )));
        }
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn attribution_line(a: &FeatureAttribution, max: f64, width: usize, app: &App) -> Line<'static> {
    let filled = if max > 0.0 {
        ((a.contribution.abs() / max) * width as f64).round() as usize
    } else {
        0
    };
    Line::from(vec![
        Span::raw(format!("{:<w$}", truncate_label(&a.feature, LABEL_WIDTH - 1), w = LABEL_WIDTH)),
        Span::styled(format!("{:>+9.4}  ", a.contribution), Style::default().fg(app.theme.muted)),
        Span::styled(
            "█".repeat(filled),
            Style::default().fg(app.theme.contribution_color(a.contribution)),
        ),
    ])
}

fn score_bar(score: u32, width: usize, color: Color, empty_color: Color) -> Line<'static> {
    let ratio = (score as f64 / MAX_SCORE as f64).min(1.0);
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);

    let mut spans = Vec::new();
    if filled > 0 {
        spans.push(Span::styled("█".repeat(filled), Style::default().fg(color)));
    }
    if empty > 0 {
        spans.push(Span::styled("░".repeat(empty), Style::default().fg(empty_color)));
    }

    Line::from(spans)
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let text = if let Some((ref msg, _)) = app.flash_message {
        let msg_color = if msg.starts_with("Error") {
            app.theme.flash_error
        } else {
            app.theme.flash_success
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let hints: &[(&str, &str)] = match app.input_mode {
            InputMode::Editing => &[("Enter", "commit"), ("Esc", "cancel")],
            _ => &[
                ("j/k", "field"),
                ("h/l", "adjust"),
                ("Enter", "edit"),
                ("r", "re-run"),
                ("?", "help"),
                ("q", "quit"),
            ],
        };
        let mut spans = Vec::new();
        for (key, action) in hints {
            spans.push(Span::styled(*key, Style::default().fg(app.theme.status_key_color)));
            spans.push(Span::raw(format!(" {}  ", action)));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(app.theme.status_bar_bg)),
        area,
    );
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    // Clamp dimensions to area bounds
    let width = width.min(area.width);
    let height = height.min(area.height);

    // Calculate centered position
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Render the help overlay popup
fn render_help_popup(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(50, 13, frame.area());

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Keyboard Shortcuts ", app.theme.popup_title))
        .border_style(Style::default().fg(app.theme.popup_border));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(app.theme.status_key_color).bold();
    let entries = [
        ("j / Down      ", "Next field"),
        ("k / Up        ", "Previous field"),
        ("l / Right     ", "Increase or next option"),
        ("h / Left      ", "Decrease or previous option"),
        ("Enter         ", "Type a number"),
        ("r             ", "Re-run assessment"),
        ("?             ", "Show/hide this help"),
        ("q / Ctrl-c    ", "Quit"),
    ];

    let mut help_lines: Vec<Line> = entries
        .iter()
        .map(|(key, action)| Line::from(vec![Span::styled(*key, key_style), Span::raw(*action)]))
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(app.theme.muted),
    )));

    frame.render_widget(Paragraph::new(help_lines), inner);
}
