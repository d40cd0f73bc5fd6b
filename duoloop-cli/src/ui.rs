use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Gauge, Paragraph},
    Terminal,
};

use crate::controls::StatusSnapshot;

pub fn draw_status(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    status: &StatusSnapshot,
    log_lines: &[String],
) {
    let _ = terminal.draw(|f| {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(6),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(f.size());

        let title = Paragraph::new("duoloop").style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
        f.render_widget(title, chunks[0]);

        let controls =
            Paragraph::new("c/C=cutover -/+100ms  x/X=crossfade -/+100ms  f=object fit  q=quit")
                .style(Style::default().fg(Color::Blue))
                .block(Block::default().borders(Borders::ALL).title("Controls"));
        f.render_widget(controls, chunks[1]);

        let green = Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD);
        let cutover_style = if status.past_cutover {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            green
        };
        let mut lines: Vec<Line> = status
            .text
            .lines()
            .map(|line| Line::from(Span::styled(line.to_string(), green)))
            .collect();
        lines.push(Line::from(Span::styled(
            status.cutover_line.clone(),
            cutover_style,
        )));
        let overlay = Paragraph::new(Text::from(lines))
            .block(Block::default().borders(Borders::ALL).title("Loop"));
        f.render_widget(overlay, chunks[2]);

        for (idx, name) in ["A", "B"].iter().enumerate() {
            let weight = status.weights[idx].clamp(0.0, 1.0) as f64;
            let title = match status.blend_progress {
                Some(progress) => format!("Instance {} (blend {:.0}%)", name, progress * 100.0),
                None => format!("Instance {}", name),
            };
            let gauge = Gauge::default()
                .block(Block::default().borders(Borders::ALL).title(title))
                .gauge_style(Style::default().fg(Color::Magenta))
                .ratio(weight)
                .label(format!("{:.2}", weight));
            f.render_widget(gauge, chunks[3 + idx]);
        }

        let log_height = chunks[5].height.saturating_sub(2) as usize;
        let start = log_lines.len().saturating_sub(log_height);
        let log_text = if log_lines.is_empty() {
            "No logs yet.".to_string()
        } else {
            log_lines[start..].join("\n")
        };

        let log_widget = Paragraph::new(log_text)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("Logs"));
        f.render_widget(log_widget, chunks[5]);
    });
}
