use std::collections::VecDeque;

use map_core::{category_of, NoticeLevel, RecordSource, SyncOutcome, SyncPhase, CATEGORIES};
use ratatui::layout::{Constraint, Direction, Layout, Margin};
use ratatui::prelude::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::surface::ViewSnapshot;

/// World blocks from the viewport center to the canvas edge at zoom 0.
const ZOOM_ZERO_HALF_SPAN: f64 = 16_000.0;

pub struct UiState {
    pub snapshot: Option<ViewSnapshot>,
    pub cursor: usize,
    pub logs: VecDeque<String>,
    pub max_logs: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            snapshot: None,
            cursor: 0,
            logs: VecDeque::new(),
            max_logs: 8,
        }
    }
}

impl UiState {
    pub fn push_snapshot(&mut self, snapshot: ViewSnapshot) {
        let rows = snapshot.panel.rows.len();
        self.cursor = self.cursor.min(rows.saturating_sub(1));
        self.snapshot = Some(snapshot);
    }

    pub fn push_log<S: Into<String>>(&mut self, line: S) {
        let mut text: String = line.into();
        while text.ends_with('\n') || text.ends_with('\r') {
            text.pop();
        }
        if text.is_empty() {
            return;
        }
        self.logs.push_front(text);
        while self.logs.len() > self.max_logs {
            self.logs.pop_back();
        }
    }

    pub fn row_count(&self) -> usize {
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.panel.rows.len())
            .unwrap_or(0)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let rows = self.row_count();
        if rows == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(rows - 1);
    }
}

/// `#rgb` or `#rrggbb` to a terminal color.
pub fn parse_hex_color(color: &str) -> Option<Color> {
    let hex = color.strip_prefix('#')?;
    let channel = |text: &str| u8::from_str_radix(text, 16).ok();
    match hex.len() {
        3 => {
            let mut digits = hex.chars().map(|digit| digit.to_string().repeat(2));
            let r = channel(&digits.next()?)?;
            let g = channel(&digits.next()?)?;
            let b = channel(&digits.next()?)?;
            Some(Color::Rgb(r, g, b))
        }
        6 => Some(Color::Rgb(
            channel(hex.get(0..2)?)?,
            channel(hex.get(2..4)?)?,
            channel(hex.get(4..6)?)?,
        )),
        _ => None,
    }
}

/// Canvas bounds as `([x_min, x_max], [y_min, y_max])` in display units.
pub fn viewport_bounds(center_lng: f64, center_lat: f64, zoom: i32) -> ([f64; 2], [f64; 2]) {
    let half = ZOOM_ZERO_HALF_SPAN / 2f64.powi(zoom.max(0));
    (
        [center_lng - half, center_lng + half],
        [center_lat - half, center_lat + half],
    )
}

pub fn draw_ui(frame: &mut Frame, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(12),
            Constraint::Length(7),
        ])
        .split(frame.size());

    draw_header(frame, rows[0], state);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(44)])
        .split(rows[1]);
    draw_map(frame, body[0], state);

    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(CATEGORIES.len() as u16 + 2),
            Constraint::Min(5),
            Constraint::Length(7),
        ])
        .split(body[1]);
    draw_filters(frame, sidebar[0], state);
    draw_locations(frame, sidebar[1], state);
    draw_details(frame, sidebar[2], state);

    let footer = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[2]);
    draw_notices(frame, footer[0], state);
    draw_logs(frame, footer[1], state);
}

fn inner(area: Rect) -> Rect {
    area.inner(&Margin {
        vertical: 1,
        horizontal: 1,
    })
}

fn sync_status(phase: SyncPhase, outcome: Option<&SyncOutcome>) -> (&'static str, Color) {
    match (phase, outcome) {
        (SyncPhase::Fetching, _) => ("fetching", Color::Yellow),
        (SyncPhase::Idle, None) => ("idle", Color::Gray),
        (SyncPhase::Idle, Some(SyncOutcome::Refreshed { .. })) => ("synced", Color::Green),
        (SyncPhase::Idle, Some(SyncOutcome::FellBackToDemo { .. })) => ("demo data", Color::Red),
        (SyncPhase::Idle, Some(SyncOutcome::KeptStale { .. })) => ("stale", Color::Red),
    }
}

fn draw_header(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Shared Map Viewer");

    let mut spans = Vec::new();
    match &state.snapshot {
        Some(snapshot) => {
            let (label, color) = sync_status(snapshot.phase, snapshot.last_outcome.as_ref());
            spans.push(Span::styled(label, Style::default().fg(color)));
            if let Some(error) = &snapshot.last_error {
                spans.push(Span::styled(
                    format!(" ({error})"),
                    Style::default().fg(Color::Red),
                ));
            }
            let source = match snapshot.record_source {
                Some(RecordSource::Feed) => "feed",
                Some(RecordSource::Demo) => "demo",
                None => "none",
            };
            spans.push(Span::raw(format!(
                " | {} records ({source}) | {} | zoom {} | cycles {} ok {} failed {}",
                snapshot.record_count,
                snapshot.dimension,
                snapshot.map.zoom,
                snapshot.metrics.cycles,
                snapshot.metrics.successes,
                snapshot.metrics.failures,
            )));
        }
        None => spans.push(Span::styled("starting", Style::default().fg(Color::Gray))),
    }
    spans.push(Span::raw(
        " | o/n/e dimension, 1-7 filters, ↑↓ enter focus, +/- zoom, r refresh, q quit",
    ));

    frame.render_widget(block, area);
    frame.render_widget(
        Paragraph::new(Line::from(spans)).wrap(Wrap { trim: true }),
        inner(area),
    );
}

fn draw_map(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().borders(Borders::ALL).title("Map");
    let Some(snapshot) = &state.snapshot else {
        frame.render_widget(block, area);
        return;
    };

    let map = &snapshot.map;
    let (x_bounds, y_bounds) = viewport_bounds(map.center.lng, map.center.lat, map.zoom);
    let background = parse_hex_color(&map.background).unwrap_or(Color::Reset);

    let canvas = Canvas::default()
        .block(block)
        .background_color(background)
        .marker(symbols::Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            for line in &map.lines {
                let color = parse_hex_color(line.style.color).unwrap_or(Color::DarkGray);
                for pair in line.points.windows(2) {
                    ctx.draw(&CanvasLine {
                        x1: pair[0].lng,
                        y1: pair[0].lat,
                        x2: pair[1].lng,
                        y2: pair[1].lat,
                        color,
                    });
                }
            }
            ctx.layer();
            for (handle, marker) in &map.markers {
                let color = if marker.icon.style_key == "origin" {
                    Color::White
                } else {
                    parse_hex_color(category_of(&marker.icon.style_key).color)
                        .unwrap_or(Color::White)
                };
                let mut style = Style::default().fg(color);
                if map.popup == Some(*handle) {
                    style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
                }
                ctx.print(
                    marker.position.lng,
                    marker.position.lat,
                    Line::from(Span::styled(format!("● {}", marker.icon.title), style)),
                );
            }
        });
    frame.render_widget(canvas, area);
}

fn draw_filters(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().borders(Borders::ALL).title("Categories");
    let lines: Vec<Line> = state
        .snapshot
        .iter()
        .flat_map(|snapshot| snapshot.panel.toggles.iter())
        .enumerate()
        .map(|(index, toggle)| {
            let (mark, style) = if toggle.active {
                ("[x]", Style::default().fg(Color::Green))
            } else {
                ("[ ]", Style::default().fg(Color::DarkGray))
            };
            Line::from(vec![
                Span::styled(format!("{} ", index + 1), Style::default().fg(Color::Yellow)),
                Span::styled(format!("{mark} {}", toggle.label), style),
            ])
        })
        .collect();
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(lines), inner(area));
}

fn draw_locations(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().borders(Borders::ALL).title("Locations");
    let rows = state
        .snapshot
        .as_ref()
        .map(|snapshot| snapshot.panel.rows.as_slice())
        .unwrap_or(&[]);

    if rows.is_empty() {
        frame.render_widget(
            Paragraph::new("No locations found")
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            ListItem::new(vec![
                Line::from(Span::raw(row.title.clone())),
                Line::from(vec![
                    Span::styled(row.coordinates.clone(), Style::default().fg(Color::Cyan)),
                    Span::raw("  "),
                    Span::styled(row.category, Style::default().fg(Color::DarkGray)),
                ]),
            ])
        })
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut list_state = ListState::default().with_selected(Some(state.cursor));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_details(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().borders(Borders::ALL).title("Details");
    let lines: Vec<Line> = match state
        .snapshot
        .as_ref()
        .and_then(|snapshot| snapshot.map.open_popup_content())
    {
        Some(popup) => popup
            .lines()
            .into_iter()
            .enumerate()
            .map(|(index, text)| {
                let style = if index == 0 {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Line::from(Span::styled(text.to_string(), style))
            })
            .collect(),
        None => vec![Line::from(Span::styled(
            "Select a location and press enter",
            Style::default().fg(Color::DarkGray),
        ))],
    };
    frame.render_widget(block, area);
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }),
        inner(area),
    );
}

fn draw_notices(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().borders(Borders::ALL).title("Notices");
    let lines: Vec<Line> = state
        .snapshot
        .iter()
        .flat_map(|snapshot| snapshot.panel.notices.iter())
        .map(|notice| {
            let color = match notice.level {
                NoticeLevel::Info => Color::Cyan,
                NoticeLevel::Warning => Color::Red,
            };
            Line::from(Span::styled(notice.message.clone(), Style::default().fg(color)))
        })
        .collect();
    frame.render_widget(block, area);
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }),
        inner(area),
    );
}

fn draw_logs(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().borders(Borders::ALL).title("Logs");
    let lines: Vec<Line> = state
        .logs
        .iter()
        .map(|entry| Line::from(Span::raw(entry)))
        .collect();
    frame.render_widget(block, area);
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }),
        inner(area),
    );
}
