use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::shared::{DisplayState, SlotView};

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // connection + status
            Constraint::Length(5), // the six slots
            Constraint::Length(4), // tracks + effects
            Constraint::Min(6),    // parameters
            Constraint::Length(2), // key help
        ])
        .split(area);

    draw_header(frame, sections[0], state);
    draw_slots(frame, sections[1], state);
    draw_activity(frame, sections[2], state);
    draw_params(frame, sections[3], state);
    draw_help(frame, sections[4]);
}

fn draw_header(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let (label, color) = if state.connected {
        ("● connected", Color::Green)
    } else {
        ("○ no board", Color::DarkGray)
    };
    let mut spans = vec![
        Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::raw(state.status.as_str()),
    ];
    if state.import_required {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            "personal card needs a recording (i)",
            Style::default().fg(Color::Yellow),
        ));
    }
    let block = Block::default().borders(Borders::ALL).title(" tuneboard ");
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_slots(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, state.slots.len().max(1) as u32); state.slots.len()])
        .split(area);

    for (i, (slot, cell)) in state.slots.iter().zip(cols.iter()).enumerate() {
        draw_slot(frame, *cell, i, slot, state.selected_slot == Some(i));
    }
}

fn draw_slot(frame: &mut Frame, area: Rect, index: usize, slot: &SlotView, selected: bool) {
    let mut border = if slot.occupied {
        Style::default().fg(Color::LightMagenta)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    if selected {
        border = border.add_modifier(Modifier::BOLD | Modifier::REVERSED);
    }
    let body = if slot.occupied {
        vec![Line::from(slot.name), Line::from(format!("#{} {}", slot.card_id, slot.icon))]
    } else {
        vec![Line::from("–")]
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" {} ", index + 1));
    frame.render_widget(Paragraph::new(body).block(block), area);
}

fn lamp(on: bool, label: &'static str) -> Span<'static> {
    let style = if on {
        Style::default().fg(Color::Black).bg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Span::styled(format!(" {label} "), style)
}

fn draw_activity(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let mut tracks = vec![Span::raw("tracks  ")];
    for &(track, playing) in &state.tracks {
        tracks.push(lamp(playing, track.label()));
        tracks.push(Span::raw(" "));
    }
    let mut effects = vec![Span::raw("effects ")];
    for &(effect, active) in &state.effects {
        effects.push(lamp(active, effect.label()));
        effects.push(Span::raw(" "));
    }
    let block = Block::default().borders(Borders::ALL);
    frame.render_widget(
        Paragraph::new(vec![Line::from(tracks), Line::from(effects)]).block(block),
        area,
    );
}

fn draw_params(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let lines = vec![
        Line::from(format!(
            "volume      {:>5.2}   (board {}%)",
            state.volume, state.board_volume
        )),
        Line::from(format!(
            "reverb      {:>5.0}%  {}",
            state.reverb_mix,
            state.reverb_preset.label()
        )),
        Line::from(format!(
            "pitch up    {:>+5.0}c  pitch down {:>+5.0}c",
            state.pitch_up, state.pitch_down
        )),
        Line::from(format!(
            "slow        {:>5.2}x  accelerate {:>5.2}x",
            state.slow_rate, state.accelerate_rate
        )),
        Line::from(format!(
            "applied     {:>+5.0}c  {:>5.2}x",
            state.applied_pitch, state.applied_rate
        )),
    ];
    let block = Block::default().borders(Borders::ALL).title(" parameters ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let help = vec![
        Line::from("←/→ slot  0-9 card  s shuffle  , . board vol  p c d r link  i import  esc quit"),
        Line::from("[ ] volume  - = reverb  v preset  u/U pitch up  j/J pitch down  l/L slow  f/F fast"),
    ];
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
