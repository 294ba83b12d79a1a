use crate::pipeline::theory::ScaleDegree;
use crate::shared::DisplayState;
use super::fretboard::{draw_neck, marker_style};
use super::mode::TuiState;
use super::steps::draw_steps;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];
const HELP: &str =
    "[Space] Play/Stop  [k/K] Key  [s/S] Scale  [p/P] Pattern  [-/=] Tempo  [[/]] ±5  [b] Type BPM  [q] Quit";

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState, ts: &TuiState, spin: usize) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // key, scale, degree chips (wraps for the long scales)
            Constraint::Length(state.strings.len() as u16 + 4), // neck + fret numbers + inlays
            Constraint::Length(3), // transport row
            Constraint::Length(3), // step indicator
            Constraint::Min(1), // status + help
        ])
        .split(area);

    draw_header(frame, sections[0], state);
    draw_neck(frame, sections[1], &state.strings);
    draw_transport(frame, sections[2], state, ts, spin);
    draw_steps(frame, sections[3], &state.steps, state.current_step);
    draw_status(frame, sections[4], state);
}

// "G  Minor 3rd (m3)"
fn chip_label(d: &ScaleDegree) -> String {
    format!(" {}  {} ({}) ", d.note.name(), d.interval.long, d.interval.short)
}

fn draw_header(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let title = Line::from(vec![
        Span::styled("Key ", Style::default().fg(Color::Gray)),
        Span::styled(state.key_name, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("   "),
        Span::styled("Scale ", Style::default().fg(Color::Gray)),
        Span::styled(state.scale_name, Style::default().add_modifier(Modifier::BOLD)),
    ]);

    let mut chips = Vec::with_capacity(state.degrees.len() * 2);
    for d in &state.degrees {
        chips.push(Span::styled(
            chip_label(d),
            marker_style(d.degree, d.is_root),
        ));
        chips.push(Span::raw(" "));
    }

    let header = Paragraph::new(vec![title, Line::from(chips)])
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("bassgroove"));
    frame.render_widget(header, area);
}

fn draw_transport(frame: &mut Frame, area: Rect, state: &DisplayState, ts: &TuiState, spin: usize) {
    let play = if state.playing {
        Span::styled(
            format!("{} PLAYING", SPINNER[spin % SPINNER.len()]),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled("■ STOPPED", Style::default().fg(Color::Gray))
    };

    let bpm = match &ts.bpm_entry {
        Some(buf) => Span::styled(format!("BPM {buf}_"), Style::default().fg(Color::Black).bg(Color::Yellow)),
        None => Span::raw(format!("BPM {}", state.bpm)),
    };

    let line = Line::from(vec![
        play,
        Span::raw("   "),
        bpm,
        Span::raw("   "),
        Span::styled(state.pattern_name, Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(format!("  ({})", state.pattern_group), Style::default().fg(Color::Gray)),
    ]);
    let row = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(row, area);
}

fn draw_status(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let mut lines = Vec::with_capacity(2);
    if !state.status.is_empty() {
        lines.push(Line::styled(state.status.clone(), Style::default().fg(Color::LightRed)));
    }
    lines.push(Line::styled(HELP, Style::default().fg(Color::DarkGray)));
    frame.render_widget(Paragraph::new(lines), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::theory::{Key, Note, ScaleKind};

    #[test]
    fn chips_spell_out_the_interval() {
        let degrees = Key::new(Note::E, ScaleKind::MinorPentatonic).degrees();
        assert_eq!(chip_label(&degrees[0]), " E  Root (R) ");
        assert_eq!(chip_label(&degrees[1]), " G  Minor 3rd (m3) ");
    }
}
