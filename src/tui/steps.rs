use crate::pipeline::patterns::HitType;
use crate::shared::STEPS_PER_PATTERN;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

const BEAT: usize = 4; // steps per beat

pub fn is_downbeat(step: usize) -> bool {
    step % BEAT == 0
}

// the playhead is yellow on a beat, green between
pub fn cell_style(step: usize, current: usize) -> Style {
    if current == step {
        let bg = if is_downbeat(step) { Color::Yellow } else { Color::Green };
        return Style::default().fg(Color::Black).bg(bg);
    }
    if is_downbeat(step) {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn glyph(hit: HitType) -> &'static str {
    let v = hit.voices();
    match (v.kick, v.snare, v.hat) {
        (true, true, _) => "KS",
        (true, false, true) => "Kh",
        (false, true, true) => "Sh",
        (true, false, false) => "K",
        (false, true, false) => "S",
        (false, false, true) => "h",
        (false, false, false) => "·",
    }
}

// stopped means current is 0, so the first cell stays lit as the reset position
pub fn draw_steps(frame: &mut Frame, area: Rect, steps: &[HitType; STEPS_PER_PATTERN], current: usize) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, STEPS_PER_PATTERN as u32); STEPS_PER_PATTERN])
        .split(area);

    for (step, cell_area) in cols.iter().enumerate() {
        let style = cell_style(step, current);
        let cell = Paragraph::new(glyph(steps[step]))
            .centered()
            .style(style)
            .block(Block::default().borders(Borders::ALL).border_style(style));
        frame.render_widget(cell, *cell_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playhead_colour_depends_on_the_beat() {
        assert_eq!(cell_style(4, 4).bg, Some(Color::Yellow));
        assert_eq!(cell_style(5, 5).bg, Some(Color::Green));
        assert_eq!(cell_style(5, 4).bg, None);
        assert_eq!(cell_style(8, 0).fg, Some(Color::White));
    }

    #[test]
    fn stopped_indicator_rests_on_step_zero() {
        // a stopped transport publishes step 0
        assert_eq!(cell_style(0, 0).bg, Some(Color::Yellow));
        assert!((1..STEPS_PER_PATTERN).all(|s| cell_style(s, 0).bg.is_none()));
    }

    #[test]
    fn glyphs_name_the_voices() {
        assert_eq!(glyph(HitType(4)), "Kh");
        assert_eq!(glyph(HitType(6)), "KS");
        assert_eq!(glyph(HitType::REST), "·");
        assert_eq!(glyph(HitType(9)), "·");
    }
}
