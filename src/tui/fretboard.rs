use crate::pipeline::fretboard::{Inlay, Marker, NUM_FRETS, StringRow, inlay};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

const CELL: usize = 5; // columns per fret, the separator not included

// rose, orange, amber, emerald, cyan, indigo, fuchsia
const RAINBOW: [Color; 7] = [
    Color::Rgb(244, 63, 94),
    Color::Rgb(249, 115, 22),
    Color::Rgb(245, 158, 11),
    Color::Rgb(16, 185, 129),
    Color::Rgb(6, 182, 212),
    Color::Rgb(99, 102, 241),
    Color::Rgb(217, 70, 239),
];

pub fn degree_color(degree: usize) -> Color {
    RAINBOW[degree % RAINBOW.len()]
}

pub fn marker_style(degree: usize, is_root: bool) -> Style {
    let style = Style::default().fg(Color::Black).bg(degree_color(degree));
    if is_root {
        style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        style
    }
}

fn cell(m: &Marker) -> Span<'static> {
    match m.degree {
        Some(d) => Span::styled(format!("{:^CELL$}", m.note.name()), marker_style(d, m.is_root())),
        None => Span::styled("─".repeat(CELL), Style::default().fg(Color::DarkGray)),
    }
}

fn string_line(row: &StringRow) -> Line<'static> {
    let mut spans = vec![Span::styled(format!("{:>2} ", row.name), Style::default().fg(Color::Gray))];
    spans.push(cell(&row.open));
    spans.push(Span::styled("║", Style::default().fg(Color::White))); // nut
    for m in &row.frets {
        spans.push(cell(m));
        spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
    }
    Line::from(spans)
}

// lines up under the string rows: 3 for the label, one cell for the open string, 1 for the nut
fn gutter() -> String {
    " ".repeat(3 + CELL + 1)
}

fn fret_numbers() -> Line<'static> {
    let mut s = gutter();
    for fret in 1..=NUM_FRETS {
        s.push_str(&format!("{fret:^CELL$} "));
    }
    Line::styled(s, Style::default().fg(Color::DarkGray))
}

fn inlays() -> Line<'static> {
    let mut s = gutter();
    for fret in 1..=NUM_FRETS {
        let dot = match inlay(fret) {
            Inlay::None => "",
            Inlay::Single => "●",
            Inlay::Double => "● ●",
        };
        s.push_str(&format!("{dot:^CELL$} "));
    }
    Line::styled(s, Style::default().fg(Color::Gray))
}

pub fn draw_neck(frame: &mut Frame, area: Rect, strings: &[StringRow]) {
    let mut lines: Vec<Line> = strings.iter().map(string_line).collect();
    lines.push(fret_numbers());
    lines.push(inlays());

    let neck = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Fretboard"));
    frame.render_widget(neck, area);
}
