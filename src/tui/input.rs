use std::time::Duration;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crate::shared::InputEvent;
use super::mode::TuiState;

const MAX_BPM_DIGITS: usize = 3;

// poll for input from tui, the bpm field is handled here and only its commit goes to the backend
pub fn poll_input(timeout: Duration, ts: &mut TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key.code, ts));
    }
    Ok(vec![])
}

pub fn handle_key(code: KeyCode, ts: &mut TuiState) -> Vec<InputEvent> {
    if ts.editing_bpm() {
        return handle_bpm_entry(code, ts);
    }

    match code {
        KeyCode::Esc | KeyCode::Char('q') => vec![InputEvent::Quit],
        KeyCode::Char(' ') => vec![InputEvent::TogglePlay],

        // lowercase = forward and shifted = back
        KeyCode::Char('k') => vec![InputEvent::NextKey],
        KeyCode::Char('K') => vec![InputEvent::PrevKey],
        KeyCode::Char('s') => vec![InputEvent::NextScale],
        KeyCode::Char('S') => vec![InputEvent::PrevScale],
        KeyCode::Char('p') => vec![InputEvent::NextPattern],
        KeyCode::Char('P') => vec![InputEvent::PrevPattern],

        // tempo, fine and coarse
        KeyCode::Char('-') | KeyCode::Left => vec![InputEvent::NudgeTempo(-1)],
        KeyCode::Char('=') | KeyCode::Right => vec![InputEvent::NudgeTempo(1)],
        KeyCode::Char('[') => vec![InputEvent::NudgeTempo(-5)],
        KeyCode::Char(']') => vec![InputEvent::NudgeTempo(5)],

        KeyCode::Char('b') => {
            ts.bpm_entry = Some(String::new());
            vec![]
        }

        _ => vec![],
    }
}

fn handle_bpm_entry(code: KeyCode, ts: &mut TuiState) -> Vec<InputEvent> {
    let Some(buf) = ts.bpm_entry.as_mut() else {
        return vec![];
    };
    match code {
        KeyCode::Char(c) if c.is_ascii_digit() => {
            if buf.len() < MAX_BPM_DIGITS {
                buf.push(c);
            }
            vec![]
        }
        KeyCode::Backspace => {
            buf.pop();
            vec![]
        }
        KeyCode::Enter => match ts.bpm_entry.take() {
            Some(text) => vec![InputEvent::CommitTempo(text)],
            None => vec![],
        },
        KeyCode::Esc => {
            ts.bpm_entry = None;
            vec![]
        }
        _ => vec![],
    }
}
