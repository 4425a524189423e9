use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use crate::peripheral::LinkCommand;
use crate::shared::InputEvent;
use super::mode::TuiState;

const VOLUME_STEP: f32 = 0.05;
const REVERB_MIX_STEP: f32 = 5.0;
const PITCH_STEP: f32 = 100.0; // one semitone
const RATE_STEP: f32 = 0.05;
const BOARD_VOLUME_STEP: i16 = 10;

// poll for one key press and resolve it to input events for the control loop
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

fn handle_key(code: KeyCode, ts: &mut TuiState) -> Vec<InputEvent> {
    match code {
        KeyCode::Esc => vec![InputEvent::Quit],

        // simulated board: cursor + card digit
        KeyCode::Left => { ts.move_cursor(-1); vec![] }
        KeyCode::Right | KeyCode::Tab => { ts.move_cursor(1); vec![] }
        KeyCode::Char(c @ '0'..='9') => vec![InputEvent::PlaceCard {
            slot: ts.slot_cursor,
            card: c as i32 - '0' as i32,
        }],
        KeyCode::Char('s') => vec![InputEvent::ShuffleSlots],
        KeyCode::Char(',') => vec![InputEvent::AdjustBoardVolume(-BOARD_VOLUME_STEP)],
        KeyCode::Char('.') => vec![InputEvent::AdjustBoardVolume(BOARD_VOLUME_STEP)],

        // board link
        KeyCode::Char('p') => vec![InputEvent::Link(LinkCommand::PresentPairingPicker)],
        KeyCode::Char('c') => vec![InputEvent::Link(LinkCommand::Connect)],
        KeyCode::Char('d') => vec![InputEvent::Link(LinkCommand::Disconnect)],
        KeyCode::Char('r') => vec![InputEvent::Link(LinkCommand::RemovePeripheral)],

        // knobs, lowercase = down and shifted = up
        KeyCode::Char('[') => vec![InputEvent::AdjustVolume(-VOLUME_STEP)],
        KeyCode::Char(']') => vec![InputEvent::AdjustVolume(VOLUME_STEP)],
        KeyCode::Char('-') => vec![InputEvent::AdjustReverbMix(-REVERB_MIX_STEP)],
        KeyCode::Char('=') => vec![InputEvent::AdjustReverbMix(REVERB_MIX_STEP)],
        KeyCode::Char('v') => vec![InputEvent::NextReverbPreset],
        KeyCode::Char('u') => vec![InputEvent::AdjustPitchUp(-PITCH_STEP)],
        KeyCode::Char('U') => vec![InputEvent::AdjustPitchUp(PITCH_STEP)],
        // pitch-down is negative cents, so "up" moves it further from zero
        KeyCode::Char('j') => vec![InputEvent::AdjustPitchDown(PITCH_STEP)],
        KeyCode::Char('J') => vec![InputEvent::AdjustPitchDown(-PITCH_STEP)],
        KeyCode::Char('l') => vec![InputEvent::AdjustSlowRate(-RATE_STEP)],
        KeyCode::Char('L') => vec![InputEvent::AdjustSlowRate(RATE_STEP)],
        KeyCode::Char('f') => vec![InputEvent::AdjustAccelerateRate(-RATE_STEP)],
        KeyCode::Char('F') => vec![InputEvent::AdjustAccelerateRate(RATE_STEP)],

        KeyCode::Char('i') => vec![InputEvent::ImportPersonal],

        _ => vec![],
    }
}
