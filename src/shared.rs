// Types shared between the terminal control surface and the control loop.
//
// Keys (see tui/input.rs):
//   Left Right     move the slot cursor (simulated placement)
//   0-9            drop card <digit> into the slot under the cursor
//   s              shuffle random cards into all slots
//   , .            board volume knob down / up
//   p c d r        pair / connect / disconnect / remove the board
//   [ ]            volume down / up
//   - =            reverb mix down / up
//   v              next reverb preset
//   u U            pitch-up amount down / up
//   j J            pitch-down amount down / up
//   l L            slow rate down / up
//   f F            accelerate rate down / up
//   i              import the first recording found in the import dir
//   Esc            quit
//
// The control loop owns all state; the TUI renders the DisplayState it
// gets back every frame and never reaches into the pipeline itself.

use crate::audio::ReverbPreset;
use crate::peripheral::LinkCommand;
use crate::pipeline::{EffectKind, TrackKind};

pub const SLOT_COUNT: usize = 6;

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    // board link
    Link(LinkCommand),

    // simulated board
    PlaceCard { slot: usize, card: i32 },
    ShuffleSlots,
    AdjustBoardVolume(i16), // percentage points

    // parameter knobs, deltas in the parameter's own unit
    AdjustVolume(f32),
    AdjustReverbMix(f32),
    NextReverbPreset,
    AdjustPitchUp(f32),
    AdjustPitchDown(f32),
    AdjustSlowRate(f32),
    AdjustAccelerateRate(f32),

    ImportPersonal,
    Quit,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SlotView {
    pub card_id: u8,
    pub name: &'static str,
    pub icon: &'static str,
    pub occupied: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayState {
    pub connected: bool,
    pub slots: Vec<SlotView>, // slot 1 first
    pub selected_slot: Option<usize>,
    pub tracks: [(TrackKind, bool); TrackKind::COUNT], // (track, playing)
    pub effects: Vec<(EffectKind, bool)>,              // (effect, card present)
    pub volume: f32,
    pub board_volume: u8, // last percentage reported by the board
    pub reverb_preset: ReverbPreset,
    pub reverb_mix: f32,
    pub pitch_up: f32,
    pub pitch_down: f32,
    pub slow_rate: f32,
    pub accelerate_rate: f32,
    pub applied_pitch: f32,
    pub applied_rate: f32,
    pub import_required: bool,
    pub status: String,
}
