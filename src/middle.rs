// The control domain: every peripheral event and every control-surface event
// lands here, one at a time, and is run to completion before the next.

use std::path::PathBuf;

use crate::audio::AudioGraph;
use crate::loader::sample_loader;
use crate::peripheral::{ConnectionTracker, PeripheralEvent};
use crate::pipeline::slots::{DEFAULT_VOLUME_PERCENT, EMPTY_SLOTS};
use crate::pipeline::{EffectKind, MixerOrchestrator, TrackKind, decode_slots, decode_volume};
use crate::shared::{DisplayState, InputEvent, SLOT_COUNT, SlotView};

const PITCH_STEP_LIMIT: f32 = 2400.0;
const MIN_RATE: f32 = 0.25;
const MAX_RATE: f32 = 4.0;

pub struct Middle<G: AudioGraph> {
    mixer: MixerOrchestrator<G>,
    connection: ConnectionTracker,
    board_volume: u8,
    volume_ceiling: f32, // mixer volume at 100% on the board knob
    import_dir: Option<PathBuf>,
    status: String,
}

impl<G: AudioGraph> Middle<G> {
    pub fn new(mixer: MixerOrchestrator<G>, volume_ceiling: f32, import_dir: Option<PathBuf>) -> Self {
        Self {
            mixer,
            connection: ConnectionTracker::default(),
            board_volume: DEFAULT_VOLUME_PERCENT,
            volume_ceiling,
            import_dir,
            status: String::from("waiting for board"),
        }
    }

    pub fn mixer(&self) -> &MixerOrchestrator<G> {
        &self.mixer
    }

    #[cfg(test)]
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn handle_peripheral(&mut self, event: PeripheralEvent) {
        match event {
            PeripheralEvent::Connected => {
                if self.connection.observe(true).is_some() {
                    log::info!("board connected");
                    self.status = "board connected".into();
                }
            }
            PeripheralEvent::Disconnected => {
                if self.connection.observe(false).is_some() {
                    log::info!("board disconnected, clearing cards");
                    self.status = "board disconnected".into();
                    self.mixer.update_active_cards(&EMPTY_SLOTS);
                }
            }
            PeripheralEvent::SlotsUpdated(raw) => {
                let slots = decode_slots(&raw);
                log::debug!("slots {raw:?} -> {slots:?}");
                self.mixer.update_active_cards(&slots);
            }
            PeripheralEvent::VolumeUpdated(raw) => {
                self.board_volume = decode_volume(&raw);
                let volume = self.board_volume as f32 / 100.0 * self.volume_ceiling;
                self.mixer.controller_mut().set_volume(volume);
            }
            PeripheralEvent::TransportError(e) => {
                log::warn!("board transport error: {e}");
                self.status = format!("board error: {e}");
            }
        }
    }

    /// Parameter and import events. Link and simulation events belong to
    /// whoever owns the board and are ignored here.
    pub fn handle_input(&mut self, event: InputEvent) {
        if event == InputEvent::ImportPersonal {
            self.import_personal();
            return;
        }
        let params = self.mixer.controller().params().clone();
        let ctl = self.mixer.controller_mut();
        match event {
            InputEvent::AdjustVolume(d) => ctl.set_volume((params.volume + d).clamp(0.0, 1.0)),
            InputEvent::AdjustReverbMix(d) => ctl.set_reverb_mix(params.reverb_wet_dry + d),
            InputEvent::NextReverbPreset => ctl.set_reverb_preset(params.reverb_preset.next()),
            InputEvent::AdjustPitchUp(d) => {
                ctl.set_pitch_up((params.pitch_up_cents + d).clamp(0.0, PITCH_STEP_LIMIT))
            }
            InputEvent::AdjustPitchDown(d) => {
                ctl.set_pitch_down((params.pitch_down_cents + d).clamp(-PITCH_STEP_LIMIT, 0.0))
            }
            InputEvent::AdjustSlowRate(d) => ctl.set_slow_rate((params.slow_rate + d).clamp(MIN_RATE, 1.0)),
            InputEvent::AdjustAccelerateRate(d) => {
                ctl.set_accelerate_rate((params.accelerate_rate + d).clamp(1.0, MAX_RATE))
            }
            InputEvent::Link(_)
            | InputEvent::PlaceCard { .. }
            | InputEvent::ShuffleSlots
            | InputEvent::AdjustBoardVolume(_)
            | InputEvent::ImportPersonal
            | InputEvent::Quit => {}
        }
    }

    // stands in for a file picker: first recording in the import dir
    fn import_personal(&mut self) {
        let Some(dir) = self.import_dir.as_deref() else {
            self.status = "no import directory configured".into();
            return;
        };
        match sample_loader::index_wav_in_dir(dir) {
            Ok(paths) => match paths.into_iter().next() {
                Some(path) => {
                    self.status = format!("imported {}", path.display());
                    self.mixer.supply_personal_recording(path);
                }
                None => self.status = format!("no .wav files in {}", dir.display()),
            },
            Err(e) => {
                log::warn!("cannot read import dir {}: {e}", dir.display());
                self.status = format!("cannot read {}", dir.display());
            }
        }
    }

    pub fn display_state(&self, selected_slot: Option<usize>) -> DisplayState {
        let ctl = self.mixer.controller();
        let params = ctl.params();
        let graph = ctl.graph();
        DisplayState {
            connected: self.connection.is_connected(),
            slots: (1..=SLOT_COUNT)
                .filter_map(|n| {
                    let card = self.mixer.card_in_slot(n)?;
                    Some(SlotView {
                        card_id: card.id,
                        name: card.name,
                        icon: card.icon,
                        occupied: self.mixer.is_slot_occupied(n),
                    })
                })
                .collect(),
            selected_slot,
            tracks: TrackKind::ALL.map(|t| (t, ctl.is_playing(t))),
            effects: EffectKind::ALL
                .iter()
                .map(|&k| (k, self.mixer.is_effect_active(k)))
                .collect(),
            volume: params.volume,
            board_volume: self.board_volume,
            reverb_preset: params.reverb_preset,
            reverb_mix: params.reverb_wet_dry,
            pitch_up: params.pitch_up_cents,
            pitch_down: params.pitch_down_cents,
            slow_rate: params.slow_rate,
            accelerate_rate: params.accelerate_rate,
            applied_pitch: graph.pitch(),
            applied_rate: graph.rate(),
            import_required: self.mixer.import_required(),
            status: self.status.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioGraph;
    use crate::pipeline::CardCatalog;
    use crate::pipeline::test_fixture::{FakeGraph, fixture_controller, write_wav};
    use approx::assert_relative_eq;

    fn fixture(import_dir: Option<PathBuf>) -> (tempfile::TempDir, Middle<FakeGraph>) {
        let (dir, ctl) = fixture_controller();
        let mixer = MixerOrchestrator::new(CardCatalog::builtin(), ctl);
        (dir, Middle::new(mixer, 0.395, import_dir))
    }

    fn graph(m: &Middle<FakeGraph>) -> &FakeGraph {
        m.mixer().controller().graph()
    }

    #[test]
    fn slot_notifications_drive_the_mixer() {
        let (_dir, mut m) = fixture(None);
        m.handle_peripheral(PeripheralEvent::Connected);
        m.handle_peripheral(PeripheralEvent::SlotsUpdated("130000".into()));
        assert!(graph(&m).is_playing(TrackKind::Groove));
        assert!(graph(&m).is_playing(TrackKind::Melody));

        m.handle_peripheral(PeripheralEvent::SlotsUpdated("garbage".into()));
        assert!(!graph(&m).is_playing(TrackKind::Groove));
        assert!(m.mixer().active_cards().iter().all(|c| c.kind.is_empty()));
    }

    #[test]
    fn disconnect_silences_everything_once() {
        let (_dir, mut m) = fixture(None);
        m.handle_peripheral(PeripheralEvent::Connected);
        m.handle_peripheral(PeripheralEvent::SlotsUpdated("100000".into()));
        m.handle_peripheral(PeripheralEvent::Disconnected);
        assert!(!m.is_connected());
        assert!(!graph(&m).is_playing(TrackKind::Groove));
        assert_eq!(m.display_state(None).status, "board disconnected");
    }

    #[test]
    fn board_volume_maps_through_ceiling() {
        let (_dir, mut m) = fixture(None);
        m.handle_peripheral(PeripheralEvent::VolumeUpdated("50".into()));
        assert_relative_eq!(graph(&m).nodes.volume, 0.1975, epsilon = 1e-6);
        m.handle_peripheral(PeripheralEvent::VolumeUpdated("??".into()));
        assert_relative_eq!(graph(&m).nodes.volume, 0.395, epsilon = 1e-6);
        assert_eq!(m.display_state(None).board_volume, 100);
    }

    #[test]
    fn transport_errors_only_update_status() {
        let (_dir, mut m) = fixture(None);
        m.handle_peripheral(PeripheralEvent::TransportError("read failed".into()));
        assert!(!m.is_connected());
        assert!(m.display_state(None).status.contains("read failed"));
    }

    #[test]
    fn knobs_adjust_params_within_range() {
        let (_dir, mut m) = fixture(None);
        m.handle_input(InputEvent::AdjustVolume(5.0));
        m.handle_input(InputEvent::AdjustPitchDown(500.0));
        m.handle_input(InputEvent::AdjustSlowRate(-10.0));
        m.handle_input(InputEvent::AdjustAccelerateRate(0.2));
        m.handle_input(InputEvent::AdjustReverbMix(-20.0));
        m.handle_input(InputEvent::NextReverbPreset);
        let ds = m.display_state(None);
        assert_eq!(ds.volume, 1.0);
        assert_eq!(ds.pitch_down, 0.0);
        assert_eq!(ds.slow_rate, MIN_RATE);
        assert_relative_eq!(ds.accelerate_rate, 1.5, epsilon = 1e-6);
        assert_eq!(ds.reverb_mix, 30.0);
        assert_eq!(ds.reverb_preset, crate::audio::ReverbPreset::LargeHall);
    }

    #[test]
    fn import_resolves_pending_personal_card() {
        let imports = tempfile::tempdir().unwrap();
        write_wav(imports.path(), "voice_memo", 44100, 1, &[0.3; 20]);
        let (_dir, mut m) = fixture(Some(imports.path().to_path_buf()));

        m.handle_peripheral(PeripheralEvent::SlotsUpdated("700000".into()));
        assert!(m.display_state(None).import_required);

        m.handle_input(InputEvent::ImportPersonal);
        let ds = m.display_state(None);
        assert!(!ds.import_required);
        assert!(ds.tracks[TrackKind::Personal.index()].1);
    }

    #[test]
    fn import_without_files_reports_status() {
        let imports = tempfile::tempdir().unwrap();
        let (_dir, mut m) = fixture(Some(imports.path().to_path_buf()));
        m.handle_input(InputEvent::ImportPersonal);
        assert!(m.display_state(None).status.starts_with("no .wav files"));

        let (_dir, mut m) = fixture(None);
        m.handle_input(InputEvent::ImportPersonal);
        assert_eq!(m.display_state(None).status, "no import directory configured");
    }

    #[test]
    fn display_reflects_slots_and_effects() {
        let (_dir, mut m) = fixture(None);
        m.handle_peripheral(PeripheralEvent::SlotsUpdated("052000".into()));
        let ds = m.display_state(Some(2));
        assert_eq!(ds.slots.len(), 6);
        assert_eq!(ds.slots[1].name, "Reverb");
        assert!(ds.slots[1].occupied && !ds.slots[0].occupied);
        assert!(ds.effects.contains(&(EffectKind::Reverb, true)));
        assert!(ds.effects.contains(&(EffectKind::Slow, false)));
        assert_eq!(ds.applied_pitch, 400.0);
        assert_eq!(ds.selected_slot, Some(2));
    }
}
