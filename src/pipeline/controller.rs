// Drives the audio graph from a set of active cards. Owns the players (through
// the graph), the buffer cache and the effect parameters.

use std::path::PathBuf;
use std::sync::Arc;

use crate::audio::{AudioGraph, ReverbPreset};
use crate::loader::{AudioBufferCache, sample_loader};

use super::catalog::{Card, CardType, TrackKind};
use super::effects::{ActiveEffects, EffectParams, NEUTRAL_RATE};

pub struct GraphController<G: AudioGraph> {
    graph: G,
    cache: AudioBufferCache,
    params: EffectParams,
    cards: Vec<&'static Card>, // last applied set, consulted by the setter guards
    personal_source: Option<PathBuf>,
}

impl<G: AudioGraph> GraphController<G> {
    /// Take over a freshly built graph and bring its nodes to the neutral state
    /// for the given parameters.
    pub fn new(mut graph: G, cache: AudioBufferCache, params: EffectParams) -> Self {
        if cache.format() != graph.output_format() {
            log::warn!(
                "buffer cache decodes at {} Hz but the graph runs at {} Hz",
                cache.format().sample_rate,
                graph.output_format().sample_rate
            );
        }
        graph.set_mixer_volume(params.volume);
        graph.load_reverb_preset(params.reverb_preset);
        graph.set_reverb_mix(0.0);
        graph.set_pitch(0.0);
        graph.set_rate(NEUTRAL_RATE);
        Self {
            graph,
            cache,
            params,
            cards: Vec::new(),
            personal_source: None,
        }
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    #[cfg(test)]
    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    pub fn params(&self) -> &EffectParams {
        &self.params
    }

    #[cfg(test)]
    pub fn personal_source(&self) -> Option<&std::path::Path> {
        self.personal_source.as_deref()
    }

    pub fn set_personal_source(&mut self, source: Option<PathBuf>) {
        self.personal_source = source;
    }

    pub fn is_playing(&self, track: TrackKind) -> bool {
        self.graph.is_playing(track)
    }

    /// Bring tracks and effects in line with `cards`.
    pub fn apply_card_set(&mut self, cards: &[&'static Card]) {
        self.cards = cards.to_vec();
        self.reconcile_tracks();
        self.reconcile_effects();
    }

    fn reconcile_tracks(&mut self) {
        for track in TrackKind::ALL {
            // first match wins when two cards target the same track
            let card = self.cards.iter().copied().find(|c| c.kind.track() == Some(track));
            let playing = self.graph.is_playing(track);
            match card {
                Some(card) if !playing => self.start_track(track, card),
                None if playing => {
                    log::debug!("stopping {track:?}");
                    self.graph.stop(track);
                }
                _ => {} // already in the right state, never restart
            }
        }
    }

    fn start_track(&mut self, track: TrackKind, card: &Card) {
        if track == TrackKind::Personal {
            self.start_personal();
            return;
        }
        let CardType::Instrument { asset, .. } = card.kind else {
            return;
        };
        match self.cache.get(asset) {
            Ok(buffer) => {
                log::debug!("starting {track:?} with {asset}");
                self.graph.play_looping(track, buffer);
            }
            Err(e) => log::warn!("{track:?} stays silent: {e}"),
        }
    }

    // The recording is decoded fresh on every activation and starts from the top
    fn start_personal(&mut self) {
        let Some(source) = self.personal_source.as_deref() else {
            log::debug!("personal track has no recording yet");
            return;
        };
        match sample_loader::load(source, self.graph.output_format()) {
            Ok(buffer) => {
                log::info!("playing personal recording {}", source.display());
                self.graph.play_looping(TrackKind::Personal, Arc::new(buffer));
            }
            Err(e) => log::warn!("personal recording {} not played: {e}", source.display()),
        }
    }

    fn active_effects(&self) -> ActiveEffects {
        ActiveEffects::from_cards(self.cards.iter().copied())
    }

    fn reconcile_effects(&mut self) {
        let target = self.params.resolve(&self.active_effects());

        self.graph.set_reverb_mix(target.reverb_mix);

        if self.graph.pitch() != target.pitch {
            self.graph.set_pitch(target.pitch);
        }

        if self.graph.rate() != target.rate {
            // Going back to normal speed: the unit has to be reset first or it
            // keeps stale state, and the reset also wipes the pitch.
            if target.rate == NEUTRAL_RATE {
                self.graph.reset_time_pitch();
                self.graph.set_pitch(target.pitch);
            }
            self.graph.set_rate(target.rate);
        }
    }

    // ── control surface setters ─────────────────────────────────────

    pub fn set_volume(&mut self, volume: f32) {
        self.params.volume = volume.max(0.0);
        self.graph.set_mixer_volume(self.params.volume);
    }

    pub fn set_reverb_preset(&mut self, preset: ReverbPreset) {
        self.params.reverb_preset = preset;
        self.graph.load_reverb_preset(preset);
    }

    pub fn set_reverb_mix(&mut self, wet_dry: f32) {
        self.params.reverb_wet_dry = wet_dry.clamp(0.0, 100.0);
        self.graph.set_reverb_mix(self.params.reverb_wet_dry);
    }

    pub fn set_pitch_up(&mut self, cents: f32) {
        self.params.pitch_up_cents = cents;
        if cents >= 0.0 && !self.active_effects().pitch_cancelled() {
            self.graph.set_pitch(cents);
        }
    }

    pub fn set_pitch_down(&mut self, cents: f32) {
        self.params.pitch_down_cents = cents;
        if cents <= 0.0 && !self.active_effects().pitch_cancelled() {
            self.graph.set_pitch(cents);
        }
    }

    pub fn set_slow_rate(&mut self, rate: f32) {
        self.params.slow_rate = rate;
        if rate <= 1.0 && !self.active_effects().rate_cancelled() {
            self.graph.set_rate(rate);
        }
    }

    pub fn set_accelerate_rate(&mut self, rate: f32) {
        self.params.accelerate_rate = rate;
        if rate >= 1.0 && !self.active_effects().rate_cancelled() {
            self.graph.set_rate(rate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::catalog::CardCatalog;
    use crate::pipeline::test_fixture::{FakeGraph, GraphOp, fixture_controller, write_wav};

    fn cards(ids: &[i32]) -> Vec<&'static Card> {
        let catalog = CardCatalog::builtin();
        ids.iter().filter_map(|&id| catalog.get(id)).collect()
    }

    #[test]
    fn groove_card_starts_groove_loop_only() {
        let (_dir, mut ctl) = fixture_controller();
        ctl.apply_card_set(&cards(&[1, 0]));
        let g = ctl.graph();
        assert!(g.is_playing(TrackKind::Groove));
        assert!(!g.is_playing(TrackKind::Melody));
        assert_eq!(g.rate(), 1.0);
        assert_eq!(g.pitch(), 0.0);
        assert_eq!(g.nodes.reverb_mix, 0.0);
    }

    #[test]
    fn redundant_updates_do_not_restart() {
        let (_dir, mut ctl) = fixture_controller();
        ctl.apply_card_set(&cards(&[1, 3, 5]));
        let first = ctl.graph().nodes.clone();
        let starts = ctl.graph().count(|op| matches!(op, GraphOp::PlayLooping(_)));
        ctl.apply_card_set(&cards(&[1, 3, 5]));
        assert_eq!(ctl.graph().count(|op| matches!(op, GraphOp::PlayLooping(_))), starts);
        assert_eq!(ctl.graph().nodes, first);
    }

    #[test]
    fn removed_card_stops_its_track() {
        let (_dir, mut ctl) = fixture_controller();
        ctl.apply_card_set(&cards(&[1, 4]));
        ctl.apply_card_set(&cards(&[4]));
        assert!(!ctl.graph().is_playing(TrackKind::Groove));
        assert!(ctl.graph().is_playing(TrackKind::Harmony));
        assert_eq!(ctl.graph().count(|op| *op == GraphOp::Stop(TrackKind::Groove)), 1);
    }

    #[test]
    fn missing_asset_leaves_track_silent() {
        let (dir, mut ctl) = fixture_controller();
        std::fs::remove_file(dir.path().join("01_Melody.wav")).unwrap();
        ctl.apply_card_set(&cards(&[3, 1, 5]));
        assert!(!ctl.graph().is_playing(TrackKind::Melody));
        assert!(ctl.graph().is_playing(TrackKind::Groove));
        assert_eq!(ctl.graph().nodes.reverb_mix, 50.0);
    }

    #[test]
    fn personal_track_needs_a_source() {
        let (dir, mut ctl) = fixture_controller();
        ctl.apply_card_set(&cards(&[7]));
        assert!(!ctl.graph().is_playing(TrackKind::Personal));

        let path = write_wav(dir.path(), "my_take", 22050, 1, &[0.3; 64]);
        ctl.set_personal_source(Some(path));
        ctl.apply_card_set(&cards(&[7]));
        assert!(ctl.graph().is_playing(TrackKind::Personal));
        // converted to the graph rate
        assert_eq!(ctl.graph().last_buffer(TrackKind::Personal).unwrap().len(), 128);
    }

    #[test]
    fn unreadable_personal_source_aborts_silently() {
        let (dir, mut ctl) = fixture_controller();
        ctl.set_personal_source(Some(dir.path().join("gone.wav")));
        ctl.apply_card_set(&cards(&[7, 1]));
        assert!(!ctl.graph().is_playing(TrackKind::Personal));
        assert!(ctl.graph().is_playing(TrackKind::Groove));
    }

    #[test]
    fn pitch_pair_cancels() {
        let (_dir, mut ctl) = fixture_controller();
        ctl.apply_card_set(&cards(&[2]));
        assert_eq!(ctl.graph().pitch(), 400.0);
        ctl.apply_card_set(&cards(&[2, 6]));
        assert_eq!(ctl.graph().pitch(), 0.0);
        ctl.apply_card_set(&cards(&[6]));
        assert_eq!(ctl.graph().pitch(), -400.0);
    }

    #[test]
    fn rate_pair_cancels() {
        let (_dir, mut ctl) = fixture_controller();
        ctl.apply_card_set(&cards(&[8, 9]));
        assert_eq!(ctl.graph().rate(), 1.0);
        ctl.apply_card_set(&cards(&[9]));
        assert_eq!(ctl.graph().rate(), 1.3);
    }

    #[test]
    fn unchanged_pitch_is_not_rewritten() {
        let (_dir, mut ctl) = fixture_controller();
        ctl.apply_card_set(&cards(&[2]));
        ctl.graph_mut().clear_ops();
        ctl.apply_card_set(&cards(&[2, 1]));
        assert_eq!(ctl.graph().count(|op| matches!(op, GraphOp::SetPitch(_))), 0);
    }

    #[test]
    fn returning_to_normal_speed_resets_then_restores_pitch() {
        let (_dir, mut ctl) = fixture_controller();
        ctl.apply_card_set(&cards(&[8, 2]));
        assert_eq!(ctl.graph().rate(), 0.7);
        ctl.graph_mut().clear_ops();

        ctl.apply_card_set(&cards(&[2]));
        assert_eq!(
            ctl.graph().ops,
            vec![
                GraphOp::SetReverbMix(0.0),
                GraphOp::ResetTimePitch,
                GraphOp::SetPitch(400.0),
                GraphOp::SetRate(1.0),
            ]
        );
        assert_eq!(ctl.graph().pitch(), 400.0);
    }

    #[test]
    fn pitch_after_reset_is_the_new_target() {
        let (_dir, mut ctl) = fixture_controller();
        ctl.apply_card_set(&cards(&[9, 6]));
        ctl.apply_card_set(&cards(&[2]));
        assert_eq!(ctl.graph().rate(), 1.0);
        assert_eq!(ctl.graph().pitch(), 400.0);
    }

    #[test]
    fn leaving_speed_change_for_other_rate_does_not_reset() {
        let (_dir, mut ctl) = fixture_controller();
        ctl.apply_card_set(&cards(&[8]));
        ctl.graph_mut().clear_ops();
        ctl.apply_card_set(&cards(&[9]));
        assert_eq!(ctl.graph().count(|op| *op == GraphOp::ResetTimePitch), 0);
        assert_eq!(ctl.graph().rate(), 1.3);
    }

    #[test]
    fn pitch_setters_respect_cancellation() {
        let (_dir, mut ctl) = fixture_controller();
        ctl.apply_card_set(&cards(&[2, 6]));
        ctl.set_pitch_up(700.0);
        assert_eq!(ctl.graph().pitch(), 0.0);
        assert_eq!(ctl.params().pitch_up_cents, 700.0);

        ctl.apply_card_set(&cards(&[2]));
        assert_eq!(ctl.graph().pitch(), 700.0);
        ctl.set_pitch_up(-100.0); // wrong direction, stored but not applied
        assert_eq!(ctl.graph().pitch(), 700.0);
        ctl.set_pitch_down(-300.0);
        assert_eq!(ctl.graph().pitch(), -300.0);
    }

    #[test]
    fn rate_setters_respect_cancellation() {
        let (_dir, mut ctl) = fixture_controller();
        ctl.apply_card_set(&cards(&[8, 9]));
        ctl.set_slow_rate(0.5);
        ctl.set_accelerate_rate(1.8);
        assert_eq!(ctl.graph().rate(), 1.0);

        ctl.apply_card_set(&cards(&[8]));
        assert_eq!(ctl.graph().rate(), 0.5);
        ctl.set_accelerate_rate(0.9); // not an acceleration
        assert_eq!(ctl.graph().rate(), 0.5);
    }

    #[test]
    fn volume_and_reverb_pass_straight_through() {
        let (_dir, mut ctl) = fixture_controller();
        ctl.set_volume(0.25);
        ctl.set_reverb_preset(ReverbPreset::SmallRoom);
        ctl.set_reverb_mix(80.0);
        let nodes = &ctl.graph().nodes;
        assert_eq!(nodes.volume, 0.25);
        assert_eq!(nodes.reverb_preset, ReverbPreset::SmallRoom);
        assert_eq!(nodes.reverb_mix, 80.0);

        // next update re-derives the mix from the cards
        ctl.apply_card_set(&cards(&[1]));
        assert_eq!(ctl.graph().nodes.reverb_mix, 0.0);
        ctl.apply_card_set(&cards(&[5]));
        assert_eq!(ctl.graph().nodes.reverb_mix, 80.0);
    }

    #[test]
    fn new_controller_neutralises_graph() {
        let graph = FakeGraph::with_state(|n| {
            n.pitch = 300.0;
            n.rate = 2.0;
            n.reverb_mix = 90.0;
        });
        let dir = tempfile::tempdir().unwrap();
        let cache = AudioBufferCache::new(dir.path(), graph.output_format());
        let ctl = GraphController::new(graph, cache, EffectParams::default());
        assert_eq!(ctl.graph().pitch(), 0.0);
        assert_eq!(ctl.graph().rate(), 1.0);
        assert_eq!(ctl.graph().nodes.reverb_mix, 0.0);
        assert_eq!(ctl.graph().nodes.reverb_preset, ReverbPreset::Cathedral);
    }
}
