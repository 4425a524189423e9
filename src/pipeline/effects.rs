// Effect parameters and how the active cards turn them into node values.

use serde::{Deserialize, Serialize};

use crate::audio::ReverbPreset;
use super::catalog::{Card, EffectKind};

pub const NEUTRAL_RATE: f32 = 1.0;
pub const NEUTRAL_PITCH: f32 = 0.0;

/// User-adjustable effect values. Written by the control surface, read
/// whenever the active cards change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectParams {
    pub volume: f32,
    pub reverb_preset: ReverbPreset,
    pub reverb_wet_dry: f32,   // percent
    pub accelerate_rate: f32,  // > 1
    pub slow_rate: f32,        // < 1
    pub pitch_up_cents: f32,   // >= 0
    pub pitch_down_cents: f32, // <= 0
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            volume: 1.0,
            reverb_preset: ReverbPreset::Cathedral,
            reverb_wet_dry: 50.0,
            accelerate_rate: 1.3,
            slow_rate: 0.7,
            pitch_up_cents: 400.0,
            pitch_down_cents: -400.0,
        }
    }
}

/// Which effect cards are present, independent of how many of each.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActiveEffects {
    pub reverb: bool,
    pub slow: bool,
    pub accelerate: bool,
    pub pitch_up: bool,
    pub pitch_down: bool,
}

impl ActiveEffects {
    pub fn from_cards<'a>(cards: impl IntoIterator<Item = &'a Card>) -> Self {
        let mut active = Self::default();
        for kind in cards.into_iter().filter_map(|c| c.kind.effect()) {
            match kind {
                EffectKind::Reverb => active.reverb = true,
                EffectKind::Slow => active.slow = true,
                EffectKind::Accelerate => active.accelerate = true,
                EffectKind::PitchUp => active.pitch_up = true,
                EffectKind::PitchDown => active.pitch_down = true,
            }
        }
        active
    }

    #[cfg(test)]
    pub fn contains(&self, kind: EffectKind) -> bool {
        match kind {
            EffectKind::Reverb => self.reverb,
            EffectKind::Slow => self.slow,
            EffectKind::Accelerate => self.accelerate,
            EffectKind::PitchUp => self.pitch_up,
            EffectKind::PitchDown => self.pitch_down,
        }
    }

    // both pitch directions present cancel each other out
    pub fn pitch_cancelled(&self) -> bool {
        self.pitch_up && self.pitch_down
    }

    pub fn rate_cancelled(&self) -> bool {
        self.slow && self.accelerate
    }
}

/// Node values derived from the active cards for one update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedEffects {
    pub reverb_mix: f32,
    pub pitch: f32,
    pub rate: f32,
}

impl EffectParams {
    pub fn resolve(&self, active: &ActiveEffects) -> ResolvedEffects {
        let reverb_mix = if active.reverb { self.reverb_wet_dry } else { 0.0 };

        let pitch = match (active.pitch_up, active.pitch_down) {
            (true, false) => self.pitch_up_cents,
            (false, true) => self.pitch_down_cents,
            _ => NEUTRAL_PITCH,
        };

        let rate = match (active.slow, active.accelerate) {
            (true, false) => self.slow_rate,
            (false, true) => self.accelerate_rate,
            _ => NEUTRAL_RATE,
        };

        ResolvedEffects { reverb_mix, pitch, rate }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::catalog::CardCatalog;

    fn active(ids: &[i32]) -> ActiveEffects {
        let catalog = CardCatalog::builtin();
        ActiveEffects::from_cards(ids.iter().filter_map(|&id| catalog.get(id)))
    }

    #[test]
    fn nothing_active_is_neutral() {
        let r = EffectParams::default().resolve(&active(&[1, 3, 0]));
        assert_eq!(r, ResolvedEffects { reverb_mix: 0.0, pitch: 0.0, rate: 1.0 });
    }

    #[test]
    fn single_cards_apply_their_values() {
        let params = EffectParams::default();
        assert_eq!(params.resolve(&active(&[5])).reverb_mix, 50.0);
        assert_eq!(params.resolve(&active(&[2])).pitch, 400.0);
        assert_eq!(params.resolve(&active(&[6])).pitch, -400.0);
        assert_eq!(params.resolve(&active(&[8])).rate, 0.7);
        assert_eq!(params.resolve(&active(&[9])).rate, 1.3);
    }

    #[test]
    fn opposing_pairs_cancel() {
        let params = EffectParams::default();
        let both = active(&[2, 6, 8, 9]);
        assert!(both.pitch_cancelled());
        assert!(both.rate_cancelled());
        let r = params.resolve(&both);
        assert_eq!(r.pitch, NEUTRAL_PITCH);
        assert_eq!(r.rate, NEUTRAL_RATE);
    }

    #[test]
    fn duplicates_count_once() {
        let a = active(&[2, 2, 5, 5]);
        assert!(a.pitch_up && a.reverb && !a.pitch_down);
        assert!(a.contains(EffectKind::PitchUp));
        assert!(!a.contains(EffectKind::Slow));
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let p: EffectParams =
            serde_json::from_str(r#"{ "slow_rate": 0.5, "reverb_preset": "small_room" }"#).unwrap();
        assert_eq!(p.slow_rate, 0.5);
        assert_eq!(p.reverb_preset, ReverbPreset::SmallRoom);
        assert_eq!(p.pitch_up_cents, 400.0);
    }
}
