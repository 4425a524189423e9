// Turns a slot list into the active card sequence and hands the resulting set
// to the graph controller. Also owns the personal-recording import gate.

use std::path::PathBuf;

use crate::audio::AudioGraph;
use crate::shared::SLOT_COUNT;

use super::catalog::{Card, CardCatalog, EffectKind, TrackKind};
use super::controller::GraphController;
use super::slots::Slots;

pub struct MixerOrchestrator<G: AudioGraph> {
    catalog: CardCatalog,
    controller: GraphController<G>,
    active_cards: Vec<&'static Card>, // always SLOT_COUNT long, slot 1 at index 0
    personal_source: Option<PathBuf>,
    import_required: bool,
}

impl<G: AudioGraph> MixerOrchestrator<G> {
    pub fn new(catalog: CardCatalog, controller: GraphController<G>) -> Self {
        let empty = catalog.empty();
        Self {
            catalog,
            controller,
            active_cards: vec![empty; SLOT_COUNT],
            personal_source: None,
            import_required: false,
        }
    }

    /// Run one update cycle for a fresh slot reading. Same input, same result.
    pub fn update_active_cards(&mut self, slots: &Slots) {
        // unknown ids become the empty sentinel so positions never shift
        let empty = self.catalog.empty();
        self.active_cards = slots
            .iter()
            .map(|&id| self.catalog.get(id).unwrap_or(empty))
            .collect();

        let wants_personal = self
            .active_cards
            .iter()
            .any(|c| c.kind.track() == Some(TrackKind::Personal));

        if wants_personal {
            match &self.personal_source {
                Some(source) => {
                    self.controller.set_personal_source(Some(source.clone()));
                    self.import_required = false;
                }
                None => {
                    if !self.import_required {
                        log::info!("personal card placed, waiting for a recording import");
                    }
                    self.import_required = true;
                }
            }
        } else {
            self.personal_source = None;
            self.controller.set_personal_source(None);
            self.import_required = false;
        }

        let set = self.card_set();
        self.controller.apply_card_set(&set);
    }

    /// Resolve a pending import with a recording on disk. Re-applies the current
    /// cards so the personal track starts straight away.
    pub fn supply_personal_recording(&mut self, path: PathBuf) {
        log::info!("personal recording set to {}", path.display());
        self.personal_source = Some(path);
        let slots = self.current_slots();
        self.update_active_cards(&slots);
    }

    // distinct cards in slot order, so the lowest slot wins a track
    fn card_set(&self) -> Vec<&'static Card> {
        let mut set: Vec<&'static Card> = Vec::with_capacity(SLOT_COUNT);
        for &card in &self.active_cards {
            if !set.iter().any(|c| c.id == card.id) {
                set.push(card);
            }
        }
        set
    }

    fn current_slots(&self) -> Slots {
        let mut slots = [0; SLOT_COUNT];
        for (slot, card) in slots.iter_mut().zip(&self.active_cards) {
            *slot = card.id as i32;
        }
        slots
    }

    pub fn active_cards(&self) -> &[&'static Card] {
        &self.active_cards
    }

    /// Card in board slot `slot` (1-based).
    pub fn card_in_slot(&self, slot: usize) -> Option<&'static Card> {
        slot.checked_sub(1).and_then(|i| self.active_cards.get(i)).copied()
    }

    pub fn is_slot_occupied(&self, slot: usize) -> bool {
        self.card_in_slot(slot).is_some_and(|c| !c.kind.is_empty())
    }

    pub fn is_effect_active(&self, kind: EffectKind) -> bool {
        self.active_cards.iter().any(|c| c.kind.effect() == Some(kind))
    }

    pub fn import_required(&self) -> bool {
        self.import_required
    }

    #[cfg(test)]
    pub fn personal_source(&self) -> Option<&std::path::Path> {
        self.personal_source.as_deref()
    }

    pub fn controller(&self) -> &GraphController<G> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut GraphController<G> {
        &mut self.controller
    }
}
