pub mod catalog;
pub mod controller;
pub mod effects;
pub mod mixer;
pub mod slots;

#[cfg(test)]
pub mod test_fixture;

pub use catalog::{Card, CardCatalog, CardType, EffectKind, TrackKind};
pub use controller::GraphController;
pub use effects::EffectParams;
pub use mixer::MixerOrchestrator;
pub use slots::{Slots, decode_slots, decode_volume};
