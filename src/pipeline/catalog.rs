// The card data the board can report. Pure data; the orchestrator joins slot ids
// against this table.

/// One playback channel in the audio graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Melody,
    Harmony,
    Groove,
    Personal, // user-imported recording, no bundled asset
}

impl TrackKind {
    pub const ALL: [TrackKind; 4] = [
        TrackKind::Melody,
        TrackKind::Harmony,
        TrackKind::Groove,
        TrackKind::Personal,
    ];

    pub const COUNT: usize = Self::ALL.len();

    // stable index into per-track arrays (players, display rows)
    pub fn index(self) -> usize {
        match self {
            TrackKind::Melody => 0,
            TrackKind::Harmony => 1,
            TrackKind::Groove => 2,
            TrackKind::Personal => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrackKind::Melody => "MELODY",
            TrackKind::Harmony => "HARMONY",
            TrackKind::Groove => "GROOVE",
            TrackKind::Personal => "PERSONAL",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Reverb,
    Slow,
    Accelerate,
    PitchUp,
    PitchDown,
}

impl EffectKind {
    pub const ALL: [EffectKind; 5] = [
        EffectKind::Reverb,
        EffectKind::Slow,
        EffectKind::Accelerate,
        EffectKind::PitchUp,
        EffectKind::PitchDown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EffectKind::Reverb => "REVERB",
            EffectKind::Slow => "SLOW",
            EffectKind::Accelerate => "FAST",
            EffectKind::PitchUp => "PITCH+",
            EffectKind::PitchDown => "PITCH-",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CardType {
    Instrument { asset: &'static str, track: TrackKind },
    Effect(EffectKind),
    Empty,
}

impl CardType {
    pub fn track(&self) -> Option<TrackKind> {
        match self {
            CardType::Instrument { track, .. } => Some(*track),
            _ => None,
        }
    }

    pub fn effect(&self) -> Option<EffectKind> {
        match self {
            CardType::Effect(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn asset(&self) -> Option<&'static str> {
        match self {
            CardType::Instrument { asset, .. } => Some(*asset),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CardType::Empty)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Card {
    pub id: u8,
    pub kind: CardType,
    pub name: &'static str,
    pub icon: &'static str,
}

pub const EMPTY_CARD_ID: u8 = 0;

// Ids are what the board writes into its slot characteristic, one digit each.
static CARDS: [Card; 10] = [
    Card { id: EMPTY_CARD_ID, kind: CardType::Empty, name: "Empty", icon: "·" },
    Card {
        id: 1,
        kind: CardType::Instrument { asset: "01_Groove", track: TrackKind::Groove },
        name: "Drums & Bass",
        icon: "⚡",
    },
    Card { id: 2, kind: CardType::Effect(EffectKind::PitchUp), name: "Pitch Up", icon: "▲" },
    Card {
        id: 3,
        kind: CardType::Instrument { asset: "01_Melody", track: TrackKind::Melody },
        name: "Melody",
        icon: "★",
    },
    Card {
        id: 4,
        kind: CardType::Instrument { asset: "01_Harmony", track: TrackKind::Harmony },
        name: "Harmony",
        icon: "✺",
    },
    Card { id: 5, kind: CardType::Effect(EffectKind::Reverb), name: "Reverb", icon: "∞" },
    Card { id: 6, kind: CardType::Effect(EffectKind::PitchDown), name: "Pitch Down", icon: "▼" },
    Card {
        id: 7,
        kind: CardType::Instrument { asset: "", track: TrackKind::Personal },
        name: "Recording",
        icon: "●",
    },
    Card { id: 8, kind: CardType::Effect(EffectKind::Slow), name: "Slow Down", icon: "«" },
    Card { id: 9, kind: CardType::Effect(EffectKind::Accelerate), name: "Speed Up", icon: "»" },
];

/// Lookup over the fixed card table.
#[derive(Clone, Copy, Debug)]
pub struct CardCatalog {
    cards: &'static [Card],
}

impl Default for CardCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CardCatalog {
    pub fn builtin() -> Self {
        Self { cards: &CARDS }
    }

    pub fn get(&self, id: i32) -> Option<&'static Card> {
        let id = u8::try_from(id).ok()?;
        self.cards.iter().find(|c| c.id == id)
    }

    #[cfg(test)]
    pub fn contains(&self, id: i32) -> bool {
        self.get(id).is_some()
    }

    /// The sentinel standing in for "no card in this slot".
    pub fn empty(&self) -> &'static Card {
        self.cards
            .iter()
            .find(|c| c.kind.is_empty())
            .unwrap_or(&CARDS[0])
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Card> {
        self.cards.iter()
    }
}
