// Decoding of the raw strings the board notifies. Nothing here fails: a bad
// payload degrades to a safe default and the next notification fixes it.

use crate::shared::SLOT_COUNT;

/// One card id per board slot, slot 1 at index 0.
pub type Slots = [i32; SLOT_COUNT];

pub const EMPTY_SLOTS: Slots = [0; SLOT_COUNT];

pub const DEFAULT_VOLUME_PERCENT: u8 = 100;

// volume writes may arrive padded with NULs
fn trim_payload(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_ascii_whitespace() || c == '\0')
}

/// Decode a slot notification such as `"105000"` into card ids.
///
/// Each character is one decimal digit, position-preserving. Anything other
/// than exactly six digits, padding included, decodes to six empty slots.
pub fn decode_slots(payload: &str) -> Slots {
    if payload.len() != SLOT_COUNT || !payload.bytes().all(|b| b.is_ascii_digit()) {
        return EMPTY_SLOTS;
    }
    let mut slots = EMPTY_SLOTS;
    for (slot, b) in slots.iter_mut().zip(payload.bytes()) {
        *slot = (b - b'0') as i32;
    }
    slots
}

/// Encode slots back to the wire form. Ids outside 0..=9 are written as `0`.
pub fn encode_slots(slots: &Slots) -> String {
    slots
        .iter()
        .map(|&id| {
            u32::try_from(id)
                .ok()
                .and_then(|d| char::from_digit(d, 10))
                .unwrap_or('0')
        })
        .collect()
}

/// Decode a volume notification (integer percentage). Unparseable means 100.
pub fn decode_volume(raw: &str) -> u8 {
    trim_payload(raw)
        .parse::<i64>()
        .map(|v| v.clamp(0, 100) as u8)
        .unwrap_or(DEFAULT_VOLUME_PERCENT)
}
