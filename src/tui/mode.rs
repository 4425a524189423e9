use crate::shared::SLOT_COUNT;

// state local to the tui: where the slot cursor sits.
// everything else is read back from DisplayState each frame
#[derive(Clone, Debug, Default)]
pub struct TuiState {
    pub slot_cursor: usize, // 0-based
}

impl TuiState {
    pub fn move_cursor(&mut self, delta: isize) {
        let n = SLOT_COUNT as isize;
        self.slot_cursor = (self.slot_cursor as isize + delta).rem_euclid(n) as usize;
    }
}
