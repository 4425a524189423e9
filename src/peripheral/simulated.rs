// A stand-in for the real board: same events, same link commands, driven by
// keyboard placement or a shuffle timer instead of a radio.

use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::Context;
use crossbeam_channel::{Receiver, Sender};
use rand::Rng;

use crate::pipeline::slots::{Slots, encode_slots, EMPTY_SLOTS};
use crate::shared::SLOT_COUNT;

use super::{LinkCommand, PeripheralEvent, PeripheralLink};

const MAX_CARD_DIGIT: i32 = 9;

#[derive(Clone, Debug)]
enum SimCommand {
    Link(LinkCommand),
    Place { slot: usize, card: i32 },
    SetVolume(u8),
    Shuffle,
    Shutdown,
}

#[derive(Clone, Debug)]
struct BoardState {
    paired: bool,
    connected: bool,
    slots: Slots,
    volume: u8,
}

impl Default for BoardState {
    fn default() -> Self {
        Self { paired: false, connected: false, slots: EMPTY_SLOTS, volume: 100 }
    }
}

impl BoardState {
    // what a fresh connection reads from both characteristics
    fn announce(&self, out: &mut Vec<PeripheralEvent>) {
        out.push(PeripheralEvent::SlotsUpdated(encode_slots(&self.slots)));
        out.push(PeripheralEvent::VolumeUpdated(self.volume.to_string()));
    }

    fn handle(&mut self, cmd: SimCommand) -> Vec<PeripheralEvent> {
        let mut out = Vec::new();
        match cmd {
            SimCommand::Link(LinkCommand::PresentPairingPicker) => {
                self.paired = true;
                if !self.connected {
                    self.connected = true;
                    out.push(PeripheralEvent::Connected);
                    self.announce(&mut out);
                }
            }
            SimCommand::Link(LinkCommand::Connect) => {
                if !self.paired {
                    out.push(PeripheralEvent::TransportError("no paired board to connect to".into()));
                } else if !self.connected {
                    self.connected = true;
                    out.push(PeripheralEvent::Connected);
                    self.announce(&mut out);
                }
            }
            SimCommand::Link(LinkCommand::Disconnect) => {
                if self.connected {
                    self.connected = false;
                    out.push(PeripheralEvent::Disconnected);
                }
            }
            SimCommand::Link(LinkCommand::RemovePeripheral) => {
                if self.connected {
                    self.connected = false;
                    out.push(PeripheralEvent::Disconnected);
                }
                self.paired = false;
            }
            SimCommand::Place { slot, card } => {
                if slot < SLOT_COUNT {
                    self.slots[slot] = card.clamp(0, MAX_CARD_DIGIT);
                    if self.connected {
                        out.push(PeripheralEvent::SlotsUpdated(encode_slots(&self.slots)));
                    }
                }
            }
            SimCommand::SetVolume(v) => {
                self.volume = v.min(100);
                if self.connected {
                    out.push(PeripheralEvent::VolumeUpdated(self.volume.to_string()));
                }
            }
            SimCommand::Shuffle => {
                let mut rng = rand::thread_rng();
                for slot in self.slots.iter_mut() {
                    *slot = rng.gen_range(0..=MAX_CARD_DIGIT);
                }
                if self.connected {
                    out.push(PeripheralEvent::SlotsUpdated(encode_slots(&self.slots)));
                }
            }
            SimCommand::Shutdown => {}
        }
        out
    }
}

fn run_board(rx: Receiver<SimCommand>, events: Sender<PeripheralEvent>, shuffle_every: Option<Duration>) {
    let ticker = match shuffle_every {
        Some(every) => crossbeam_channel::tick(every),
        None => crossbeam_channel::never(),
    };
    let mut state = BoardState::default();
    loop {
        let cmd = crossbeam_channel::select! {
            recv(rx) -> msg => match msg {
                Ok(cmd) => cmd,
                Err(_) => break, // handle dropped
            },
            recv(ticker) -> _ => SimCommand::Shuffle,
        };
        if matches!(cmd, SimCommand::Shutdown) {
            break;
        }
        for event in state.handle(cmd) {
            if events.send(event).is_err() {
                return; // control loop is gone
            }
        }
    }
    log::debug!("simulated board stopped");
}

/// In-process board running on its own thread.
pub struct SimulatedBoard {
    tx: Sender<SimCommand>,
    worker: Option<JoinHandle<()>>,
}

impl SimulatedBoard {
    pub fn spawn(events: Sender<PeripheralEvent>, shuffle_every: Option<Duration>) -> anyhow::Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let worker = std::thread::Builder::new()
            .name("tuneboard-sim".into())
            .spawn(move || run_board(rx, events, shuffle_every))
            .context("failed to start simulated board")?;
        Ok(Self { tx, worker: Some(worker) })
    }

    fn send(&self, cmd: SimCommand) -> anyhow::Result<()> {
        self.tx.send(cmd).context("simulated board is not running")
    }

    /// Put `card` into slot `slot` (0-based), as if a card was dropped in.
    pub fn place_card(&self, slot: usize, card: i32) -> anyhow::Result<()> {
        self.send(SimCommand::Place { slot, card })
    }

    pub fn set_volume(&self, percent: u8) -> anyhow::Result<()> {
        self.send(SimCommand::SetVolume(percent))
    }

    pub fn shuffle(&self) -> anyhow::Result<()> {
        self.send(SimCommand::Shuffle)
    }
}

impl PeripheralLink for SimulatedBoard {
    fn present_pairing_picker(&mut self) -> anyhow::Result<()> {
        self.send(SimCommand::Link(LinkCommand::PresentPairingPicker))
    }

    fn connect(&mut self) -> anyhow::Result<()> {
        self.send(SimCommand::Link(LinkCommand::Connect))
    }

    fn disconnect(&mut self) -> anyhow::Result<()> {
        self.send(SimCommand::Link(LinkCommand::Disconnect))
    }

    fn remove_peripheral(&mut self) -> anyhow::Result<()> {
        self.send(SimCommand::Link(LinkCommand::RemovePeripheral))
    }
}

impl Drop for SimulatedBoard {
    fn drop(&mut self) {
        let _ = self.tx.send(SimCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
