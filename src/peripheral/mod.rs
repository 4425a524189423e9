//! Boundary to the paired board.
//!
//! Whatever owns the wireless session delivers [`PeripheralEvent`]s into the
//! control loop over a channel and accepts the four link commands of
//! [`PeripheralLink`]. Everything below that (pairing UI, transport framing)
//! lives on the other side of this module.

mod simulated;

pub use simulated::SimulatedBoard;

/// Events from the board, already moved off the transport's own thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PeripheralEvent {
    Connected,
    Disconnected,
    /// Raw slot characteristic, one ASCII digit per slot.
    SlotsUpdated(String),
    /// Raw volume characteristic, an integer percentage.
    VolumeUpdated(String),
    /// Connect failed, read failed, etc. Logged, never fatal.
    TransportError(String),
}

/// Outward commands. Fire-and-forget: the result is only logged.
pub trait PeripheralLink {
    fn present_pairing_picker(&mut self) -> anyhow::Result<()>;
    fn connect(&mut self) -> anyhow::Result<()>;
    fn disconnect(&mut self) -> anyhow::Result<()>;
    fn remove_peripheral(&mut self) -> anyhow::Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkCommand {
    PresentPairingPicker,
    Connect,
    Disconnect,
    RemovePeripheral,
}

impl LinkCommand {
    pub fn label(self) -> &'static str {
        match self {
            LinkCommand::PresentPairingPicker => "pair",
            LinkCommand::Connect => "connect",
            LinkCommand::Disconnect => "disconnect",
            LinkCommand::RemovePeripheral => "remove",
        }
    }
}

/// Issue `cmd` on `link`, logging the outcome.
pub fn dispatch(link: &mut dyn PeripheralLink, cmd: LinkCommand) {
    let result = match cmd {
        LinkCommand::PresentPairingPicker => link.present_pairing_picker(),
        LinkCommand::Connect => link.connect(),
        LinkCommand::Disconnect => link.disconnect(),
        LinkCommand::RemovePeripheral => link.remove_peripheral(),
    };
    match result {
        Ok(()) => log::debug!("link command {} issued", cmd.label()),
        Err(e) => log::warn!("link command {} failed: {e:#}", cmd.label()),
    }
}

/// Connection state as seen by the control loop. Repeated reports of the
/// same state are swallowed so each transition is announced once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectionTracker {
    connected: bool,
}

impl ConnectionTracker {
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Returns the new state if this report is an actual transition.
    pub fn observe(&mut self, connected: bool) -> Option<bool> {
        if self.connected == connected {
            return None;
        }
        self.connected = connected;
        Some(connected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_announces_transitions_once() {
        let mut t = ConnectionTracker::default();
        assert_eq!(t.observe(false), None);
        assert_eq!(t.observe(true), Some(true));
        assert_eq!(t.observe(true), None);
        assert!(t.is_connected());
        assert_eq!(t.observe(false), Some(false));
        assert_eq!(t.observe(false), None);
    }

    #[derive(Default)]
    struct ScriptedLink {
        calls: Vec<LinkCommand>,
        fail_connect: bool,
    }

    impl PeripheralLink for ScriptedLink {
        fn present_pairing_picker(&mut self) -> anyhow::Result<()> {
            self.calls.push(LinkCommand::PresentPairingPicker);
            Ok(())
        }
        fn connect(&mut self) -> anyhow::Result<()> {
            self.calls.push(LinkCommand::Connect);
            if self.fail_connect {
                anyhow::bail!("radio off");
            }
            Ok(())
        }
        fn disconnect(&mut self) -> anyhow::Result<()> {
            self.calls.push(LinkCommand::Disconnect);
            Ok(())
        }
        fn remove_peripheral(&mut self) -> anyhow::Result<()> {
            self.calls.push(LinkCommand::RemovePeripheral);
            Ok(())
        }
    }

    #[test]
    fn dispatch_routes_and_swallows_failures() {
        let mut link = ScriptedLink { fail_connect: true, ..Default::default() };
        for cmd in [
            LinkCommand::PresentPairingPicker,
            LinkCommand::Connect,
            LinkCommand::Disconnect,
            LinkCommand::RemovePeripheral,
        ] {
            dispatch(&mut link, cmd);
        }
        assert_eq!(
            link.calls,
            vec![
                LinkCommand::PresentPairingPicker,
                LinkCommand::Connect,
                LinkCommand::Disconnect,
                LinkCommand::RemovePeripheral,
            ]
        );
    }
}
