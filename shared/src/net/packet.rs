//! Framed messages exchanged between host and peers.

use super::{
    codec::{read_input_cmd, read_net_id, read_sync_state, write_input_cmd, write_net_id, write_sync_state},
    net_id::{EntityNetMap, NetId},
};
use crate::{error::WireError, input::InputCmd, mode::ModeRegistry, sync_state::SyncState};
use naia_serde::{BitReader, BitWrite, BitWriter, Serde, UnsignedVariableInteger};

type WireFrame = UnsignedVariableInteger<15>;

fn write_frame(writer: &mut dyn BitWrite, frame: u64) {
    WireFrame::new(frame).ser(writer);
}

fn read_frame(reader: &mut BitReader) -> Result<u64, WireError> {
    let raw = WireFrame::de(reader).map_err(|_| WireError::Truncated { field: "frame" })?;
    u64::try_from(raw.get()).map_err(|_| WireError::Truncated { field: "frame" })
}

/// Authoritative state of one mover at the end of `frame`.
#[derive(Clone, Debug, PartialEq)]
pub struct StatePacket {
    pub frame: u64,
    pub net_id: NetId,
    pub state: SyncState,
}

impl StatePacket {
    pub fn encode(&self, registry: &ModeRegistry, net: &dyn EntityNetMap) -> Result<Vec<u8>, WireError> {
        let mut writer = BitWriter::new();
        write_frame(&mut writer, self.frame);
        write_net_id(&mut writer, self.net_id);
        write_sync_state(&mut writer, &self.state, registry, net)?;
        Ok(writer.to_bytes().to_vec())
    }

    pub fn decode(bytes: &[u8], registry: &ModeRegistry, net: &dyn EntityNetMap) -> Result<Self, WireError> {
        let mut reader = BitReader::new(bytes);
        let frame = read_frame(&mut reader)?;
        let net_id = read_net_id(&mut reader)?;
        let state = read_sync_state(&mut reader, registry, net)?;
        Ok(Self { frame, net_id, state })
    }
}

/// Input a peer produced for `frame`.
#[derive(Clone, Debug, PartialEq)]
pub struct InputPacket {
    pub frame: u64,
    pub cmd: InputCmd,
}

impl InputPacket {
    pub fn encode(&self, registry: &ModeRegistry) -> Result<Vec<u8>, WireError> {
        let mut writer = BitWriter::new();
        write_frame(&mut writer, self.frame);
        write_input_cmd(&mut writer, &self.cmd, registry)?;
        Ok(writer.to_bytes().to_vec())
    }

    pub fn decode(bytes: &[u8], registry: &ModeRegistry) -> Result<Self, WireError> {
        let mut reader = BitReader::new(bytes);
        let frame = read_frame(&mut reader)?;
        let cmd = read_input_cmd(&mut reader, registry)?;
        Ok(Self { frame, cmd })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        input::InputAction,
        mode_data::{ModeDataBlock, PathFollowState},
        net::net_id::NetIdTable,
        settings::MovementSettings,
        state_machine::MovementStateMachine,
        types::{EntityId, ModeName, Vec3},
    };

    #[test]
    fn state_packet_carries_frame_and_sender_id() {
        let machine = MovementStateMachine::standard(MovementSettings::default()).unwrap();
        let mut table = NetIdTable::new();
        let mover = table.assign(EntityId(1));
        table.assign(EntityId(2));

        let mut state = SyncState::new(Vec3::new(1.0, 2.0, 3.0), ModeName::PATH_FOLLOW);
        state
            .mode_data
            .insert(ModeDataBlock::PathFollow(PathFollowState::new(EntityId(2), true)));
        let packet = StatePacket {
            frame: 123_456,
            net_id: mover,
            state,
        };

        let bytes = packet.encode(machine.registry(), &table).unwrap();
        assert_eq!(StatePacket::decode(&bytes, machine.registry(), &table).unwrap(), packet);
    }

    #[test]
    fn input_packet_round_trips() {
        let machine = MovementStateMachine::standard(MovementSettings::default()).unwrap();
        let packet = InputPacket {
            frame: 9,
            cmd: InputCmd::with_intent(Vec3::new(0.0, 0.0, -1.0)).with_action(InputAction::JumpJustPressed),
        };

        let bytes = packet.encode(machine.registry()).unwrap();
        assert_eq!(InputPacket::decode(&bytes, machine.registry()).unwrap(), packet);
    }

    #[test]
    fn empty_packet_is_truncated() {
        let machine = MovementStateMachine::standard(MovementSettings::default()).unwrap();
        assert_eq!(
            InputPacket::decode(&[], machine.registry()),
            Err(WireError::Truncated { field: "frame" })
        );
    }
}
