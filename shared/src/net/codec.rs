//! Bit-packed wire format for [`SyncState`] and [`InputCmd`].
//!
//! SyncState:
//! ```text
//! position    3 x f32
//! rotation    4 x f32   raw quaternion coords (i, j, k, w)
//! velocity    3 x f32
//! mode        u8        index in the shared mode table
//! blocks      u8        number of mode data blocks, then per block:
//!   kind      u8
//!   payload   kind-specific
//! ```
//! Path-follow payload: presence bit, line net id (variable length), `moving_forward` bit.
//!
//! Decoding never panics: truncated input and unknown indices are [`WireError`]s, while an
//! entity reference that does not resolve on this peer decodes as a missing block.

use super::net_id::{EntityNetMap, NetId};
use crate::{
    bitmask_flags::BitmaskFlags,
    error::WireError,
    input::{InputCmd, MoveInputType},
    mode::ModeRegistry,
    mode_data::{ModeDataBlock, ModeDataCollection, ModeDataKind, PathFollowState},
    sync_state::SyncState,
    types::{ModeName, Quat, Vec3},
};
use naia_serde::{BitReader, BitWrite, BitWriter, Serde, UnsignedVariableInteger};
use nalgebra::{Quaternion, Vector4};

/// Bits per chunk of a variable-length net id.
const NET_ID_CHUNK_BITS: u8 = 7;
type WireNetId = UnsignedVariableInteger<NET_ID_CHUNK_BITS>;

fn read<T: Serde>(reader: &mut BitReader, field: &'static str) -> Result<T, WireError> {
    T::de(reader).map_err(|_| WireError::Truncated { field })
}

fn write_vec3(writer: &mut dyn BitWrite, v: &Vec3) {
    v.x.ser(writer);
    v.y.ser(writer);
    v.z.ser(writer);
}

fn read_vec3(reader: &mut BitReader, field: &'static str) -> Result<Vec3, WireError> {
    Ok(Vec3::new(
        read(reader, field)?,
        read(reader, field)?,
        read(reader, field)?,
    ))
}

fn write_quat(writer: &mut dyn BitWrite, q: &Quat) {
    let coords = q.coords;
    coords.x.ser(writer);
    coords.y.ser(writer);
    coords.z.ser(writer);
    coords.w.ser(writer);
}

fn read_quat(reader: &mut BitReader) -> Result<Quat, WireError> {
    let x: f32 = read(reader, "rotation")?;
    let y: f32 = read(reader, "rotation")?;
    let z: f32 = read(reader, "rotation")?;
    let w: f32 = read(reader, "rotation")?;
    // Raw coords: the sender already held a unit quaternion.
    Ok(Quat::new_unchecked(Quaternion::from_vector(Vector4::new(
        x, y, z, w,
    ))))
}

pub fn write_net_id(writer: &mut dyn BitWrite, net_id: NetId) {
    WireNetId::new(net_id.0).ser(writer);
}

pub fn read_net_id(reader: &mut BitReader) -> Result<NetId, WireError> {
    let raw: WireNetId = read(reader, "net id")?;
    u32::try_from(raw.get())
        .map(NetId)
        .map_err(|_| WireError::Truncated { field: "net id" })
}

fn write_mode(
    writer: &mut dyn BitWrite,
    mode: ModeName,
    registry: &ModeRegistry,
) -> Result<(), WireError> {
    let index = registry
        .index_of(mode)
        .ok_or(WireError::UnregisteredMode(mode))?;
    index.ser(writer);
    Ok(())
}

fn read_mode(reader: &mut BitReader, registry: &ModeRegistry) -> Result<ModeName, WireError> {
    let index: u8 = read(reader, "mode")?;
    registry
        .name_at(index)
        .ok_or(WireError::UnknownModeIndex { index })
}

fn write_path_follow(writer: &mut dyn BitWrite, state: &PathFollowState, net: &dyn EntityNetMap) {
    match net.net_id(state.line) {
        Some(net_id) => {
            true.ser(writer);
            write_net_id(writer, net_id);
            state.moving_forward.ser(writer);
        }
        None => {
            log::debug!("line {} has no net id, sending an empty path-follow block", state.line);
            false.ser(writer);
        }
    }
}

fn read_path_follow(
    reader: &mut BitReader,
    net: &dyn EntityNetMap,
) -> Result<Option<PathFollowState>, WireError> {
    let present: bool = read(reader, "path follow presence")?;
    if !present {
        return Ok(None);
    }

    let net_id = read_net_id(reader)?;
    let moving_forward: bool = read(reader, "path follow direction")?;

    Ok(net
        .entity(net_id)
        .map(|line| PathFollowState::new(line, moving_forward)))
}

pub fn write_sync_state(
    writer: &mut dyn BitWrite,
    state: &SyncState,
    registry: &ModeRegistry,
    net: &dyn EntityNetMap,
) -> Result<(), WireError> {
    let count = u8::try_from(state.mode_data.len()).map_err(|_| WireError::TooManyBlocks {
        count: state.mode_data.len(),
    })?;

    write_vec3(writer, &state.position);
    write_quat(writer, &state.rotation);
    write_vec3(writer, &state.velocity);
    write_mode(writer, state.mode, registry)?;

    count.ser(writer);
    for block in state.mode_data.iter() {
        block.kind().tag().ser(writer);
        match block {
            ModeDataBlock::PathFollow(path_follow) => write_path_follow(writer, path_follow, net),
        }
    }

    Ok(())
}

pub fn read_sync_state(
    reader: &mut BitReader,
    registry: &ModeRegistry,
    net: &dyn EntityNetMap,
) -> Result<SyncState, WireError> {
    let position = read_vec3(reader, "position")?;
    let rotation = read_quat(reader)?;
    let velocity = read_vec3(reader, "velocity")?;
    let mode = read_mode(reader, registry)?;

    let count: u8 = read(reader, "block count")?;
    let mut mode_data = ModeDataCollection::default();
    let mut seen: Vec<ModeDataKind> = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let tag: u8 = read(reader, "block kind")?;
        let kind = ModeDataKind::from_tag(tag).ok_or(WireError::UnknownDataKind { tag })?;
        if seen.contains(&kind) {
            return Err(WireError::DuplicateDataKind { kind });
        }
        seen.push(kind);

        match kind {
            ModeDataKind::PathFollow => {
                if let Some(path_follow) = read_path_follow(reader, net)? {
                    mode_data.insert(ModeDataBlock::PathFollow(path_follow));
                }
            }
        }
    }

    Ok(SyncState {
        position,
        rotation,
        velocity,
        mode,
        mode_data,
    })
}

pub fn encode_sync_state(
    state: &SyncState,
    registry: &ModeRegistry,
    net: &dyn EntityNetMap,
) -> Result<Vec<u8>, WireError> {
    let mut writer = BitWriter::new();
    write_sync_state(&mut writer, state, registry, net)?;
    Ok(writer.to_bytes().to_vec())
}

pub fn decode_sync_state(
    bytes: &[u8],
    registry: &ModeRegistry,
    net: &dyn EntityNetMap,
) -> Result<SyncState, WireError> {
    let mut reader = BitReader::new(bytes);
    read_sync_state(&mut reader, registry, net)
}

/// InputCmd: type bit, move vector, orientation vector, action bits, optional suggested mode.
pub fn write_input_cmd(
    writer: &mut dyn BitWrite,
    cmd: &InputCmd,
    registry: &ModeRegistry,
) -> Result<(), WireError> {
    (cmd.move_input_type == MoveInputType::Velocity).ser(writer);
    write_vec3(writer, &cmd.move_input);
    write_vec3(writer, &cmd.orientation_intent);
    cmd.actions.bits.ser(writer);

    match cmd.suggested_mode {
        Some(mode) => {
            true.ser(writer);
            write_mode(writer, mode, registry)?;
        }
        None => false.ser(writer),
    }

    Ok(())
}

pub fn read_input_cmd(reader: &mut BitReader, registry: &ModeRegistry) -> Result<InputCmd, WireError> {
    let is_velocity: bool = read(reader, "move input type")?;
    let move_input = read_vec3(reader, "move input")?;
    let orientation_intent = read_vec3(reader, "orientation intent")?;
    let bits: u8 = read(reader, "actions")?;
    let has_suggestion: bool = read(reader, "suggested mode")?;
    let suggested_mode = if has_suggestion {
        Some(read_mode(reader, registry)?)
    } else {
        None
    };

    Ok(InputCmd {
        move_input_type: if is_velocity {
            MoveInputType::Velocity
        } else {
            MoveInputType::DirectionalIntent
        },
        move_input,
        orientation_intent,
        actions: BitmaskFlags::new(bits),
        suggested_mode,
    })
}

pub fn encode_input_cmd(cmd: &InputCmd, registry: &ModeRegistry) -> Result<Vec<u8>, WireError> {
    let mut writer = BitWriter::new();
    write_input_cmd(&mut writer, cmd, registry)?;
    Ok(writer.to_bytes().to_vec())
}

pub fn decode_input_cmd(bytes: &[u8], registry: &ModeRegistry) -> Result<InputCmd, WireError> {
    let mut reader = BitReader::new(bytes);
    read_input_cmd(&mut reader, registry)
}
