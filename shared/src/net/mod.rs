pub mod codec;
pub mod net_id;
pub mod packet;

pub use codec::{
    decode_input_cmd, decode_sync_state, encode_input_cmd, encode_sync_state, read_input_cmd,
    read_net_id, read_sync_state, write_input_cmd, write_net_id, write_sync_state,
};
pub use net_id::{EntityNetMap, NetId, NetIdTable};
pub use packet::{InputPacket, StatePacket};
