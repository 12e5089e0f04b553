pub mod code;
pub mod id;
pub mod participant;
pub mod room;
pub mod signal;

pub use code::{generate_room_code, ROOM_CODE_ALPHABET};
pub use id::{ParticipantId, RoomId};
pub use participant::{
    generate_secret, pick_new_host, secrets_match, Participant, ParticipantStatus,
};
pub use room::{Room, RoomPolicy, RoomPolicyUpdate};
pub use signal::{next_after_seq, NewSignal, Signal};
