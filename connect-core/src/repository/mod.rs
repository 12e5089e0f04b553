pub mod participant;
pub mod room;
pub mod signal;

pub use participant::ParticipantRepository;
pub use room::RoomRepository;
pub use signal::SignalRepository;
