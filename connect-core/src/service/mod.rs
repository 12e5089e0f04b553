pub mod admission;
pub mod auth;
pub mod relay;
pub mod room;

pub use admission::{AdmissionService, JoinOutcome};
pub use auth::ParticipantAuthenticator;
pub use relay::{RelayService, SignalBatch};
pub use room::{CreatedRoom, RoomService};
