//! Audio routing topology (§4.4): which tracks a listener subscribes to,
//! computed as a pure diff against a room snapshot and applied through a
//! transport-agnostic effect boundary.

pub mod router;
pub mod topology;
pub mod transport;

pub use router::{diff, Action, AudioRouter, Plan};
pub use topology::{desired_topology, Edge, ParticipantState, RoomState, Topology};
pub use transport::{MediaTransport, TrackRef};
