//! Petri nets as typed bipartite graphs.
//!
//! [`net::PetriNetBuilder`] collects places, transitions and arcs and assembles a validated
//! [`net::PetriNetModel`]. The [`pnml`] module reads and writes models as PNML documents.
pub mod error;
pub mod net;
pub mod pnml;

pub use error::{PetriError, Result};
