mod builder;
mod common;
mod model;

pub use builder::{
    NodeSpec, PetriNetBuilder, PlaceBuilder, PlaceSpec, TransitionBuilder, TransitionSpec,
};
pub use common::{Arc, Node, NodeId, Place, PlaceType, Position, Transition, TransitionType};
pub use model::PetriNetModel;
