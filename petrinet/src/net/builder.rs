use tracing::debug;

use crate::error::{PetriError, Result};

use super::{Arc, Node, PetriNetModel, Place, PlaceType, Position, Transition, TransitionType};

/// Place as recorded by the builder, turned into a [`Place`] on build.
#[derive(Clone, PartialEq, Debug)]
pub struct PlaceSpec {
    pub name: String,
    pub place_type: PlaceType,
    pub tokens: u32,
    pub position: Option<Position>,
}

impl PlaceSpec {
    pub fn new(name: impl Into<String>) -> Self {
        PlaceSpec { name: name.into(), place_type: PlaceType::Normal, tokens: 0, position: None }
    }

    fn resolve(&self) -> Result<Place> {
        let mut place = Place::new(&self.name)?;
        place.set_place_type(self.place_type);
        place.set_tokens(self.tokens);
        if let Some(position) = self.position {
            place.set_position(position);
        }
        Ok(place)
    }
}

impl From<&Place> for PlaceSpec {
    fn from(value: &Place) -> Self {
        PlaceSpec {
            name: value.name().to_string(),
            place_type: value.place_type(),
            tokens: value.tokens(),
            position: value.position(),
        }
    }
}

/// Transition as recorded by the builder, turned into a [`Transition`] on build.
#[derive(Clone, PartialEq, Debug)]
pub struct TransitionSpec {
    pub name: String,
    pub transition_type: TransitionType,
    pub firable: bool,
    pub position: Option<Position>,
}

impl TransitionSpec {
    pub fn new(name: impl Into<String>) -> Self {
        TransitionSpec {
            name: name.into(),
            transition_type: TransitionType::User,
            firable: false,
            position: None,
        }
    }

    fn resolve(&self) -> Result<Transition> {
        let mut transition = Transition::new(&self.name)?;
        transition.set_transition_type(self.transition_type);
        transition.set_firable(self.firable);
        if let Some(position) = self.position {
            transition.set_position(position);
        }
        Ok(transition)
    }
}

impl From<&Transition> for TransitionSpec {
    fn from(value: &Transition) -> Self {
        TransitionSpec {
            name: value.name().to_string(),
            transition_type: value.transition_type(),
            firable: value.is_firable(),
            position: value.position(),
        }
    }
}

/// Place or transition spec, kept in declaration order by the builder.
#[derive(Clone, PartialEq, Debug)]
pub enum NodeSpec {
    Place(PlaceSpec),
    Transition(TransitionSpec),
}

impl NodeSpec {
    pub fn name(&self) -> &str {
        match self {
            NodeSpec::Place(pl) => &pl.name,
            NodeSpec::Transition(tr) => &tr.name,
        }
    }

    fn set_name(&mut self, name: String) {
        match self {
            NodeSpec::Place(pl) => pl.name = name,
            NodeSpec::Transition(tr) => tr.name = name,
        }
    }

    fn resolve(&self) -> Result<Node> {
        match self {
            NodeSpec::Place(pl) => pl.resolve().map(Node::from),
            NodeSpec::Transition(tr) => tr.resolve().map(Node::from),
        }
    }
}

impl From<&Node> for NodeSpec {
    fn from(value: &Node) -> Self {
        match value {
            Node::Place(pl) => NodeSpec::Place(pl.into()),
            Node::Transition(tr) => NodeSpec::Transition(tr.into()),
        }
    }
}

/// Collects places, transitions and arcs of a net and checks them all at once in [`build`].
///
/// Nothing is validated while specs are recorded; [`build`] either returns a complete, valid
/// [`PetriNetModel`] or an error.
///
/// ```
/// use petrinet::net::{PetriNetBuilder, PlaceType};
///
/// let net = PetriNetBuilder::new("order")
///     .new_place("p1").with_type(PlaceType::Start).done_place()
///     .new_transition("t1").done_transition()
///     .new_place("p2").with_type(PlaceType::End).done_place()
///     .add_arc("p1", "t1")
///     .add_arc("t1", "p2")
///     .set_start_node("p1")
///     .set_finish_node("p2")
///     .build()
///     .unwrap();
/// assert_eq!(net.len(), 3);
/// ```
///
/// [`build`]: PetriNetBuilder::build
#[derive(Default, Clone, Debug)]
pub struct PetriNetBuilder {
    name: String,
    nodes: Vec<NodeSpec>,
    arcs: Vec<Arc>,
    start: Option<String>,
    finish: Option<String>,
}

impl PetriNetBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        PetriNetBuilder { name: name.into(), ..Default::default() }
    }

    /// Reopen a built net for editing.
    pub fn from_model(model: &PetriNetModel) -> Self {
        let mut builder = PetriNetBuilder::new(model.name());
        builder.nodes = model.nodes().map(NodeSpec::from).collect();
        builder.arcs = model.connections().map(|(from, to)| Arc::new(from, to)).collect();
        builder.start = model.start().map(str::to_string);
        builder.finish = model.finish().map(str::to_string);
        builder
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Place and transition specs in declaration order.
    pub fn nodes(&self) -> &[NodeSpec] {
        &self.nodes
    }

    pub fn places(&self) -> impl Iterator<Item = &PlaceSpec> {
        self.nodes.iter().filter_map(|node| match node {
            NodeSpec::Place(pl) => Some(pl),
            NodeSpec::Transition(_) => None,
        })
    }

    pub fn transitions(&self) -> impl Iterator<Item = &TransitionSpec> {
        self.nodes.iter().filter_map(|node| match node {
            NodeSpec::Transition(tr) => Some(tr),
            NodeSpec::Place(_) => None,
        })
    }

    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    pub fn start_node(&self) -> Option<&str> {
        self.start.as_deref()
    }

    pub fn finish_node(&self) -> Option<&str> {
        self.finish.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.arcs.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.iter().any(|node| node.name() == name)
    }

    /// Start a new place spec with type `Normal` and no tokens.
    pub fn new_place(&mut self, name: impl Into<String>) -> PlaceBuilder<'_> {
        PlaceBuilder { parent: self, spec: PlaceSpec::new(name) }
    }

    /// Start a new transition spec of type `User`, not firable.
    pub fn new_transition(&mut self, name: impl Into<String>) -> TransitionBuilder<'_> {
        TransitionBuilder { parent: self, spec: TransitionSpec::new(name) }
    }

    pub fn place_mut(&mut self, name: &str) -> Option<&mut PlaceSpec> {
        self.nodes.iter_mut().find_map(|node| match node {
            NodeSpec::Place(pl) if pl.name == name => Some(pl),
            _ => None,
        })
    }

    pub fn transition_mut(&mut self, name: &str) -> Option<&mut TransitionSpec> {
        self.nodes.iter_mut().find_map(|node| match node {
            NodeSpec::Transition(tr) if tr.name == name => Some(tr),
            _ => None,
        })
    }

    /// Record an arc. Endpoints are checked on build.
    pub fn add_arc(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.arcs.push(Arc::new(from, to));
        self
    }

    /// Designate the start node. Clears the finish designation if it names the same node.
    pub fn set_start_node(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        if self.finish.as_ref() == Some(&name) {
            debug!(node = %name, "Node was finish node, now start node.");
            self.finish = None;
        }
        self.start = Some(name);
        self
    }

    /// Designate the finish node. Clears the start designation if it names the same node.
    pub fn set_finish_node(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        if self.start.as_ref() == Some(&name) {
            debug!(node = %name, "Node was start node, now finish node.");
            self.start = None;
        }
        self.finish = Some(name);
        self
    }

    /// Remove a place or transition together with every arc touching it.
    pub fn remove_node(&mut self, name: &str) -> &mut Self {
        let nodes_before = self.nodes.len();
        let arcs_before = self.arcs.len();
        self.nodes.retain(|node| node.name() != name);
        self.arcs.retain(|arc| !arc.references(name));
        if self.start.as_deref() == Some(name) {
            self.start = None;
        }
        if self.finish.as_deref() == Some(name) {
            self.finish = None;
        }
        let removed_nodes = nodes_before - self.nodes.len();
        let removed_arcs = arcs_before - self.arcs.len();
        debug!(node = name, removed_nodes, removed_arcs, "Removed node.");
        self
    }

    /// Remove the first arc from `from` to `to`, if any.
    pub fn remove_arc(&mut self, from: &str, to: &str) -> &mut Self {
        match self.arcs.iter().position(|arc| arc.source() == from && arc.target() == to) {
            Some(idx) => {
                self.arcs.remove(idx);
            }
            None => debug!(from, to, "No arc to remove."),
        }
        self
    }

    /// Rename a place or transition, updating arcs and start/finish designations.
    pub fn rename_node(&mut self, old: &str, new: impl Into<String>) -> Result<&mut Self> {
        let new = new.into();
        if new.trim().is_empty() || (new != old && self.contains(&new)) {
            return Err(PetriError::InvalidName(new));
        }
        let Some(node) = self.nodes.iter_mut().find(|node| node.name() == old) else {
            return Err(PetriError::NodeNotFound(old.to_string()));
        };
        node.set_name(new.clone());
        for arc in &mut self.arcs {
            arc.rename(old, &new);
        }
        for designation in [&mut self.start, &mut self.finish] {
            if designation.as_deref() == Some(old) {
                *designation = Some(new.clone());
            }
        }
        debug!(old, new = %new, "Renamed node.");
        Ok(self)
    }

    /// Resolve all specs and assemble a validated [`PetriNetModel`]. Nodes keep their
    /// declaration order.
    pub fn build(&self) -> Result<PetriNetModel> {
        let nodes = self.nodes.iter().map(NodeSpec::resolve).collect::<Result<Vec<_>>>()?;
        PetriNetModel::from_nodes(
            self.name.clone(),
            nodes,
            self.arcs.clone(),
            self.start.clone(),
            self.finish.clone(),
        )
    }
}

impl From<&PetriNetModel> for PetriNetBuilder {
    fn from(value: &PetriNetModel) -> Self {
        PetriNetBuilder::from_model(value)
    }
}

/// Fluent setter for a single place, committed by [`PlaceBuilder::done_place`].
pub struct PlaceBuilder<'a> {
    parent: &'a mut PetriNetBuilder,
    spec: PlaceSpec,
}

impl<'a> PlaceBuilder<'a> {
    pub fn with_type(mut self, place_type: PlaceType) -> Self {
        self.spec.place_type = place_type;
        self
    }

    pub fn initial_marking(mut self, tokens: u32) -> Self {
        self.spec.tokens = tokens;
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.spec.position = Some(Position::new(x, y));
        self
    }

    pub fn done_place(self) -> &'a mut PetriNetBuilder {
        self.parent.nodes.push(NodeSpec::Place(self.spec));
        self.parent
    }
}

/// Fluent setter for a single transition, committed by [`TransitionBuilder::done_transition`].
pub struct TransitionBuilder<'a> {
    parent: &'a mut PetriNetBuilder,
    spec: TransitionSpec,
}

impl<'a> TransitionBuilder<'a> {
    pub fn with_type(mut self, transition_type: TransitionType) -> Self {
        self.spec.transition_type = transition_type;
        self
    }

    pub fn firable(mut self, firable: bool) -> Self {
        self.spec.firable = firable;
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.spec.position = Some(Position::new(x, y));
        self
    }

    pub fn done_transition(self) -> &'a mut PetriNetBuilder {
        self.parent.nodes.push(NodeSpec::Transition(self.spec));
        self.parent
    }
}
