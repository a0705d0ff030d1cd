use std::collections::{HashMap, VecDeque};

use tracing::{debug, trace};

use crate::error::{PetriError, Result};

use super::{Arc, Node, NodeId, Place, PlaceType, Transition};

/// Bipartite graph of places and transitions.
///
/// Nodes live in an arena and are addressed by [`NodeId`]; names map onto those ids. Arcs are
/// stored as successor lists, so parallel arcs are kept in insertion order.
#[derive(Clone, Debug)]
pub struct PetriNetModel {
    name: String,
    nodes: Vec<Node>,
    ids: HashMap<String, NodeId>,
    adjacency: Vec<Vec<NodeId>>,
    start: Option<NodeId>,
    finish: Option<NodeId>,
}

macro_rules! illegal {
    ($($arg:tt)*) => {
        Err(PetriError::IllegalConnection(format!($($arg)*)))
    };
}

impl PetriNetModel {
    /// Empty live model, nodes and arcs are added one at a time.
    pub fn empty(name: impl Into<String>) -> Self {
        PetriNetModel {
            name: name.into(),
            nodes: Default::default(),
            ids: Default::default(),
            adjacency: Default::default(),
            start: None,
            finish: None,
        }
    }

    /// Assemble a complete net and check it.
    ///
    /// Every structural problem (duplicate names, arcs to unknown nodes, place-place or
    /// transition-transition arcs, missing start/finish, disconnected nodes) is reported as
    /// [`PetriError::IllegalConnection`]. Places are inserted before transitions; use
    /// [`PetriNetModel::from_nodes`] to keep a mixed order.
    pub fn new(
        name: impl Into<String>,
        places: Vec<Place>,
        transitions: Vec<Transition>,
        arcs: Vec<Arc>,
        start: Option<String>,
        finish: Option<String>,
    ) -> Result<Self> {
        let nodes =
            places.into_iter().map(Node::from).chain(transitions.into_iter().map(Node::from));
        PetriNetModel::from_nodes(name, nodes.collect(), arcs, start, finish)
    }

    /// Same checks as [`PetriNetModel::new`], nodes are inserted in the given order.
    ///
    /// The net name must not be blank or carry surrounding whitespace, otherwise
    /// [`PetriError::InvalidName`] is returned.
    pub fn from_nodes(
        name: impl Into<String>,
        nodes: Vec<Node>,
        arcs: Vec<Arc>,
        start: Option<String>,
        finish: Option<String>,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() || name.trim() != name {
            return Err(PetriError::InvalidName(name));
        }
        let mut net = PetriNetModel::empty(name);
        let Some(start) = start else {
            return illegal!("Net '{}' has no start node", net.name);
        };
        let Some(finish) = finish else {
            return illegal!("Net '{}' has no finish node", net.name);
        };

        for node in nodes {
            if net.contains(node.name()) {
                return illegal!("Duplicate node name '{}'", node.name());
            }
            net.add_node(node);
        }

        for arc in &arcs {
            net.add_arc(arc.source(), arc.target()).or_else(|err| match err {
                PetriError::UnknownNode(missing) => illegal!(
                    "Arc '{}' -> '{}' references unknown node '{missing}'",
                    arc.source(),
                    arc.target()
                ),
                PetriError::IncompatibleConnection { from, to } => {
                    illegal!("Arc '{from}' -> '{to}' must connect a place and a transition")
                }
                other => Err(other),
            })?;
        }

        net.designate(&start, &finish)?;
        net.validate()?;

        debug!(
            net = %net.name,
            places = net.places().count(),
            transitions = net.transitions().count(),
            arcs = net.arc_count(),
            "Constructed petri net."
        );
        Ok(net)
    }

    fn designate(&mut self, start: &str, finish: &str) -> Result<()> {
        if start == finish {
            return illegal!("Node '{start}' cannot be both start and finish");
        }
        let Some(&start_id) = self.ids.get(start) else {
            return illegal!("Start node '{start}' does not exist");
        };
        let Some(&finish_id) = self.ids.get(finish) else {
            return illegal!("Finish node '{finish}' does not exist");
        };
        self.start = Some(start_id);
        self.finish = Some(finish_id);
        Ok(())
    }

    /// Check the invariants that only make sense for a complete net: start and finish are
    /// distinct places typed `Start` and `End` (the only places with those types) and every node
    /// is connected to the start node.
    pub fn validate(&self) -> Result<()> {
        let (Some(start), Some(finish)) = (self.start, self.finish) else {
            return illegal!("Net '{}' needs both a start and a finish node", self.name);
        };
        if start == finish {
            return illegal!("Node '{}' cannot be both start and finish", self.node(start).name());
        }
        let designated = [(start, "start", PlaceType::Start), (finish, "finish", PlaceType::End)];
        for (id, role, expected) in designated {
            match self.node(id) {
                Node::Place(pl) if pl.place_type() == expected => {}
                Node::Place(pl) => {
                    return illegal!(
                        "The {role} place '{}' must have type '{expected}', found '{}'",
                        pl.name(),
                        pl.place_type()
                    );
                }
                Node::Transition(tr) => {
                    return illegal!("The {role} node '{}' must be a place", tr.name());
                }
            }
        }
        // start/end types identify the designated places in PNML, so they must be unique
        let names = [self.node(start).name(), self.node(finish).name()];
        let stray = self
            .places()
            .find(|pl| pl.place_type() != PlaceType::Normal && !names.contains(&pl.name()));
        if let Some(pl) = stray {
            return illegal!(
                "Place '{}' has type '{}' but is not the designated start/finish place",
                pl.name(),
                pl.place_type()
            );
        }

        let reached = self.connected_to(start);
        let unreachable: Vec<&str> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(idx, _)| !reached[*idx])
            .map(|(_, node)| node.name())
            .collect();
        if !unreachable.is_empty() {
            return illegal!(
                "Node(s) not connected to the rest of the net: {}",
                unreachable.join(", ")
            );
        }
        Ok(())
    }

    /// Nodes reachable from `from` when arcs are followed in either direction.
    fn connected_to(&self, from: NodeId) -> Vec<bool> {
        let mut neighbours = vec![Vec::new(); self.nodes.len()];
        for (src, successors) in self.adjacency.iter().enumerate() {
            for dst in successors {
                neighbours[src].push(dst.0);
                neighbours[dst.0].push(src);
            }
        }
        let mut reached = vec![false; self.nodes.len()];
        let mut queue = VecDeque::from([from.0]);
        reached[from.0] = true;
        while let Some(current) = queue.pop_front() {
            for &next in &neighbours[current] {
                if !reached[next] {
                    reached[next] = true;
                    queue.push_back(next);
                }
            }
        }
        reached
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert a node, or return the id of the node already registered under that name.
    pub fn add_node(&mut self, node: impl Into<Node>) -> NodeId {
        let node = node.into();
        if let Some(&id) = self.ids.get(node.name()) {
            trace!(node = node.name(), "Node already present.");
            return id;
        }
        let id = NodeId(self.nodes.len());
        trace!(node = node.name(), id = id.0, "Adding node.");
        self.ids.insert(node.name().to_string(), id);
        self.nodes.push(node);
        self.adjacency.push(Vec::new());
        id
    }

    /// Connect two existing nodes. Parallel arcs are kept.
    pub fn add_arc(&mut self, from: &str, to: &str) -> Result<()> {
        let from_id = self.id(from).ok_or_else(|| PetriError::UnknownNode(from.to_string()))?;
        let to_id = self.id(to).ok_or_else(|| PetriError::UnknownNode(to.to_string()))?;
        if !self.node(from_id).can_connect(self.node(to_id)) {
            return Err(PetriError::IncompatibleConnection {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        trace!(from, to, "Adding arc.");
        self.adjacency[from_id.0].push(to_id);
        Ok(())
    }

    pub fn set_start_node(&mut self, name: &str) -> Result<()> {
        let id = self.id(name).ok_or_else(|| PetriError::NodeNotFound(name.to_string()))?;
        if self.finish == Some(id) {
            self.finish = None;
        }
        self.start = Some(id);
        Ok(())
    }

    pub fn set_finish_node(&mut self, name: &str) -> Result<()> {
        let id = self.id(name).ok_or_else(|| PetriError::NodeNotFound(name.to_string()))?;
        if self.start == Some(id) {
            self.start = None;
        }
        self.finish = Some(id);
        Ok(())
    }

    pub fn start(&self) -> Option<&str> {
        self.start.map(|id| self.node(id).name())
    }

    pub fn finish(&self) -> Option<&str> {
        self.finish.map(|id| self.node(id).name())
    }

    fn id(&self, name: &str) -> Option<NodeId> {
        self.ids.get(name).copied()
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    pub fn get_node_by_name(&self, name: &str) -> Result<&Node> {
        self.id(name)
            .map(|id| self.node(id))
            .ok_or_else(|| PetriError::NodeNotFound(name.to_string()))
    }

    /// Mutable access to position and classification of a node. Names are fixed.
    pub fn node_mut(&mut self, name: &str) -> Result<&mut Node> {
        let id = self.id(name).ok_or_else(|| PetriError::NodeNotFound(name.to_string()))?;
        Ok(&mut self.nodes[id.0])
    }

    /// Targets of all arcs leaving `name`, empty for unknown names.
    pub fn get_successors(&self, name: &str) -> Vec<&str> {
        match self.id(name) {
            Some(id) => self.adjacency[id.0].iter().map(|&to| self.node(to).name()).collect(),
            None => Vec::new(),
        }
    }

    /// Sources of all arcs entering `name`, empty for unknown names.
    pub fn get_predecessors(&self, name: &str) -> Vec<&str> {
        let Some(id) = self.id(name) else {
            return Vec::new();
        };
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(src, successors)| {
                successors.iter().filter(move |&&to| to == id).map(move |_| NodeId(src))
            })
            .map(|src| self.node(src).name())
            .collect()
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn places(&self) -> impl Iterator<Item = &Place> {
        self.nodes.iter().filter_map(Node::as_place)
    }

    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.nodes.iter().filter_map(Node::as_transition)
    }

    /// Every arc as a `(from, to)` pair, grouped by source node in insertion order.
    pub fn connections(&self) -> impl Iterator<Item = (&str, &str)> {
        self.adjacency.iter().enumerate().flat_map(move |(src, successors)| {
            successors.iter().map(move |&to| (self.nodes[src].name(), self.node(to).name()))
        })
    }

    pub fn arc_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str) -> Place {
        Place::new(name).unwrap()
    }

    fn typed_place(name: &str, place_type: PlaceType) -> Place {
        let mut pl = place(name);
        pl.set_place_type(place_type);
        pl
    }

    fn transition(name: &str) -> Transition {
        Transition::new(name).unwrap()
    }

    fn simple_net(arcs: Vec<Arc>) -> Result<PetriNetModel> {
        PetriNetModel::new(
            "simple",
            vec![typed_place("p1", PlaceType::Start), typed_place("p2", PlaceType::End)],
            vec![transition("t1")],
            arcs,
            Some("p1".into()),
            Some("p2".into()),
        )
    }

    #[test]
    fn from_nodes_keeps_declaration_order() {
        let nodes = vec![
            Node::from(typed_place("p1", PlaceType::Start)),
            Node::from(transition("t1")),
            Node::from(typed_place("p2", PlaceType::End)),
        ];
        let arcs = vec![Arc::new("p1", "t1"), Arc::new("t1", "p2")];
        let net =
            PetriNetModel::from_nodes("ordered", nodes, arcs, Some("p1".into()), Some("p2".into()))
                .unwrap();
        let names: Vec<&str> = net.nodes().map(Node::name).collect();
        assert_eq!(names, vec!["p1", "t1", "p2"]);
    }

    #[test]
    fn net_name_must_be_trimmed_and_non_blank() {
        for name in ["", "  ", " spaced ", "trailing\n"] {
            let arcs = vec![Arc::new("p1", "t1"), Arc::new("t1", "p2")];
            let result = PetriNetModel::new(
                name,
                vec![typed_place("p1", PlaceType::Start), typed_place("p2", PlaceType::End)],
                vec![transition("t1")],
                arcs,
                Some("p1".into()),
                Some("p2".into()),
            );
            assert!(matches!(result, Err(PetriError::InvalidName(_))), "{name:?}");
        }
    }

    #[test]
    fn add_node_is_insert_or_get() {
        let mut net = PetriNetModel::empty("n");
        let a = net.add_node(place("p1"));
        let b = net.add_node(place("p1"));
        assert_eq!(a, b);
        assert_eq!(net.len(), 1);
    }

    #[test]
    fn lookup_by_name() {
        let mut net = PetriNetModel::empty("n");
        net.add_node(place("p1"));
        net.add_node(transition("t1"));
        assert_eq!(net.get_node_by_name("p1").unwrap().name(), "p1");
        assert!(net.get_node_by_name("t1").unwrap().is_transition());
        assert!(matches!(net.get_node_by_name("p"), Err(PetriError::NodeNotFound(_))));
    }

    #[test]
    fn add_arc_rejects_same_kind_immediately() {
        let mut net = PetriNetModel::empty("n");
        net.add_node(place("p1"));
        net.add_node(place("p2"));
        let err = net.add_arc("p1", "p2").unwrap_err();
        assert!(matches!(err, PetriError::IncompatibleConnection { .. }));
        assert_eq!(net.arc_count(), 0);
    }

    #[test]
    fn add_arc_rejects_unknown_nodes() {
        let mut net = PetriNetModel::empty("n");
        net.add_node(place("p1"));
        assert!(matches!(net.add_arc("p1", "t9"), Err(PetriError::UnknownNode(n)) if n == "t9"));
    }

    #[test]
    fn parallel_arcs_accumulate() {
        let mut net = PetriNetModel::empty("n");
        net.add_node(place("p1"));
        net.add_node(transition("t1"));
        net.add_arc("p1", "t1").unwrap();
        net.add_arc("p1", "t1").unwrap();
        assert_eq!(net.get_successors("p1"), vec!["t1", "t1"]);
        assert_eq!(net.get_predecessors("t1"), vec!["p1", "p1"]);
        assert!(net.get_successors("t1").is_empty());
        assert!(net.get_successors("unknown").is_empty());
    }

    #[test]
    fn full_constructor_accepts_valid_net() {
        let net = simple_net(vec![Arc::new("p1", "t1"), Arc::new("t1", "p2")]).unwrap();
        assert_eq!(net.len(), 3);
        assert_eq!(net.arc_count(), 2);
        assert_eq!(net.start(), Some("p1"));
        assert_eq!(net.finish(), Some("p2"));
        let connections: Vec<_> = net.connections().collect();
        assert_eq!(connections, vec![("p1", "t1"), ("t1", "p2")]);
    }

    #[test]
    fn full_constructor_requires_start_and_finish() {
        let err = PetriNetModel::new(
            "n",
            vec![place("p1"), place("p2")],
            vec![transition("t1")],
            vec![Arc::new("p1", "t1"), Arc::new("t1", "p2")],
            None,
            Some("p2".into()),
        )
        .unwrap_err();
        assert!(matches!(err, PetriError::IllegalConnection(_)));
    }

    #[test]
    fn full_constructor_reports_bad_arcs_as_illegal() {
        let err = simple_net(vec![Arc::new("p1", "p2")]).unwrap_err();
        assert!(matches!(err, PetriError::IllegalConnection(msg) if msg.contains("'p1' -> 'p2'")));

        let err = simple_net(vec![Arc::new("p1", "t7")]).unwrap_err();
        assert!(matches!(err, PetriError::IllegalConnection(msg) if msg.contains("t7")));
    }

    #[test]
    fn full_constructor_rejects_disconnected_nodes() {
        let err = simple_net(vec![Arc::new("p1", "t1")]).unwrap_err();
        assert!(matches!(err, PetriError::IllegalConnection(msg) if msg.contains("p2")));
    }

    #[test]
    fn full_constructor_rejects_duplicates() {
        let err = PetriNetModel::new(
            "n",
            vec![place("p1"), place("p2")],
            vec![transition("p1")],
            vec![],
            Some("p1".into()),
            Some("p2".into()),
        )
        .unwrap_err();
        assert!(matches!(err, PetriError::IllegalConnection(msg) if msg.contains("Duplicate")));
    }

    #[test]
    fn start_must_be_a_place() {
        let err = PetriNetModel::new(
            "n",
            vec![place("p1")],
            vec![transition("t1")],
            vec![Arc::new("t1", "p1")],
            Some("t1".into()),
            Some("p1".into()),
        )
        .unwrap_err();
        assert!(matches!(err, PetriError::IllegalConnection(msg) if msg.contains("t1")));
    }

    #[test]
    fn designated_places_carry_matching_types() {
        let err = PetriNetModel::new(
            "n",
            vec![place("p1"), typed_place("p2", PlaceType::End)],
            vec![transition("t1")],
            vec![Arc::new("p1", "t1"), Arc::new("t1", "p2")],
            Some("p1".into()),
            Some("p2".into()),
        )
        .unwrap_err();
        assert!(matches!(err, PetriError::IllegalConnection(msg) if msg.contains("'p1'")));
    }

    #[test]
    fn start_type_is_reserved_for_the_start_place() {
        let err = PetriNetModel::new(
            "n",
            vec![
                typed_place("p1", PlaceType::Start),
                typed_place("p2", PlaceType::End),
                typed_place("p3", PlaceType::Start),
            ],
            vec![transition("t1")],
            vec![Arc::new("p1", "t1"), Arc::new("t1", "p2"), Arc::new("p3", "t1")],
            Some("p1".into()),
            Some("p2".into()),
        )
        .unwrap_err();
        assert!(matches!(err, PetriError::IllegalConnection(msg) if msg.contains("'p3'")));
    }

    #[test]
    fn live_designation_is_exclusive() {
        let mut net = PetriNetModel::empty("n");
        net.add_node(place("p1"));
        net.set_start_node("p1").unwrap();
        net.set_finish_node("p1").unwrap();
        assert_eq!(net.start(), None);
        assert_eq!(net.finish(), Some("p1"));
        assert!(matches!(net.set_start_node("x"), Err(PetriError::NodeNotFound(_))));
    }

    #[test]
    fn node_mut_edits_attributes() {
        let mut net = simple_net(vec![Arc::new("p1", "t1"), Arc::new("t1", "p2")]).unwrap();
        let pl = net.node_mut("p1").unwrap().as_place_mut().unwrap();
        pl.set_tokens(4);
        pl.set_place_type(PlaceType::Start);
        net.node_mut("t1").unwrap().set_position((1.0, 2.0));

        let pl = net.get_node_by_name("p1").unwrap().as_place().unwrap();
        assert_eq!(pl.tokens(), 4);
        assert_eq!(pl.place_type(), PlaceType::Start);
        assert_eq!(net.get_node_by_name("t1").unwrap().position().unwrap().y, 2.0);
    }
}
