use std::{fmt::Display, str::FromStr};

use crate::error::{PetriError, Result};

/// Index of a node inside the arena of a [`PetriNetModel`](super::PetriNetModel).
#[derive(Eq, PartialEq, Clone, Copy, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub usize);

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Position { x, y }
    }
}

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Default)]
pub enum PlaceType {
    #[default]
    Normal,
    Start,
    End,
}

impl PlaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceType::Normal => "normal",
            PlaceType::Start => "start",
            PlaceType::End => "end",
        }
    }
}

impl FromStr for PlaceType {
    type Err = PetriError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(PlaceType::Normal),
            "start" => Ok(PlaceType::Start),
            "end" => Ok(PlaceType::End),
            other => Err(PetriError::MalformedDocument(format!("Unknown place type '{other}'"))),
        }
    }
}

impl Display for PlaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Default)]
pub enum TransitionType {
    #[default]
    User,
    Admin,
}

impl TransitionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionType::User => "user",
            TransitionType::Admin => "admin",
        }
    }
}

impl FromStr for TransitionType {
    type Err = PetriError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(TransitionType::User),
            "admin" => Ok(TransitionType::Admin),
            other => {
                Err(PetriError::MalformedDocument(format!("Unknown transition type '{other}'")))
            }
        }
    }
}

impl Display for TransitionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn checked_name(name: impl Into<String>) -> Result<String> {
    let name = name.into();
    if name.trim().is_empty() {
        return Err(PetriError::InvalidName(name));
    }
    Ok(name)
}

#[derive(Clone, PartialEq, Debug)]
pub struct Place {
    name: String,
    place_type: PlaceType,
    tokens: u32,
    position: Option<Position>,
}

impl Place {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Ok(Place {
            name: checked_name(name)?,
            place_type: PlaceType::default(),
            tokens: 0,
            position: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn place_type(&self) -> PlaceType {
        self.place_type
    }

    pub fn set_place_type(&mut self, place_type: PlaceType) {
        self.place_type = place_type;
    }

    /// Initial marking of this place.
    pub fn tokens(&self) -> u32 {
        self.tokens
    }

    pub fn set_tokens(&mut self, tokens: u32) {
        self.tokens = tokens;
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn set_position(&mut self, position: impl Into<Position>) {
        self.position = Some(position.into());
    }

    /// Display key, e.g. `place_3` for a place holding three tokens.
    pub fn shape_key(&self) -> String {
        format!("place_{}", self.tokens)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Transition {
    name: String,
    transition_type: TransitionType,
    firable: bool,
    position: Option<Position>,
}

impl Transition {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Ok(Transition {
            name: checked_name(name)?,
            transition_type: TransitionType::default(),
            firable: false,
            position: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transition_type(&self) -> TransitionType {
        self.transition_type
    }

    pub fn set_transition_type(&mut self, transition_type: TransitionType) {
        self.transition_type = transition_type;
    }

    /// Display flag for the editor. Nothing in this crate fires transitions.
    pub fn is_firable(&self) -> bool {
        self.firable
    }

    pub fn set_firable(&mut self, firable: bool) {
        self.firable = firable;
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn set_position(&mut self, position: impl Into<Position>) {
        self.position = Some(position.into());
    }

    /// Display key, `admin_transition` or `user_transition`.
    pub fn shape_key(&self) -> String {
        format!("{}_transition", self.transition_type)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Node {
    Place(Place),
    Transition(Transition),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Place(pl) => pl.name(),
            Node::Transition(tr) => tr.name(),
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            Node::Place(pl) => pl.position(),
            Node::Transition(tr) => tr.position(),
        }
    }

    pub fn set_position(&mut self, position: impl Into<Position>) {
        match self {
            Node::Place(pl) => pl.set_position(position),
            Node::Transition(tr) => tr.set_position(position),
        }
    }

    pub fn shape_key(&self) -> String {
        match self {
            Node::Place(pl) => pl.shape_key(),
            Node::Transition(tr) => tr.shape_key(),
        }
    }

    pub fn is_place(&self) -> bool {
        matches!(self, Node::Place(_))
    }

    pub fn is_transition(&self) -> bool {
        matches!(self, Node::Transition(_))
    }

    pub fn as_place(&self) -> Option<&Place> {
        match self {
            Node::Place(pl) => Some(pl),
            Node::Transition(_) => None,
        }
    }

    pub fn as_transition(&self) -> Option<&Transition> {
        match self {
            Node::Transition(tr) => Some(tr),
            Node::Place(_) => None,
        }
    }

    pub fn as_place_mut(&mut self) -> Option<&mut Place> {
        match self {
            Node::Place(pl) => Some(pl),
            Node::Transition(_) => None,
        }
    }

    pub fn as_transition_mut(&mut self) -> Option<&mut Transition> {
        match self {
            Node::Transition(tr) => Some(tr),
            Node::Place(_) => None,
        }
    }

    /// True if an arc between `self` and `other` would join a place and a transition.
    pub fn can_connect(&self, other: &Node) -> bool {
        self.is_place() != other.is_place()
    }
}

impl From<Place> for Node {
    fn from(value: Place) -> Self {
        Node::Place(value)
    }
}

impl From<Transition> for Node {
    fn from(value: Transition) -> Self {
        Node::Transition(value)
    }
}

/// Directed connection between two nodes, identified by name.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Arc {
    from: String,
    to: String,
}

impl Arc {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Arc { from: from.into(), to: to.into() }
    }

    pub fn source(&self) -> &str {
        &self.from
    }

    pub fn target(&self) -> &str {
        &self.to
    }

    pub(super) fn references(&self, name: &str) -> bool {
        self.from == name || self.to == name
    }

    pub(super) fn rename(&mut self, old: &str, new: &str) {
        if self.from == old {
            self.from = new.to_string();
        }
        if self.to == old {
            self.to = new.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_are_rejected() {
        assert!(matches!(Place::new(""), Err(PetriError::InvalidName(_))));
        assert!(matches!(Place::new("   "), Err(PetriError::InvalidName(_))));
        assert!(matches!(Transition::new(""), Err(PetriError::InvalidName(_))));
    }

    #[test]
    fn defaults() {
        let pl = Place::new("p1").unwrap();
        assert_eq!(pl.place_type(), PlaceType::Normal);
        assert_eq!(pl.tokens(), 0);
        assert_eq!(pl.position(), None);

        let tr = Transition::new("t1").unwrap();
        assert_eq!(tr.transition_type(), TransitionType::User);
        assert!(!tr.is_firable());
    }

    #[test]
    fn shape_keys() {
        let mut pl = Place::new("p1").unwrap();
        pl.set_tokens(3);
        assert_eq!(pl.shape_key(), "place_3");

        let mut tr = Transition::new("t1").unwrap();
        assert_eq!(tr.shape_key(), "user_transition");
        tr.set_transition_type(TransitionType::Admin);
        assert_eq!(Node::from(tr).shape_key(), "admin_transition");
    }

    #[test]
    fn types_parse_case_insensitively() {
        assert_eq!("START".parse::<PlaceType>().unwrap(), PlaceType::Start);
        assert_eq!("End".parse::<PlaceType>().unwrap(), PlaceType::End);
        assert_eq!("Admin".parse::<TransitionType>().unwrap(), TransitionType::Admin);
        assert!("sideways".parse::<PlaceType>().is_err());
    }

    #[test]
    fn arcs_compare_by_endpoints() {
        assert_eq!(Arc::new("p1", "t1"), Arc::new("p1", "t1"));
        assert_ne!(Arc::new("p1", "t1"), Arc::new("t1", "p1"));
    }

    #[test]
    fn only_place_and_transition_connect() {
        let p1 = Node::from(Place::new("p1").unwrap());
        let p2 = Node::from(Place::new("p2").unwrap());
        let t1 = Node::from(Transition::new("t1").unwrap());
        assert!(p1.can_connect(&t1));
        assert!(t1.can_connect(&p1));
        assert!(!p1.can_connect(&p2));
        assert!(!t1.can_connect(&t1));
    }
}
