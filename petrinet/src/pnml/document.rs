use quick_xml::{de, events::Event, Reader};
use serde::Deserialize;

use crate::error::{PetriError, Result};

/// `<pnml>` root. Element names are matched without namespace prefix; children this crate does
/// not model (`toolspecific`, `inscription`, ...) are skipped by the deserializer.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(rename = "pnml")]
pub(crate) struct PnmlFile {
    #[serde(rename = "@xmlns")]
    pub namespace: Option<String>,
    #[serde(rename = "net", default)]
    pub nets: Vec<NetElement>,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub(crate) struct NetElement {
    #[serde(rename = "@type")]
    pub net_type: Option<String>,
    pub name: Option<Annotation>,
    pub page: Option<PageElement>,
}

/// `<name>` or `<initialMarking>`, both wrap a single `<text>`.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub(crate) struct Annotation {
    pub text: Option<String>,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub(crate) struct PageElement {
    #[serde(rename = "$value", default)]
    pub children: Vec<PageChild>,
}

/// Children of `<page>` in document order.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub(crate) enum PageChild {
    #[serde(rename = "place")]
    Place(PlaceElement),
    #[serde(rename = "transition")]
    Transition(TransitionElement),
    #[serde(rename = "arc")]
    Arc(ArcElement),
    #[serde(other)]
    Unsupported,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub(crate) struct PlaceElement {
    #[serde(rename = "@id")]
    pub id: Option<String>,
    #[serde(rename = "@type")]
    pub place_type: Option<String>,
    pub name: Option<Annotation>,
    #[serde(rename = "initialMarking")]
    pub initial_marking: Option<Annotation>,
    pub graphics: Option<Graphics>,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub(crate) struct TransitionElement {
    #[serde(rename = "@id")]
    pub id: Option<String>,
    #[serde(rename = "@type")]
    pub transition_type: Option<String>,
    pub name: Option<Annotation>,
    pub graphics: Option<Graphics>,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub(crate) struct ArcElement {
    #[serde(rename = "@source")]
    pub source: Option<String>,
    #[serde(rename = "@target")]
    pub target: Option<String>,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub(crate) struct Graphics {
    pub offset: Option<Offset>,
}

/// Coordinates are kept as written so that bad numbers can be reported with their element.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub(crate) struct Offset {
    #[serde(rename = "@x")]
    pub x: Option<String>,
    #[serde(rename = "@y")]
    pub y: Option<String>,
}

/// Deepest element nesting accepted. PNML itself needs six levels below the root.
const MAX_DEPTH: usize = 64;

/// Walk the raw events once: the root must be `<pnml>` and nesting must stay within
/// [`MAX_DEPTH`].
fn check_structure(xml: &str) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    let mut seen_root = false;
    loop {
        let entering = match reader.read_event()? {
            Event::Start(start) => {
                depth += 1;
                Some(start)
            }
            Event::Empty(start) => Some(start),
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                None
            }
            Event::Eof => break,
            _ => None,
        };
        let Some(start) = entering else {
            continue;
        };
        if !seen_root {
            seen_root = true;
            let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
            if name != "pnml" {
                return Err(PetriError::MalformedDocument(format!(
                    "Expected <pnml> root element, found <{name}>"
                )));
            }
        }
        if depth > MAX_DEPTH {
            return Err(PetriError::MalformedDocument(format!(
                "Elements nested deeper than {MAX_DEPTH} levels"
            )));
        }
    }
    if !seen_root {
        return Err(PetriError::MalformedDocument("Document has no root element".to_string()));
    }
    Ok(())
}

/// Deserialize a PNML document.
pub(crate) fn read_document(xml: &str) -> Result<PnmlFile> {
    check_structure(xml)?;
    Ok(de::from_str(xml)?)
}
