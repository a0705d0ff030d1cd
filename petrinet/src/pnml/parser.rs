use std::{fs, path::Path, str::FromStr};

use tracing::{debug, warn};

use crate::{
    error::{PetriError, Result},
    net::{PetriNetBuilder, PetriNetModel, PlaceType, Position, TransitionType},
};

use super::{
    document::{
        read_document, Annotation, ArcElement, Graphics, PageChild, PlaceElement,
        TransitionElement,
    },
    namespace::{normalize_namespace, Declared},
    PnmlConfig,
};

/// Read and build the net stored in the PNML file at `path`. The file is never modified.
#[tracing::instrument(level = "debug", skip(config))]
pub fn parse_file(path: &Path, config: &PnmlConfig) -> Result<PetriNetModel> {
    let xml = fs::read_to_string(path)?;
    parse_str(&xml, config)
}

/// Build the net described by a PNML document.
pub fn parse_str(xml: &str, config: &PnmlConfig) -> Result<PetriNetModel> {
    let mut file = read_document(xml)?;
    match normalize_namespace(&mut file, &config.namespace) {
        Declared::Expected => {}
        Declared::Missing => {
            debug!(expected = %config.namespace, "Document declares no namespace.")
        }
        Declared::Foreign(found) => {
            warn!(%found, expected = %config.namespace, "Reading document with foreign namespace.")
        }
    }

    let mut nets = file.nets.into_iter();
    let net = nets.next().ok_or_else(|| missing("pnml", "net"))?;
    if nets.next().is_some() {
        warn!("Document contains more than one <net>, only the first one is read.");
    }
    if net.net_type.as_ref().is_some_and(|net_type| *net_type != config.net_type) {
        debug!(net_type = ?net.net_type, "Unexpected net type.");
    }

    let name = annotation_text(net.name.as_ref(), "net", "name")?;
    let page = net.page.ok_or_else(|| missing("net", "page"))?;

    let mut builder = PetriNetBuilder::new(name);
    let mut starts = Vec::new();
    let mut finishes = Vec::new();
    let mut skipped = 0usize;
    for child in &page.children {
        match child {
            PageChild::Place(element) => {
                let (place_name, place_type) = read_place(&mut builder, element)?;
                match place_type {
                    PlaceType::Start => starts.push(place_name),
                    PlaceType::End => finishes.push(place_name),
                    PlaceType::Normal => {}
                }
            }
            PageChild::Transition(element) => read_transition(&mut builder, element)?,
            PageChild::Arc(element) => read_arc(&mut builder, element)?,
            PageChild::Unsupported => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(skipped, "Skipping unsupported elements in <page>.");
    }

    // further start/end places are rejected by build()
    if let Some(start) = starts.into_iter().next() {
        builder.set_start_node(start);
    }
    if let Some(finish) = finishes.into_iter().next() {
        builder.set_finish_node(finish);
    }

    let model = builder.build()?;
    debug!(
        net = model.name(),
        nodes = model.len(),
        arcs = model.arc_count(),
        "Parsed PNML document."
    );
    Ok(model)
}

fn missing(parent: &str, child: &str) -> PetriError {
    PetriError::MalformedDocument(format!("<{parent}> has no <{child}> element"))
}

/// Text of `<parent><child><text>..</text></child>`.
fn annotation_text<'a>(
    annotation: Option<&'a Annotation>,
    parent: &str,
    child: &str,
) -> Result<&'a str> {
    let annotation = annotation.ok_or_else(|| missing(parent, child))?;
    annotation.text.as_deref().ok_or_else(|| missing(child, "text"))
}

fn node_name(id: Option<&String>, name: Option<&Annotation>, element: &str) -> Result<String> {
    if let Some(id) = id {
        return Ok(id.clone());
    }
    name.and_then(|name| name.text.clone()).ok_or_else(|| {
        PetriError::MalformedDocument(format!("<{element}> has neither id nor name"))
    })
}

fn parse_value<T: FromStr>(value: &str, what: &str, element: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        PetriError::MalformedDocument(format!("Invalid {what} '{value}' in <{element}>"))
    })
}

fn read_position(graphics: Option<&Graphics>, element: &str) -> Result<Option<Position>> {
    let Some(offset) = graphics.and_then(|g| g.offset.as_ref()) else {
        return Ok(None);
    };
    let coordinate = |value: Option<&String>, key: &str| -> Result<f64> {
        let value = value.ok_or_else(|| {
            PetriError::MalformedDocument(format!("<offset> of <{element}> has no {key}"))
        })?;
        parse_value(value, key, "offset")
    };
    let x = coordinate(offset.x.as_ref(), "x")?;
    let y = coordinate(offset.y.as_ref(), "y")?;
    Ok(Some(Position::new(x, y)))
}

fn read_place(
    builder: &mut PetriNetBuilder,
    element: &PlaceElement,
) -> Result<(String, PlaceType)> {
    let name = node_name(element.id.as_ref(), element.name.as_ref(), "place")?;
    let place_type = match &element.place_type {
        Some(value) => value.parse()?,
        None => PlaceType::Normal,
    };
    let tokens = match &element.initial_marking {
        Some(marking) => {
            let text = annotation_text(Some(marking), "place", "initialMarking")?;
            parse_value(text, "initial marking", "place")?
        }
        None => 0,
    };

    let mut place =
        builder.new_place(name.as_str()).with_type(place_type).initial_marking(tokens);
    if let Some(position) = read_position(element.graphics.as_ref(), "place")? {
        place = place.at(position.x, position.y);
    }
    place.done_place();
    Ok((name, place_type))
}

fn read_transition(builder: &mut PetriNetBuilder, element: &TransitionElement) -> Result<()> {
    let name = node_name(element.id.as_ref(), element.name.as_ref(), "transition")?;
    let transition_type = match &element.transition_type {
        Some(value) => value.parse()?,
        None => TransitionType::User,
    };

    let mut transition = builder.new_transition(name).with_type(transition_type);
    if let Some(position) = read_position(element.graphics.as_ref(), "transition")? {
        transition = transition.at(position.x, position.y);
    }
    transition.done_transition();
    Ok(())
}

fn read_arc(builder: &mut PetriNetBuilder, element: &ArcElement) -> Result<()> {
    let endpoint = |value: &Option<String>, key: &str| {
        value.clone().ok_or_else(|| {
            PetriError::MalformedDocument(format!("<arc> has no {key} attribute"))
        })
    };
    builder.add_arc(endpoint(&element.source, "source")?, endpoint(&element.target, "target")?);
    Ok(())
}
