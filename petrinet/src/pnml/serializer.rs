use std::{
    fs,
    io::{self, Cursor},
    path::{Path, PathBuf},
};

use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};
use tracing::debug;

use crate::{
    error::{PetriError, Result},
    net::{Node, PetriNetModel, Position},
};

use super::PnmlConfig;

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn write_start(writer: &mut XmlWriter, tag: &str, attrs: &[(&str, &str)]) -> io::Result<()> {
    let mut elem = BytesStart::new(tag);
    for attr in attrs {
        elem.push_attribute(*attr);
    }
    writer.write_event(Event::Start(elem))
}

fn write_end(writer: &mut XmlWriter, tag: &str) -> io::Result<()> {
    writer.write_event(Event::End(BytesEnd::new(tag)))
}

fn write_empty(writer: &mut XmlWriter, tag: &str, attrs: &[(&str, &str)]) -> io::Result<()> {
    let mut elem = BytesStart::new(tag);
    for attr in attrs {
        elem.push_attribute(*attr);
    }
    writer.write_event(Event::Empty(elem))
}

/// `<tag><text>content</text></tag>`
fn write_text_tag(writer: &mut XmlWriter, tag: &str, content: &str) -> io::Result<()> {
    write_start(writer, tag, &[])?;
    write_start(writer, "text", &[])?;
    writer.write_event(Event::Text(BytesText::new(content)))?;
    write_end(writer, "text")?;
    write_end(writer, tag)
}

fn write_graphics(writer: &mut XmlWriter, position: Option<Position>) -> io::Result<()> {
    let Some(position) = position else {
        return Ok(());
    };
    let (x, y) = (position.x.to_string(), position.y.to_string());
    write_start(writer, "graphics", &[])?;
    write_empty(writer, "offset", &[("x", x.as_str()), ("y", y.as_str())])?;
    write_end(writer, "graphics")
}

fn write_node(writer: &mut XmlWriter, node: &Node) -> io::Result<()> {
    match node {
        Node::Place(pl) => {
            let attrs = [("id", pl.name()), ("type", pl.place_type().as_str())];
            write_start(writer, "place", &attrs)?;
            write_text_tag(writer, "name", pl.name())?;
            if pl.tokens() > 0 {
                write_text_tag(writer, "initialMarking", &pl.tokens().to_string())?;
            }
            write_graphics(writer, pl.position())?;
            write_end(writer, "place")
        }
        Node::Transition(tr) => {
            let attrs = [("id", tr.name()), ("type", tr.transition_type().as_str())];
            write_start(writer, "transition", &attrs)?;
            write_text_tag(writer, "name", tr.name())?;
            write_graphics(writer, tr.position())?;
            write_end(writer, "transition")
        }
    }
}

/// Render `model` as a PNML document.
///
/// The model is expected to come out of a builder or the parser and is not validated again.
/// Nodes are written in insertion order, followed by one `<arc>` per connection.
pub fn to_string(model: &PetriNetModel, config: &PnmlConfig) -> Result<String> {
    let mut writer = match config.indent {
        0 => Writer::new(Cursor::new(Vec::new())),
        indent => Writer::new_with_indent(Cursor::new(Vec::new()), b' ', indent),
    };
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_start(&mut writer, "pnml", &[("xmlns", config.namespace.as_str())])?;
    let net_attrs = [("id", model.name()), ("type", config.net_type.as_str())];
    write_start(&mut writer, "net", &net_attrs)?;
    write_text_tag(&mut writer, "name", model.name())?;
    write_start(&mut writer, "page", &[("id", "page1")])?;

    for node in model.nodes() {
        write_node(&mut writer, node)?;
    }
    for (from, to) in model.connections() {
        let id = format!("{from}_{to}");
        let attrs = [("id", id.as_str()), ("source", from), ("target", to)];
        write_empty(&mut writer, "arc", &attrs)?;
    }

    write_end(&mut writer, "page")?;
    write_end(&mut writer, "net")?;
    write_end(&mut writer, "pnml")?;

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes)
        .map_err(|err| PetriError::IOError(io::Error::new(io::ErrorKind::InvalidData, err)))
}

/// Write `model` to `path`, replacing any existing file.
pub fn write_file(model: &PetriNetModel, path: &Path, config: &PnmlConfig) -> Result<()> {
    let xml = to_string(model, config)?;
    fs::write(path, xml)?;
    debug!(
        net = model.name(),
        path = %path.display(),
        nodes = model.len(),
        arcs = model.arc_count(),
        "Wrote PNML document."
    );
    Ok(())
}

/// Write `model` to `<output_dir>/<net name>.pnml` and return that path.
#[tracing::instrument(level = "debug", skip_all, fields(net = model.name()))]
pub fn save(model: &PetriNetModel, config: &PnmlConfig) -> Result<PathBuf> {
    let path = config.path_for(model.name())?;
    fs::create_dir_all(&config.output_dir)?;
    write_file(model, &path, config)?;
    Ok(path)
}
