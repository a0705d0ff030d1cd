use std::path::PathBuf;

use petrinet::{
    error::Result as PetriResult,
    net::{Node, PetriNetBuilder},
    pnml::{self, PnmlConfig},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Reads a PNML file (default: the one written by `01-build-and-save`), prints its structure,
/// renames a node and writes the result next to the original.
fn run(path: PathBuf) -> PetriResult<()> {
    let config = PnmlConfig::default();
    let model = pnml::parse_file(&path, &config)?;
    info!(
        net = model.name(),
        start = ?model.start(),
        finish = ?model.finish(),
        "Loaded net."
    );
    for node in model.nodes() {
        let kind = match node {
            Node::Place(pl) => format!("place ({}, {} tokens)", pl.place_type(), pl.tokens()),
            Node::Transition(tr) => format!("transition ({})", tr.transition_type()),
        };
        let successors = model.get_successors(node.name());
        info!(node = node.name(), shape = %node.shape_key(), "{kind} -> {successors:?}");
    }

    let Some(start) = model.start() else {
        return Ok(());
    };
    let mut editor = PetriNetBuilder::from_model(&model);
    editor.rename_node(start, "entry")?;
    let renamed = editor.build()?;
    let target = path.with_file_name(format!("{}-renamed.pnml", model.name()));
    pnml::write_file(&renamed, &target, &config)?;
    info!(path = %target.display(), "Saved renamed copy.");
    Ok(())
}

fn main() {
    // set up logging
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(EnvFilter::try_new("info,petrinet=debug").unwrap())
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("nets/leave-request.pnml"));
    if let Err(err) = run(path) {
        error!("Could not process net: {}", err);
    }
}
