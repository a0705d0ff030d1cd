use petrinet::{
    error::Result as PetriResult,
    net::{PetriNetBuilder, PlaceType, TransitionType},
    pnml::{self, PnmlConfigBuilder},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Builds the following net and writes it to `./nets/leave-request.pnml`:
///
///   submitted ──► review ──► reviewed ──► approve ──► approved
///                   ▲                        │
///                   └──────── reject ◄───────┘ (reviewed)
#[tracing::instrument(level = "info")]
fn run() -> PetriResult<()> {
    let mut net = PetriNetBuilder::new("leave-request");
    net.new_place("submitted")
        .with_type(PlaceType::Start)
        .initial_marking(1)
        .at(40.0, 100.0)
        .done_place()
        .new_transition("review")
        .at(140.0, 100.0)
        .done_transition()
        .new_place("reviewed")
        .at(240.0, 100.0)
        .done_place()
        .new_transition("approve")
        .with_type(TransitionType::Admin)
        .at(340.0, 100.0)
        .done_transition()
        .new_transition("reject")
        .with_type(TransitionType::Admin)
        .at(240.0, 200.0)
        .done_transition()
        .new_place("approved")
        .with_type(PlaceType::End)
        .at(440.0, 100.0)
        .done_place()
        .add_arc("submitted", "review")
        .add_arc("review", "reviewed")
        .add_arc("reviewed", "approve")
        .add_arc("approve", "approved")
        .add_arc("reviewed", "reject")
        .add_arc("reject", "submitted")
        .set_start_node("submitted")
        .set_finish_node("approved");

    // a place-to-place arc is only detected on build
    let mut broken = net.clone();
    broken.add_arc("submitted", "approved");
    if let Err(err) = broken.build() {
        warn!("Rejected net: {}", err);
    }

    let model = net.build()?;
    let config = PnmlConfigBuilder::default().output_dir("nets").build()?;
    let path = pnml::save(&model, &config)?;
    info!(path = %path.display(), "Saved net.");
    Ok(())
}

fn main() -> PetriResult<()> {
    // set up logging
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,petrinet=debug")),
        )
        .init();

    run()
}
