/// Serialize and parse chain-shaped nets of growing size
///
///   start ──► t1 ──► p1 ──► t2 ──► ... ──► tN ──► end
///
/// Every place carries a position and a marking, so all optional PNML elements are exercised.
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::Throughput;
use petrinet::net::PetriNetBuilder;
use petrinet::net::PetriNetModel;
use petrinet::net::PlaceType;
use petrinet::pnml;
use petrinet::pnml::PnmlConfig;

fn chain(size: u64) -> PetriNetModel {
    let mut net = PetriNetBuilder::new(format!("chain-{size}"));
    net.new_place("start")
        .with_type(PlaceType::Start)
        .initial_marking(1)
        .at(0.0, 0.0)
        .done_place();
    let mut previous = "start".to_string();
    for i in 1..=size {
        let tr = format!("t{i}");
        let pl = if i == size { "end".to_string() } else { format!("p{i}") };
        let place_type = if i == size { PlaceType::End } else { PlaceType::Normal };
        net.new_transition(&tr).at(i as f64 * 50.0, 10.0).done_transition();
        net.new_place(&pl).with_type(place_type).at(i as f64 * 50.0 + 25.0, 0.0).done_place();
        net.add_arc(&previous, &tr).add_arc(&tr, &pl);
        previous = pl;
    }
    net.set_start_node("start").set_finish_node("end");
    net.build().expect("chain net is valid")
}

fn roundtrip(c: &mut Criterion) {
    let config = PnmlConfig::default();
    let mut group = c.benchmark_group("pnml");
    for size in [10, 100, 1000] {
        let net = chain(size);
        let xml = pnml::to_string(&net, &config).expect("serializable");
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("serialize", size), &net, |b, net| {
            b.iter(|| pnml::to_string(net, &config))
        });
        group.bench_with_input(BenchmarkId::new("parse", size), &xml, |b, xml| {
            b.iter(|| pnml::parse_str(xml, &config))
        });
    }
    group.finish();
}

criterion_group!(benches, roundtrip);
criterion_main!(benches);
