use spike_sim::{
    CellType, Connector, IfCurrExp, RecordVariables, SimConfig, SimError, Simulator, StaticSynapse,
    StdpMechanism,
};

/// One injector neuron driving one LIF neuron through a static synapse.
fn relay(weight: f64, delay: f64) -> Simulator {
    let mut sim = Simulator::new(SimConfig::default());
    let input = sim.population("in", 1, CellType::SpikeInjector).unwrap();
    let output = sim
        .population("out", 1, CellType::IfCurrExp(IfCurrExp::default()))
        .unwrap();
    sim.projection(input, output, Connector::OneToOne, StaticSynapse::new(weight, delay))
        .unwrap();
    sim.record(input, RecordVariables::spikes()).unwrap();
    sim.record(output, RecordVariables::spikes_and_v()).unwrap();
    sim
}

#[test]
fn test_injected_spike_arrives_after_delay() {
    let mut sim = relay(20.0, 1.0);
    sim.spike_sender().send_spike("in", 0).unwrap();
    sim.run(10.0);

    let out = sim.get_data(sim.id_of("out").unwrap()).unwrap();
    assert_eq!(out.spikes[0].first(), Some(&1.0), "spike at 0 ms + 1 ms delay");

    let input = sim.get_data(sim.id_of("in").unwrap()).unwrap();
    assert_eq!(input.spikes[0], vec![0.0]);
}

#[test]
fn test_longer_delay_shifts_output() {
    let mut sim = relay(20.0, 5.0);
    sim.spike_sender().send_spike("in", 0).unwrap();
    sim.run(20.0);

    let out = sim.get_data(sim.id_of("out").unwrap()).unwrap();
    assert_eq!(out.spikes[0].first(), Some(&5.0));
}

#[test]
fn test_no_input_no_output() {
    let mut sim = relay(20.0, 1.0);
    let summary = sim.run(50.0);

    assert_eq!(summary.spikes, 0);
    let out = sim.get_data(sim.id_of("out").unwrap()).unwrap();
    assert!(out.spikes[0].is_empty());
    assert_eq!(out.v[0].len(), 50, "one membrane sample per step");
    assert!(out.v[0].iter().all(|&v| v == -65.0));
}

#[test]
fn test_time_continues_across_runs() {
    let mut sim = relay(20.0, 1.0);
    let first = sim.run(10.0);
    let second = sim.run(15.0);

    assert_eq!(first.start_ms, 0.0);
    assert_eq!(second.start_ms, 10.0);
    assert_eq!(second.end_ms, 25.0);
    assert_eq!(sim.time_ms(), 25.0);
    assert_eq!(sim.handle().time_ms(), 25.0);
}

#[test]
fn test_duplicate_label_rejected() {
    let mut sim = Simulator::new(SimConfig::default());
    sim.population("a", 2, CellType::SpikeInjector).unwrap();
    let err = sim.population("a", 3, CellType::SpikeInjector).unwrap_err();
    assert_eq!(err, SimError::DuplicateLabel("a".into()));
}

#[test]
fn test_one_to_one_size_mismatch_rejected() {
    let mut sim = Simulator::new(SimConfig::default());
    let a = sim.population("a", 6, CellType::SpikeInjector).unwrap();
    let b = sim
        .population("b", 1, CellType::IfCurrExp(IfCurrExp::default()))
        .unwrap();
    let result = sim.projection(a, b, Connector::OneToOne, StaticSynapse::new(1.0, 1.0));
    assert!(matches!(result, Err(SimError::ConnectorMismatch { .. })));
}

#[test]
fn test_invalid_delay_rejected() {
    let mut sim = Simulator::new(SimConfig::default());
    let a = sim.population("a", 1, CellType::SpikeInjector).unwrap();
    let b = sim
        .population("b", 1, CellType::IfCurrExp(IfCurrExp::default()))
        .unwrap();
    let result = sim.projection(a, b, Connector::OneToOne, StaticSynapse::new(1.0, 1000.0));
    assert!(matches!(result, Err(SimError::InvalidDelay(_))));
}

#[test]
fn test_start_callbacks_fire_every_run_until_cleared() {
    let mut sim = relay(20.0, 1.0);
    sim.add_start_callback(
        "kick",
        Box::new(|sender| {
            let _ = sender.send_spike("in", 0);
        }),
    );
    assert_eq!(sim.start_callback_count(), 1);

    sim.run(5.0);
    sim.run(5.0);
    let input = sim.get_data(sim.id_of("in").unwrap()).unwrap();
    assert_eq!(input.spikes[0], vec![0.0, 5.0], "one kick at the start of each run");

    sim.clear_start_callbacks("kick");
    assert_eq!(sim.start_callback_count(), 0);
    sim.run(5.0);
    let input = sim.get_data(sim.id_of("in").unwrap()).unwrap();
    assert_eq!(input.spikes[0].len(), 2);
}

#[test]
fn test_stopped_handle_ends_run() {
    let mut sim = relay(20.0, 1.0);
    sim.handle().stop();
    let summary = sim.run(100.0);
    assert!(summary.stopped_early);
    assert_eq!(summary.steps, 0);
}

/// Pre injector A feeds the post neuron through a plastic synapse.
/// Injector B forces the post neuron to fire through a strong static synapse.
fn stdp_pair() -> (Simulator, spike_sim::ProjectionId) {
    let mut sim = Simulator::new(SimConfig::default());
    let a = sim.population("a", 1, CellType::SpikeInjector).unwrap();
    let b = sim.population("b", 1, CellType::SpikeInjector).unwrap();
    let post = sim
        .population("post", 1, CellType::IfCurrExp(IfCurrExp::default()))
        .unwrap();
    let plastic = sim
        .projection(a, post, Connector::AllToAll, StdpMechanism::default())
        .unwrap();
    sim.projection(b, post, Connector::AllToAll, StaticSynapse::new(20.0, 1.0))
        .unwrap();
    (sim, plastic)
}

#[test]
fn test_pre_before_post_potentiates() {
    let (mut sim, plastic) = stdp_pair();
    let sender = sim.spike_sender();
    sender.send_spike("a", 0).unwrap();
    sender.send_spike("b", 0).unwrap();
    sim.run(10.0);

    let w = sim.weights(plastic).unwrap()[0];
    assert!(w > 2.0, "weight should grow, got {}", w);
}

#[test]
fn test_post_before_pre_depresses() {
    let (mut sim, plastic) = stdp_pair();
    let sender = sim.spike_sender();
    sender.send_spike("b", 0).unwrap();
    sim.run(5.0);
    sender.send_spike("a", 0).unwrap();
    sim.run(5.0);

    let w = sim.weights(plastic).unwrap()[0];
    assert!(w < 2.0, "weight should shrink, got {}", w);
}

#[test]
fn test_static_weights_never_change() {
    let mut sim = relay(20.0, 1.0);
    let sender = sim.spike_sender();
    for _ in 0..5 {
        sender.send_spike("in", 0).unwrap();
        sim.run(10.0);
    }
    let proj = spike_sim::ProjectionId(0);
    assert_eq!(sim.weights(proj).unwrap(), vec![20.0]);
}

#[test]
fn test_recording_serializes() {
    let mut sim = relay(20.0, 1.0);
    sim.spike_sender().send_spike("in", 0).unwrap();
    sim.run(3.0);

    let data = sim.get_data(sim.id_of("in").unwrap()).unwrap();
    let json = serde_json::to_string(&data).unwrap();
    assert!(json.contains("\"label\":\"in\""));
    let back: spike_sim::Recording = serde_json::from_str(&json).unwrap();
    assert_eq!(back, data);
}
