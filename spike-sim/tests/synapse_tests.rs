use spike_sim::connector::Connector;
use spike_sim::synapse::{AdditiveWeightDependence, SpikePairRule, StaticSynapse, StdpMechanism, SynapseType};
use spike_sim::SimError;

#[test]
fn test_potentiation_scales_with_range() {
    let stdp = StdpMechanism::default();
    let w = stdp.potentiate(2.0, 1.0);
    // a_plus * (w_max - w_min) = 0.001 * 10
    assert!((w - 2.01).abs() < 1e-12, "got {}", w);
}

#[test]
fn test_depression_scales_with_trace() {
    let stdp = StdpMechanism::default();
    let w = stdp.depress(2.0, 0.5);
    assert!((w - 1.995).abs() < 1e-12, "got {}", w);
}

#[test]
fn test_weights_are_clamped() {
    let stdp = StdpMechanism {
        timing: SpikePairRule { tau_plus: 20.0, tau_minus: 20.0, a_plus: 0.5, a_minus: 0.5 },
        weight_dependence: AdditiveWeightDependence { w_min: 0.0, w_max: 25.0 },
        weight: 2.0,
        delay: 1.0,
    };
    assert_eq!(stdp.potentiate(24.0, 10.0), 25.0);
    assert_eq!(stdp.depress(1.0, 10.0), 0.0);
}

#[test]
fn test_synapse_type_accessors() {
    let s: SynapseType = StaticSynapse::new(5.0, 2.0).into();
    assert_eq!(s.initial_weight(), 5.0);
    assert_eq!(s.delay(), 2.0);
    assert!(s.plasticity().is_none());

    let p: SynapseType = StdpMechanism::default().into();
    assert!(p.plasticity().is_some());
}

#[test]
fn test_one_to_one_requires_equal_sizes() {
    assert_eq!(Connector::OneToOne.connections(3, 3).unwrap(), vec![(0, 0), (1, 1), (2, 2)]);
    assert!(matches!(
        Connector::OneToOne.connections(6, 1),
        Err(SimError::ConnectorMismatch { pre: 6, post: 1, .. })
    ));
}

#[test]
fn test_all_to_all_count() {
    let pairs = Connector::AllToAll.connections(6, 2).unwrap();
    assert_eq!(pairs.len(), 12);
    assert_eq!(pairs[1], (0, 1));
}

#[test]
fn test_from_list_bounds() {
    let ok = Connector::FromList(vec![(0, 0), (0, 3), (1, 4)]);
    assert_eq!(ok.connections(2, 8).unwrap().len(), 3);

    let bad = Connector::FromList(vec![(0, 8)]);
    assert!(bad.connections(2, 8).is_err());
}
