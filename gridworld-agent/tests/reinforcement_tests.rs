//! Reward and punishment schedules played into the asynchronous network.

use gridworld_agent::config::TimingConfig;
use gridworld_agent::network::{
    first_in_block, ActorCriticNetwork, ActorCriticOptions, CRITIC_INPUT, FIRST_SPIKE_TRIGGER,
    INPUT, POST,
};
use gridworld_agent::reinforcement::{punish, reward, spike_count, TimedSpike};
use spike_sim::SimConfig;

fn network(steps: usize) -> ActorCriticNetwork {
    ActorCriticNetwork::build(SimConfig::default(), ActorCriticOptions::asynchronous(steps)).unwrap()
}

/// Send each spike once the network reaches its time, then let it settle.
fn play(net: &mut ActorCriticNetwork, schedule: &[TimedSpike]) {
    let sender = net.sim.spike_sender();
    let start = net.sim.time_ms();
    for spike in schedule {
        net.sim.run(start + spike.at_ms - net.sim.time_ms());
        sender.send_spike(spike.label, spike.neuron).unwrap();
    }
    net.sim.run(1500.0);
}

/// The first block-`step` neuron to answer a trigger.
fn first_answer(net: &mut ActorCriticNetwork, step: usize) -> Option<usize> {
    let mut rx = net.sim.live_receiver(&[POST]).unwrap();
    net.sim.spike_sender().send_spike(FIRST_SPIKE_TRIGGER, step).unwrap();
    net.sim.run(500.0);
    while let Some(event) = rx.try_recv() {
        if let Some(id) = first_in_block(&event, step) {
            return Some(id);
        }
    }
    None
}

#[test]
fn test_reward_raises_and_punishment_lowers_weights() {
    let timing = TimingConfig::default();
    let mut net = network(3);

    play(&mut net, &reward(&[1], 1, 3, &timing));
    play(&mut net, &punish(&[2], 1, 3, &timing));

    let w = net.weights().unwrap();
    assert!(w[1] > 2.0, "rewarded weight {}", w[1]);
    assert!(w[2] < 2.0, "punished weight {}", w[2]);
    assert_eq!(w[0], 2.0);
    assert_eq!(w[3], 2.0);
    assert!(w[4..].iter().all(|&x| x == 2.0), "other steps untouched: {:?}", w);
}

#[test]
fn test_first_spike_names_the_rewarded_action() {
    let timing = TimingConfig::default();
    let mut net = network(3);
    play(&mut net, &reward(&[1], 1, 3, &timing));
    play(&mut net, &punish(&[2], 1, 3, &timing));

    // Right (0) has the lowest index but an untrained weight
    assert_eq!(first_answer(&mut net, 0), Some(1));
}

#[test]
fn test_punishment_of_several_commands_at_once() {
    let timing = TimingConfig::default();
    let mut net = network(3);

    play(&mut net, &punish(&[0, 3], 1, 3, &timing));
    play(&mut net, &reward(&[1, 2], 1, 3, &timing));

    let w = net.weights().unwrap();
    assert!(w[0] < 2.0 && w[3] < 2.0, "punished {:?}", w);
    assert!(w[1] > 2.0 && w[2] > 2.0, "rewarded {:?}", w);
}

#[test]
fn test_punish_schedule_leads_with_the_critic() {
    let timing = TimingConfig::default();
    let schedule = punish(&[5, 6], 2, 3, &timing);

    // Owed 2 and 3 spikes
    assert_eq!(spike_count(3, 2, 0), 2);
    assert_eq!(spike_count(3, 2, 1), 3);
    let critic: Vec<_> = schedule.iter().filter(|s| s.label == CRITIC_INPUT).collect();
    let input: Vec<_> = schedule.iter().filter(|s| s.label == INPUT).collect();
    assert_eq!(critic.iter().filter(|s| s.neuron == 5).count(), 2);
    assert_eq!(critic.iter().filter(|s| s.neuron == 6).count(), 3);
    assert_eq!(critic.len(), input.len());

    for (c, i) in critic.iter().zip(&input) {
        assert_eq!(c.neuron, i.neuron);
        assert_eq!(i.at_ms - c.at_ms, timing.punish_lead_ms);
    }
    assert!(schedule.windows(2).all(|w| w[0].at_ms <= w[1].at_ms), "sorted by time");
    assert_eq!(schedule.last().map(|s| s.at_ms), Some(2.0 * timing.punish_interval_ms + timing.punish_lead_ms));
}

#[test]
fn test_reward_schedule_is_input_only() {
    let timing = TimingConfig::default();
    let schedule = reward(&[3, 0], 3, 3, &timing);

    assert!(schedule.iter().all(|s| s.label == INPUT));
    assert_eq!(schedule.iter().filter(|s| s.neuron == 3).count(), 1);
    assert_eq!(schedule.iter().filter(|s| s.neuron == 0).count(), 2);
    assert_eq!(schedule.last().map(|s| s.at_ms), Some(timing.reinforce_gap_ms));
    assert!(reward(&[], 1, 3, &timing).is_empty());
}
