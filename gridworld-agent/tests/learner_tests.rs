//! Learners end to end on a tiny level, with time compressed so each run
//! takes milliseconds of wall time.

use gridworld_agent::async_learner::{explore, Critic};
use gridworld_agent::sync_learner::SyncLearner;
use gridworld_agent::{
    async_learner, random_spikes, shared_game, vision_input, Action, AgentConfig, RunReport,
    StepOutcome,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn fast_config(steps: usize) -> AgentConfig {
    let mut config = AgentConfig::default();
    config.time_scale = 0.001;
    config.game.level = "..........\n.......G..\n.....###..\n.C........\n##########".to_string();
    config.game.cell_size = 8;
    config.learning.steps = steps;
    config.learning.base_run_ms = 200.0;
    config.learning.run_increment_ms = 100.0;
    config.learning.step_budget_ms = 1000.0;
    config.learning.iterations = 3;
    config.learning.iteration_run_ms = 200.0;
    config.learning.seed = Some(7);
    config.random.initial_delay_ms = 0.0;
    config.random.max_interval_ms = 20.0;
    config.random.run_ms = 200.0;
    config.random.horizontal_period_ms = 50.0;
    config.random.jump_period_ms = 80.0;
    config
}

#[test]
fn test_synchronous_report_structure() {
    let config = fast_config(2);
    let game = shared_game(&config).unwrap();
    let report = SyncLearner::new(config, game).unwrap().run().unwrap();

    assert_eq!(report.mode, "synchronous");
    assert_eq!(report.steps, 2);
    assert_eq!(report.history.len(), 2);
    assert_eq!(report.history[0].outcome, StepOutcome::Baseline);
    assert_eq!(report.weights.steps.len(), 2);
    assert_eq!(report.weights.samples(), 2, "one sample per episode");
    assert_eq!(report.final_weights.len(), 8);
    let recording = report.recording.as_ref().unwrap();
    assert_eq!(recording.label, "post");
}

#[test]
fn test_synchronous_first_episode_acts_on_vision() {
    let config = fast_config(1);
    let game = shared_game(&config).unwrap();
    let report = SyncLearner::new(config, game).unwrap().run().unwrap();

    // Goal is up and to the right, so only the jump-right neuron is driven
    let actions = &report.history[0].actions;
    assert!(
        actions.iter().all(|a| *a == gridworld_agent::Action::JumpRight),
        "got {:?}",
        actions
    );
}

#[test]
fn test_vision_iterations_report() {
    let config = fast_config(1);
    let game = shared_game(&config).unwrap();
    let report = SyncLearner::new(config, game).unwrap().vision_iterations().unwrap();

    assert_eq!(report.mode, "vision-iterations");
    assert_eq!(report.history.len(), 3);
    assert_eq!(report.weights.samples(), 3);
}

#[test]
fn test_report_json_roundtrip() {
    let config = fast_config(1);
    let game = shared_game(&config).unwrap();
    let report = SyncLearner::new(config, game).unwrap().run().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    report.write_json(&path).unwrap();
    let back = RunReport::read_json(&path).unwrap();
    assert_eq!(back.history, report.history);
    assert_eq!(back.final_weights, report.final_weights);
}

#[test]
fn test_learner_rejects_invalid_config() {
    let mut config = fast_config(1);
    config.learning.steps = 0;
    let game = shared_game(&fast_config(1)).unwrap();
    assert!(SyncLearner::new(config, game).is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_asynchronous_report_structure() {
    let config = fast_config(2);
    let game = shared_game(&config).unwrap();
    let report = async_learner::run(config, game).await.unwrap();

    assert_eq!(report.mode, "asynchronous");
    assert_eq!(report.history.len(), 2);
    assert_eq!(report.history[0].step, 1);
    assert_eq!(report.history[0].outcome, StepOutcome::Baseline);
    assert!(!report.history[0].explored);
    assert!(!report.history[0].actions.is_empty(), "the first step always acts");
    assert_eq!(report.weights.samples(), 1);
    assert_eq!(report.final_weights.len(), 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_random_spikes_recording() {
    let config = fast_config(1);
    let game = shared_game(&config).unwrap();
    let recording = random_spikes::run(config, game).await.unwrap();

    assert_eq!(recording.label, "state");
    assert_eq!(recording.spikes.len(), 6);
    assert!(recording.v.iter().all(|trace| trace.len() == 200));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_vision_input_recording() {
    let config = fast_config(1);
    let game = shared_game(&config).unwrap();
    let recording = vision_input::run(config, game).await.unwrap();

    assert_eq!(recording.label, "state");
    assert_eq!(recording.spikes.len(), 6);
}

#[test]
fn test_critic_explores_after_a_worse_step() {
    let mut critic = Critic::new(5);
    assert_eq!(critic.assess((100, -40)), StepOutcome::Baseline);
    assert!(!critic.exploring());

    assert_eq!(critic.assess((120, -40)), StepOutcome::Worse);
    assert!(critic.exploring());

    // Still worse while exploring: keep exploring
    assert_eq!(critic.assess((130, -40)), StepOutcome::Worse);
    assert!(critic.exploring());

    assert_eq!(critic.assess((60, -40)), StepOutcome::Better);
    assert!(!critic.exploring());
}

#[test]
fn test_explore_heads_the_other_way() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..200 {
        let pick = explore(Action::JumpRight, &mut rng);
        assert!(!pick.is_rightward(), "got {}", pick);
        seen.insert(pick);
        assert!(explore(Action::Left, &mut rng).is_rightward());
    }
    assert_eq!(seen.len(), 2, "both leftward actions get picked");
}
