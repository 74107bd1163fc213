//! The spiking networks the demos and learners run.

use spike_sim::{
    AdditiveWeightDependence, CellType, Connector, IfCurrExp, LiveSpikeEvent, PopulationId,
    ProjectionId, RecordVariables, SimConfig, Simulator, SpikePairRule, StaticSynapse, StdpMechanism,
};

use crate::action::{Action, KeyCommand, ACTIONS_PER_STEP};
use crate::error::Result;

pub const STATE_INPUT: &str = "state_input";
pub const STATE: &str = "state";
pub const ACTOR: &str = "actor";

pub const INPUT: &str = "input";
pub const PRE: &str = "pre";
pub const POST: &str = "post";
pub const CRITIC_INPUT: &str = "critic_input";
pub const FIRST_SPIKE_TRIGGER: &str = "first_spike_trigger";

/// Weight of every static input synapse.
const INPUT_WEIGHT: f64 = 5.0;

/// State cells integrate slowly and stay quiet for a while after firing.
fn state_cell() -> IfCurrExp {
    IfCurrExp::default().with_tau_syn_e(100.0).with_tau_refrac(50.0)
}

/// Post cells hold a short window and a long refractory period, so a block
/// answers one trigger with one spike.
fn post_cell() -> IfCurrExp {
    IfCurrExp::default().with_tau_syn_e(25.0).with_tau_refrac(100.0)
}

// =============================================================================
// Keyboard state -> actor
// =============================================================================

/// Six keyboard neurons feeding one actor neuron through plastic synapses.
///
/// ```text
/// state_input (6 injectors) --static 5--> state (6 LIF) --STDP all-to-all--> actor (1 LIF)
/// ```
///
/// Live output is enabled on `state`; its spikes are the key commands.
pub struct StateActorNetwork {
    pub sim: Simulator,
    pub input: PopulationId,
    pub state: PopulationId,
    pub actor: PopulationId,
    pub plastic: ProjectionId,
}

impl StateActorNetwork {
    pub fn build(config: SimConfig) -> Result<Self> {
        let mut sim = Simulator::new(config);
        let n = KeyCommand::COUNT;

        let input = sim.population(STATE_INPUT, n, CellType::SpikeInjector)?;
        let state = sim.population(STATE, n, CellType::IfCurrExp(state_cell()))?;
        let actor = sim.population(ACTOR, 1, CellType::IfCurrExp(IfCurrExp::default()))?;

        let stdp = StdpMechanism {
            timing: SpikePairRule {
                tau_plus: 20.0,
                tau_minus: 20.0,
                a_plus: 0.5,
                a_minus: 0.5,
            },
            weight_dependence: AdditiveWeightDependence {
                w_min: 0.0,
                w_max: 25.0,
            },
            weight: 2.0,
            delay: 1.0,
        };
        // Six cells into one cannot be one-to-one
        let plastic = sim.projection(state, actor, Connector::AllToAll, stdp)?;
        sim.projection(input, state, Connector::OneToOne, StaticSynapse::new(INPUT_WEIGHT, 1.0))?;

        sim.record(state, RecordVariables::spikes_and_v())?;
        sim.record(actor, RecordVariables::spikes_and_v())?;
        sim.activate_live_output_for(state)?;
        sim.activate_live_output_for(input)?;

        Ok(Self {
            sim,
            input,
            state,
            actor,
            plastic,
        })
    }
}

// =============================================================================
// Actor-critic
// =============================================================================

/// Shape of an [`ActorCriticNetwork`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorCriticOptions {
    pub steps: usize,
    /// Delay of the input -> pre synapses (ms).
    pub input_delay_ms: f64,
    /// Add a `critic_input` population that drives `post` directly.
    pub critic: bool,
    /// Add a `first_spike_trigger` population that re-plays a whole step.
    pub trigger: bool,
}

impl ActorCriticOptions {
    /// The synchronous learner: input only.
    pub fn synchronous(steps: usize) -> Self {
        Self {
            steps,
            input_delay_ms: 1.0,
            critic: false,
            trigger: false,
        }
    }

    /// The asynchronous learner: input, critic and trigger.
    pub fn asynchronous(steps: usize) -> Self {
        Self {
            steps,
            input_delay_ms: 2.0,
            critic: true,
            trigger: true,
        }
    }
}

/// One block of four pre/post neurons per step, one per action.
///
/// ```text
/// input ------static 5-----> pre ==STDP one-to-one==> post
/// first_spike_trigger --list--^                        ^
/// critic_input --------------static 5 ----------------+
/// ```
///
/// Weight `step * 4 + a` of the plastic projection is the learned value of
/// taking action `a` at `step`.
pub struct ActorCriticNetwork {
    pub sim: Simulator,
    pub steps: usize,
    pub input: PopulationId,
    pub pre: PopulationId,
    pub post: PopulationId,
    pub critic: Option<PopulationId>,
    pub trigger: Option<PopulationId>,
    pub plastic: ProjectionId,
}

impl ActorCriticNetwork {
    pub fn build(config: SimConfig, options: ActorCriticOptions) -> Result<Self> {
        let mut sim = Simulator::new(config);
        let n = options.steps * ACTIONS_PER_STEP;

        let input = sim.population(INPUT, n, CellType::SpikeInjector)?;
        let critic = if options.critic {
            Some(sim.population(CRITIC_INPUT, n, CellType::SpikeInjector)?)
        } else {
            None
        };
        let trigger = if options.trigger {
            Some(sim.population(FIRST_SPIKE_TRIGGER, options.steps, CellType::SpikeInjector)?)
        } else {
            None
        };
        let pre = sim.population(PRE, n, CellType::IfCurrExp(state_cell()))?;
        let post = sim.population(POST, n, CellType::IfCurrExp(post_cell()))?;

        let plastic = sim.projection(pre, post, Connector::OneToOne, StdpMechanism::default())?;
        sim.projection(
            input,
            pre,
            Connector::OneToOne,
            StaticSynapse::new(INPUT_WEIGHT, options.input_delay_ms),
        )?;
        if let Some(critic) = critic {
            // Zero delay is raised to the one-step minimum
            sim.projection(critic, post, Connector::OneToOne, StaticSynapse::new(INPUT_WEIGHT, 0.0))?;
        }
        if let Some(trigger) = trigger {
            let pairs = (0..options.steps)
                .flat_map(|step| Action::ALL.into_iter().map(move |a| (step, a.neuron(step))))
                .collect();
            sim.projection(
                trigger,
                pre,
                Connector::FromList(pairs),
                StaticSynapse::new(INPUT_WEIGHT, 2.0),
            )?;
        }

        sim.record(pre, RecordVariables::spikes_and_v())?;
        sim.record(post, RecordVariables::spikes_and_v())?;
        sim.activate_live_output_for(post)?;

        Ok(Self {
            sim,
            steps: options.steps,
            input,
            pre,
            post,
            critic,
            trigger,
            plastic,
        })
    }

    /// All plastic weights, indexed by neuron.
    pub fn weights(&self) -> Result<Vec<f64>> {
        Ok(self.sim.weights(self.plastic)?)
    }

    /// The four weights of `step`'s block, in action order.
    pub fn action_weights(&self, step: usize) -> Result<[f64; ACTIONS_PER_STEP]> {
        block_weights(&self.weights()?, step)
    }
}

/// Slice one step's block out of a flat weight vector.
pub fn block_weights(weights: &[f64], step: usize) -> Result<[f64; ACTIONS_PER_STEP]> {
    let start = step * ACTIONS_PER_STEP;
    let block = weights.get(start..start + ACTIONS_PER_STEP).ok_or_else(|| {
        spike_sim::SimError::IndexOutOfRange {
            label: PRE.to_string(),
            index: start + ACTIONS_PER_STEP - 1,
            size: weights.len(),
        }
    })?;
    let mut out = [0.0; ACTIONS_PER_STEP];
    out.copy_from_slice(block);
    Ok(out)
}

/// Action with the largest weight. Ties go to the lowest index.
pub fn best_action(weights: &[f64; ACTIONS_PER_STEP]) -> Action {
    let mut best = 0;
    for (i, &w) in weights.iter().enumerate() {
        if w > weights[best] {
            best = i;
        }
    }
    Action::ALL[best]
}

/// First `post` neuron of `step`'s block to fire in `event`.
pub fn first_in_block(event: &LiveSpikeEvent, step: usize) -> Option<usize> {
    event.first_where(|id| id / ACTIONS_PER_STEP == step)
}
