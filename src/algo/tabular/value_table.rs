use std::{collections::HashMap, fmt::Debug};

use rand::{rngs::StdRng, SeedableRng};

use crate::{
    assert_interval,
    decay::{self, Decay},
    env::{DiscreteActionSpace, DiscreteStateSpace, Environment, Lookahead},
    error::{Error, Result},
    exploration::{Choice, EpsilonGreedy},
    util::round_to,
};

use super::Hashable;

/// What greedy selection does when every successor is valued below zero
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Take the action with the highest value, negative or not
    #[default]
    BestValue,
    /// Fail with [`Error::NoImprovingAction`]
    Strict,
}

/// Configuration for the [`ValueTableAgent`]
pub struct ValueTableAgentConfig<D: Decay> {
    pub exploration: EpsilonGreedy<D>,
    pub alpha: f32,
    pub fallback: Fallback,
    /// Seed for the agent's RNG, or `None` to seed from entropy
    pub seed: Option<u64>,
}

impl Default for ValueTableAgentConfig<decay::Constant> {
    fn default() -> Self {
        Self {
            exploration: EpsilonGreedy::new(decay::Constant::new(0.3)),
            alpha: 0.2,
            fallback: Fallback::default(),
            seed: None,
        }
    }
}

/// Outcome of one completed episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary<S> {
    /// Zero-based index of the episode over the agent's lifetime
    pub episode: u32,
    pub steps: u32,
    /// Reward collected on entering the terminal state
    pub reward: f32,
    pub terminal: S,
}

/// A tabular agent that learns state values from whole trajectories
///
/// Actions are chosen epsilon-greedily by looking one step ahead with [`Lookahead::peek`]
/// and comparing the values of the successor states. Nothing is learned while an
/// episode runs. Once a terminal state is reached its value is pinned to the reward,
/// and the reward is swept backwards through the visited states:
///
/// V(s) ← V(s) + α(target - V(s)), target ← V(s)
///
/// with every stored value rounded to three decimal places.
///
/// ### Generics
/// - `E` - The [`Environment`] in which the agent will learn
///     - Its state space must be enumerable so every state starts with a value of `0`
///     - Its transitions must be deterministic so greedy selection can peek ahead
/// - `D` - The [`Decay`] schedule of the exploration rate
pub struct ValueTableAgent<E, D>
where
    E: Environment + DiscreteActionSpace + DiscreteStateSpace + Lookahead,
    E::State: Hashable + Debug,
    E::Action: Hashable + Debug,
    D: Decay,
{
    state_value: HashMap<E::State, f32>,
    trace: Vec<E::State>,
    exploration: EpsilonGreedy<D>,
    alpha: f32, // learning rate
    fallback: Fallback,
    rng: StdRng,
    episode: u32, // current episode
}

impl<E, D> ValueTableAgent<E, D>
where
    E: Environment + DiscreteActionSpace + DiscreteStateSpace + Lookahead,
    E::State: Hashable + Debug,
    E::Action: Hashable + Debug,
    D: Decay,
{
    /// Initialize a new `ValueTableAgent` with every state of `env` valued at `0`
    ///
    /// **Panics** if `alpha` is not in the interval `[0,1]`
    pub fn new(env: &E, config: ValueTableAgentConfig<D>) -> Self {
        let alpha = config.alpha;
        assert_interval!(alpha, 0.0, 1.0);
        Self {
            state_value: env.states().into_iter().map(|s| (s, 0.0)).collect(),
            trace: Vec::new(),
            exploration: config.exploration,
            alpha,
            fallback: config.fallback,
            rng: config
                .seed
                .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64),
            episode: 0,
        }
    }

    /// Get the agent's state value function
    pub fn state_value(&self) -> &HashMap<E::State, f32> {
        &self.state_value
    }

    /// Current value estimate of `state`
    pub fn value(&self, state: &E::State) -> f32 {
        self.state_value.get(state).copied().unwrap_or_default()
    }

    /// States visited during the latest episode
    pub fn trace(&self) -> &[E::State] {
        &self.trace
    }

    /// Number of episodes run so far
    pub fn episode(&self) -> u32 {
        self.episode
    }

    /// Choose an action in the current state of `env` based on the exploration policy
    pub fn choose_action(&mut self, env: &E) -> Result<E::Action> {
        match self.exploration.choose(self.episode, &mut self.rng) {
            Choice::Explore => Ok(env.random_action(&mut self.rng)),
            Choice::Exploit => self.greedy_action(env),
        }
    }

    /// The action whose successor state has the highest value
    ///
    /// Ties go to the action listed first by [`DiscreteActionSpace::actions`].
    pub fn greedy_action(&self, env: &E) -> Result<E::Action> {
        let (action, best) = env
            .actions()
            .into_iter()
            .map(|a| (a, self.value(&env.peek(a))))
            .fold(None, |best: Option<(E::Action, f32)>, (a, v)| match best {
                Some((_, max)) if max >= v => best,
                _ => Some((a, v)),
            })
            .expect("There is always at least one action available");

        if best >= 0.0 {
            return Ok(action);
        }

        match self.fallback {
            Fallback::BestValue => {
                log::trace!("no improving action, falling back to {action:?} ({best})");
                Ok(action)
            }
            Fallback::Strict => Err(Error::NoImprovingAction { best }),
        }
    }

    /// Propagate `reward` from `terminal` backwards through `trace`
    pub fn backup(&mut self, terminal: E::State, reward: f32, trace: &[E::State]) {
        backup(&mut self.state_value, self.alpha, terminal, reward, trace);
    }

    /// Run one episode in the given environment, updating the value table once it terminates
    ///
    /// An episode still active after `max_steps` actions is abandoned without learning
    /// and reported as [`Error::StepLimitExceeded`].
    pub fn go(&mut self, env: &mut E, max_steps: u32) -> Result<EpisodeSummary<E::State>> {
        let result = self.run_episode(env, max_steps);
        self.episode += 1;
        result
    }

    fn run_episode(&mut self, env: &mut E, max_steps: u32) -> Result<EpisodeSummary<E::State>> {
        let mut state = env.reset();
        self.trace.clear();
        log::debug!("episode {} starting at {state:?}", self.episode);

        let mut reward = 0.0;
        let mut steps = 0;
        while env.is_active() {
            if steps >= max_steps {
                return Err(Error::StepLimitExceeded { limit: max_steps });
            }

            let action = self.choose_action(env)?;
            let next = env.peek(action);
            self.trace.push(next);
            reward = env.step(action).1;
            steps += 1;

            log::trace!("{state:?} --{action:?}--> {next:?}");
            state = next;
        }

        log::debug!(
            "episode {} ended at {state:?} after {steps} steps, reward {reward}",
            self.episode
        );
        backup(&mut self.state_value, self.alpha, state, reward, &self.trace);

        Ok(EpisodeSummary {
            episode: self.episode,
            steps,
            reward,
            terminal: state,
        })
    }

    /// Run `rounds` episodes back to back, keeping what was learned between them
    pub fn play(
        &mut self,
        env: &mut E,
        rounds: u32,
        max_steps: u32,
    ) -> Result<Vec<EpisodeSummary<E::State>>> {
        (0..rounds).map(|_| self.go(env, max_steps)).collect()
    }
}

fn backup<S: Hashable>(
    values: &mut HashMap<S, f32>,
    alpha: f32,
    terminal: S,
    reward: f32,
    trace: &[S],
) {
    values.insert(terminal, reward);

    let mut target = reward;
    for state in trace.iter().rev() {
        let value = values.entry(*state).or_default();
        *value = round_to(*value + alpha * (target - *value), 3);
        target = *value;
    }
}
