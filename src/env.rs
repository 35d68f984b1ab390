use rand::Rng;

/// Represents a Markov decision process, defining the dynamics of an environment
/// in which an agent can operate.
///
/// This base trait represents the common case of a discrete-time MDP with one agent.
pub trait Environment {
    /// A representation of the state of the environment to be passed to an agent
    type State;

    /// A representation of an action that an agent can take to affect the environment
    type Action;

    /// Determine if the state is active or terminal
    fn is_active(&self) -> bool;

    /// Update the environment in response to an action taken by an agent, producing a new state and associated reward
    ///
    /// **Returns** `(next_state, reward)`, where `next_state` is `None` once the environment is terminal
    fn step(&mut self, action: Self::Action) -> (Option<Self::State>, f32);

    /// Reset the environment to an initial state
    ///
    /// **Returns** the state
    fn reset(&mut self) -> Self::State;

    /// Sample an action uniformly from the environment's action space
    fn random_action<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Action;
}

/// An environment with a finite action space
pub trait DiscreteActionSpace: Environment {
    /// Get the available actions for the current state
    ///
    /// The order of the returned actions is fixed, and greedy policies break ties by it.
    fn actions(&self) -> Vec<Self::Action>;
}

/// An environment with a finite, enumerable state space
pub trait DiscreteStateSpace: Environment {
    /// Every state the environment can be in
    fn states(&self) -> Vec<Self::State>;
}

/// An environment whose transitions are known and deterministic, letting an
/// agent look one step ahead without committing to the move
pub trait Lookahead: Environment {
    /// The state that `action` would lead to from the current state
    fn peek(&self, action: Self::Action) -> Self::State;
}
