use rand::Rng;

use crate::{assert_interval, decay::Decay};

/// Exploration policy result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Explore,
    Exploit,
}

/// Epsilon greedy exploration policy with time-decaying epsilon threshold
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<D: Decay> {
    epsilon: D,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay strategy
    ///
    /// **Panics** if the initial epsilon is not in the interval `[0,1]`
    pub fn new(decay: D) -> Self {
        let epsilon = decay.evaluate(0.0);
        assert_interval!(epsilon, 0.0, 1.0);
        Self { epsilon: decay }
    }

    /// Epsilon threshold for the given episode
    pub fn epsilon(&self, episode: u32) -> f32 {
        self.epsilon.evaluate(episode as f32)
    }

    /// Invoke epsilon greedy policy for current episode
    ///
    /// Explores when a uniform draw from `[0,1)` falls at or below epsilon
    pub fn choose<R: Rng + ?Sized>(&self, episode: u32, rng: &mut R) -> Choice {
        if rng.gen::<f32>() > self.epsilon(episode) {
            Choice::Exploit
        } else {
            Choice::Explore
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::decay::Constant;

    #[test]
    fn epsilon_extremes() {
        let mut rng = StdRng::seed_from_u64(7);
        let greedy = EpsilonGreedy::new(Constant::new(0.0));
        let random = EpsilonGreedy::new(Constant::new(1.0));
        for episode in 0..100 {
            assert_eq!(greedy.choose(episode, &mut rng), Choice::Exploit);
            assert_eq!(random.choose(episode, &mut rng), Choice::Explore);
        }
    }

    #[test]
    fn explore_rate_tracks_epsilon() {
        let mut rng = StdRng::seed_from_u64(42);
        let policy = EpsilonGreedy::new(Constant::new(0.3));
        let explored = (0..10_000)
            .filter(|_| policy.choose(0, &mut rng) == Choice::Explore)
            .count();
        assert!(
            (2_700..3_300).contains(&explored),
            "explored {explored} of 10000"
        );
    }

    #[test]
    #[should_panic(expected = "Invalid value for `epsilon`")]
    fn rejects_epsilon_above_one() {
        EpsilonGreedy::new(Constant::new(1.5));
    }
}
