use std::{collections::HashMap, fmt::Write};

use rand::{seq::SliceRandom, Rng};
use strum::{EnumIter, VariantArray};

use crate::env::{DiscreteActionSpace, DiscreteStateSpace, Environment, Lookahead};

/// Grid coordinates as `(row, column)`, with `(0, 0)` in the top left corner
pub type Pos = (i32, i32);

#[derive(EnumIter, VariantArray, Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    /// Unit offset as `(d_row, d_col)`
    pub fn offset(self) -> Pos {
        match self {
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
            Action::Right => (0, 1),
        }
    }
}

/// Fixed layout of a [`GridWorld`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridConfig {
    pub rows: i32,
    pub cols: i32,
    pub win: Pos,
    pub lose: Pos,
    pub start: Pos,
    pub obstacle: Pos,
}

impl Default for GridConfig {
    /// The classic 3x4 grid:
    /// ```text
    ///   0   1   2   3
    /// 0 .   .   .   +1
    /// 1 .   #   .   -1
    /// 2 S   .   .   .
    /// ```
    fn default() -> Self {
        Self {
            rows: 3,
            cols: 4,
            win: (0, 3),
            lose: (1, 3),
            start: (2, 0),
            obstacle: (1, 1),
        }
    }
}

impl GridConfig {
    pub fn contains(&self, pos: Pos) -> bool {
        (0..self.rows).contains(&pos.0) && (0..self.cols).contains(&pos.1)
    }

    /// Whether the agent may stand on `pos`
    pub fn is_open(&self, pos: Pos) -> bool {
        self.contains(pos) && pos != self.obstacle
    }

    pub fn is_terminal(&self, pos: Pos) -> bool {
        pos == self.win || pos == self.lose
    }

    /// All cells in row-major order, obstacle included
    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |i| (0..cols).map(move |j| (i, j)))
    }
}

/// A deterministic grid world with one obstacle and two terminal cells
///
/// Reaching the win cell pays `+1`, the lose cell `-1`, every other cell `0`.
/// Moves into a wall or the obstacle leave the agent where it is.
#[derive(Clone, Debug, PartialEq)]
pub struct GridWorld {
    config: GridConfig,
    pos: Pos,
    terminal: bool,
}

impl GridWorld {
    /// Place a new environment at the configured start position
    pub fn new(config: GridConfig) -> Self {
        Self::at(config, config.start)
    }

    /// Place a new environment at `pos`, evaluating terminality up front
    pub fn at(config: GridConfig, pos: Pos) -> Self {
        Self {
            config,
            pos,
            terminal: config.is_terminal(pos),
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn position(&self) -> Pos {
        self.pos
    }

    /// `1` at the win position, `-1` at the lose position, `0` everywhere else
    pub fn reward(&self) -> f32 {
        if self.pos == self.config.win {
            1.0
        } else if self.pos == self.config.lose {
            -1.0
        } else {
            0.0
        }
    }

    pub fn terminal(&self) -> bool {
        self.terminal
    }

    /// Position reached by taking `action` from the current position, without moving
    pub fn next_position(&self, action: Action) -> Pos {
        let (dr, dc) = action.offset();
        let candidate = (self.pos.0 + dr, self.pos.1 + dc);
        if self.config.is_open(candidate) {
            candidate
        } else {
            self.pos
        }
    }
}

impl Default for GridWorld {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

impl Environment for GridWorld {
    type State = Pos;
    type Action = Action;

    fn is_active(&self) -> bool {
        !self.terminal
    }

    fn step(&mut self, action: Self::Action) -> (Option<Self::State>, f32) {
        *self = Self::at(self.config, self.next_position(action));
        let reward = self.reward();

        if self.terminal {
            log::debug!("terminal state {:?} reached, reward {}", self.pos, reward);
            (None, reward)
        } else {
            (Some(self.pos), reward)
        }
    }

    fn reset(&mut self) -> Self::State {
        *self = Self::new(self.config);
        self.pos
    }

    fn random_action<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Action {
        *Action::VARIANTS
            .choose(rng)
            .expect("action set is not empty")
    }
}

impl DiscreteActionSpace for GridWorld {
    fn actions(&self) -> Vec<Self::Action> {
        Action::VARIANTS.to_vec()
    }
}

impl DiscreteStateSpace for GridWorld {
    fn states(&self) -> Vec<Self::State> {
        self.config.positions().collect()
    }
}

impl Lookahead for GridWorld {
    fn peek(&self, action: Self::Action) -> Self::State {
        self.next_position(action)
    }
}

fn render_grid(config: &GridConfig, width: usize, cell: impl Fn(Pos) -> String) -> String {
    let rule = "-".repeat(1 + config.cols as usize * (width + 3));
    let mut out = String::new();
    for i in 0..config.rows {
        out.push_str(&rule);
        out.push('\n');
        out.push('|');
        for j in 0..config.cols {
            let _ = write!(out, " {:<width$} |", cell((i, j)));
        }
        out.push('\n');
    }
    out.push_str(&rule);
    out.push('\n');
    out
}

/// Draw the board: `*` marks the agent, `z` the obstacle, `0` any other cell
pub fn render_board(config: &GridConfig, agent: Pos) -> String {
    render_grid(config, 1, |pos| {
        if pos == agent {
            "*".into()
        } else if pos == config.obstacle {
            "z".into()
        } else {
            "0".into()
        }
    })
}

/// Draw the value table as a grid, one left-justified value per cell
pub fn render_values(config: &GridConfig, values: &HashMap<Pos, f32>) -> String {
    render_grid(config, 6, |pos| {
        values.get(&pos).copied().unwrap_or_default().to_string()
    })
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn blocked_moves_stay_put() {
        let config = GridConfig::default();
        let ring = (-1..=config.rows)
            .flat_map(|i| (-1..=config.cols).map(move |j| (i, j)))
            .filter(|&p| !config.contains(p));
        let blocked = std::iter::once(config.obstacle).chain(ring);

        for target in blocked {
            for action in Action::iter() {
                let (dr, dc) = action.offset();
                let from = (target.0 - dr, target.1 - dc);
                if !config.is_open(from) {
                    continue;
                }
                let env = GridWorld::at(config, from);
                assert_eq!(
                    env.next_position(action),
                    from,
                    "{action:?} from {from:?} into {target:?} is blocked"
                );
            }
        }
    }

    #[test]
    fn legal_moves_take_one_step() {
        let env = GridWorld::at(GridConfig::default(), (1, 2));
        assert_eq!(env.next_position(Action::Up), (0, 2));
        assert_eq!(env.next_position(Action::Down), (2, 2));
        assert_eq!(env.next_position(Action::Left), (1, 2), "obstacle at (1,1)");
        assert_eq!(env.next_position(Action::Right), (1, 3));
        assert_eq!(env.position(), (1, 2), "lookahead does not move");
    }

    #[test]
    fn rewards_and_terminals() {
        let config = GridConfig::default();
        for pos in config.positions() {
            let env = GridWorld::at(config, pos);
            let expected = match pos {
                (0, 3) => 1.0,
                (1, 3) => -1.0,
                _ => 0.0,
            };
            assert_eq!(env.reward(), expected, "reward at {pos:?}");
            assert_eq!(
                env.terminal(),
                pos == (0, 3) || pos == (1, 3),
                "terminal at {pos:?}"
            );
            assert_eq!(env.is_active(), !env.terminal());
        }
    }

    #[test]
    fn step_commits_move() {
        let mut env = GridWorld::default();
        assert_eq!(env.position(), (2, 0), "starts at start");

        assert_eq!(env.step(Action::Up), (Some((1, 0)), 0.0));
        assert_eq!(env.step(Action::Right), (Some((1, 0)), 0.0), "obstacle");
        env.step(Action::Up);
        env.step(Action::Right);
        env.step(Action::Right);
        assert_eq!(env.step(Action::Right), (None, 1.0), "reaches the win cell");
        assert!(!env.is_active());

        assert_eq!(env.reset(), (2, 0));
        assert!(env.is_active());
    }

    #[test]
    fn stepping_into_lose_cell() {
        let mut env = GridWorld::at(GridConfig::default(), (2, 3));
        assert_eq!(env.step(Action::Up), (None, -1.0));
        assert!(env.terminal());
    }

    #[test]
    fn spaces() {
        let env = GridWorld::default();
        assert_eq!(
            env.actions(),
            vec![Action::Up, Action::Down, Action::Left, Action::Right]
        );
        let states = env.states();
        assert_eq!(states.len(), 12, "every cell including obstacle");
        assert_eq!(states[0], (0, 0));
        assert_eq!(states[11], (2, 3));

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            assert!(env.actions().contains(&env.random_action(&mut rng)));
        }
    }

    #[test]
    fn board_rendering() {
        let config = GridConfig::default();
        let board = render_board(&config, config.start);
        let rule = "-".repeat(17);
        let expected = [
            rule.as_str(),
            "| 0 | 0 | 0 | 0 |",
            rule.as_str(),
            "| 0 | z | 0 | 0 |",
            rule.as_str(),
            "| * | 0 | 0 | 0 |",
            rule.as_str(),
        ]
        .join("\n")
            + "\n";
        assert_eq!(board, expected);
    }

    #[test]
    fn value_rendering() {
        let config = GridConfig::default();
        let values = HashMap::from([((0, 3), 1.0), ((1, 3), -1.0), ((0, 2), 0.2)]);
        let out = render_values(&config, &values);
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0].len(), 37);
        assert_eq!(lines[1], "| 0      | 0      | 0.2    | 1      |");
        assert_eq!(lines[3], "| 0      | 0      | 0      | -1     |");
    }
}
