//! Head-to-head comparison of two networks on fresh scenario data.

use neuroarena_network::{Architecture, Network};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    TrainingError,
    episode::mean_squared_error,
    scenario::{self, Scenario},
};

/// Rounds played when the caller has no preference.
pub const DEFAULT_BATTLE_ROUNDS: usize = 10;

/// Input noise used for battle examples, independent of the scenario's own variance.
pub const BATTLE_VARIANCE: f64 = 0.1;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display, derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum BattleWinner {
    #[display("network 1")]
    One,
    #[display("network 2")]
    Two,
    #[display("tie")]
    Tie,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult {
    pub winner: BattleWinner,
    /// Rounds won by network 1 and network 2.
    pub scores: (u32, u32),
    /// One-line summary, e.g. `network 1: 6, network 2: 3, ties: 1`.
    pub details: String,
}

/// Plays `rounds` rounds between two networks sharing `architecture`.
///
/// Each round draws one fresh example from `scenario` at [`BATTLE_VARIANCE`]
/// and awards a point to the network whose output has the strictly lower
/// mean squared error against the target. Equal (or NaN) errors award no
/// point. Both networks are only read, so a network can battle itself.
///
/// # Errors
///
/// Returns [`TrainingError::InvalidScenario`] if the scenario is invalid or
/// its input/output sizes do not match the networks.
///
/// # Panics
///
/// Panics if `architecture` does not describe both networks.
///
/// # Example
///
/// ```
/// use neuroarena_network::{Network, Seed};
/// use neuroarena_training::{BattleWinner, battle, default_architecture, scenario::{Scenario, ScenarioKind}};
///
/// let scenario = Scenario::preset(ScenarioKind::Classification);
/// let architecture = default_architecture();
/// let mut rng = Seed::from_u64(9).rng();
/// let network = Network::build(&architecture, &mut rng).unwrap();
///
/// let result = battle(&network, &network, &architecture, &scenario, 10, &mut rng).unwrap();
/// assert_eq!(result.winner, BattleWinner::Tie);
/// assert_eq!(result.scores, (0, 0));
/// ```
pub fn battle<R>(
    net1: &Network,
    net2: &Network,
    architecture: &Architecture,
    scenario: &Scenario,
    rounds: usize,
    rng: &mut R,
) -> Result<BattleResult, TrainingError>
where
    R: Rng + ?Sized,
{
    for (side, network) in [(1, net1), (2, net2)] {
        if network.input_size() != scenario.input_size || network.output_size() != scenario.output_size {
            return Err(TrainingError::InvalidScenario {
                scenario: scenario.name.clone(),
                reason: format!(
                    "expects {} → {} but network {side} is {} → {}",
                    scenario.input_size,
                    scenario.output_size,
                    network.input_size(),
                    network.output_size(),
                ),
            });
        }
    }

    let examples = scenario::generate(scenario, rounds, BATTLE_VARIANCE, rng)?;

    let (mut score1, mut score2, mut ties) = (0_u32, 0_u32, 0_u32);
    for (round, example) in examples.iter().enumerate() {
        let error1 = mean_squared_error(&net1.predict(&example.input, architecture), &example.target);
        let error2 = mean_squared_error(&net2.predict(&example.input, architecture), &example.target);
        if error1 < error2 {
            score1 += 1;
        } else if error2 < error1 {
            score2 += 1;
        } else {
            ties += 1;
        }
        log::debug!("battle round {}: mse {error1:.5} vs {error2:.5}", round + 1);
    }

    let winner = match score1.cmp(&score2) {
        std::cmp::Ordering::Greater => BattleWinner::One,
        std::cmp::Ordering::Less => BattleWinner::Two,
        std::cmp::Ordering::Equal => BattleWinner::Tie,
    };
    Ok(BattleResult {
        winner,
        scores: (score1, score2),
        details: format!("network 1: {score1}, network 2: {score2}, ties: {ties}"),
    })
}
