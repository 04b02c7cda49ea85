use neuroarena_network::{Architecture, Network, Seed};
use rand_pcg::Pcg32;

use crate::{
    TrainingError,
    episode::{Evaluation, evaluate, run_episode},
    health::{DEFAULT_CONVERGENCE_WINDOW, convergence, overfitting_risk},
    scenario::Scenario,
    state::{EpisodeResult, TrainingState, initialize_training},
};

/// A seeded training run that advances one episode per [`Self::step`].
///
/// Owns its [`TrainingState`] exclusively; snapshots for battles or rosters
/// are taken by cloning the network out of [`Self::state`].
#[derive(Debug, Clone)]
pub struct TrainingSession {
    scenario: Scenario,
    architecture: Architecture,
    state: TrainingState,
    rng: Pcg32,
    last_evaluation: Option<Evaluation>,
}

impl TrainingSession {
    /// Initializes training for `scenario` with randomness drawn from `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the scenario or architecture is invalid.
    pub fn new(scenario: Scenario, architecture: &Architecture, seed: Seed) -> Result<Self, TrainingError> {
        let mut rng = seed.rng();
        let state = initialize_training(&scenario, architecture, &mut rng)?;
        Ok(Self {
            scenario,
            architecture: architecture.clone(),
            state,
            rng,
            last_evaluation: None,
        })
    }

    /// Like [`Self::new`], but trains `network` instead of a freshly built one.
    ///
    /// The dataset is generated from `seed` exactly as in [`Self::new`]; only
    /// the network is swapped. Use it to continue training a loaded or
    /// transferred network.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::InvalidScenario`] if the network's layer count
    /// or input/output sizes do not fit the scenario, and any error
    /// [`Self::new`] returns.
    pub fn with_network(
        scenario: Scenario,
        architecture: &Architecture,
        network: Network,
        seed: Seed,
    ) -> Result<Self, TrainingError> {
        let mut session = Self::new(scenario, architecture, seed)?;
        let fitted = session.state.architecture();
        if network.layers().len() != fitted.layers().len()
            || network.input_size() != fitted.input_size()
            || network.output_size() != fitted.output_size()
        {
            return Err(TrainingError::InvalidScenario {
                scenario: session.scenario.name.clone(),
                reason: format!(
                    "network with {} layers ({} → {}) does not fit an architecture with {} layers ({} → {})",
                    network.layers().len(),
                    network.input_size(),
                    network.output_size(),
                    fitted.layers().len(),
                    fitted.input_size(),
                    fitted.output_size(),
                ),
            });
        }
        session.state.network = network;
        Ok(session)
    }

    #[must_use]
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// The architecture fitted to the scenario, as used by the network.
    #[must_use]
    pub fn architecture(&self) -> &Architecture {
        self.state.architecture()
    }

    #[must_use]
    pub fn state(&self) -> &TrainingState {
        &self.state
    }

    /// Validation metrics measured after the most recent step.
    #[must_use]
    pub fn last_evaluation(&self) -> Option<&Evaluation> {
        self.last_evaluation.as_ref()
    }

    /// Runs one episode, records it, and refreshes the health scores.
    ///
    /// Returns a copy of the recorded episode.
    ///
    /// # Errors
    ///
    /// Returns an error if either dataset is empty.
    pub fn step(&mut self) -> Result<EpisodeResult, TrainingError> {
        let architecture = self.state.architecture.clone();
        let result = run_episode(&mut self.state, &architecture, &self.scenario)?;
        let train_accuracy = result.accuracy;
        if self.state.record(result.clone()) {
            log::info!(
                "scenario `{}` episode #{}: new best accuracy {:.3}",
                self.scenario.name,
                self.state.current_episode,
                self.state.best_accuracy,
            );
        }

        let evaluation = evaluate(&self.state, &architecture)?;
        let risk = overfitting_risk(train_accuracy, evaluation.accuracy);
        let score = convergence(&self.state.episodes, DEFAULT_CONVERGENCE_WINDOW);
        self.state.set_health(score, risk);
        self.last_evaluation = Some(evaluation);

        Ok(result)
    }

    /// Runs `episodes` steps and returns the latest episode, if any ran.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first step error.
    pub fn run(&mut self, episodes: usize) -> Result<Option<&EpisodeResult>, TrainingError> {
        for _ in 0..episodes {
            self.step()?;
        }
        Ok(self.state.latest_episode())
    }

    /// Discards all progress and starts over with a fresh network and dataset.
    ///
    /// The new state draws from the session's random stream where the old one
    /// left off, so it differs from the initial state but stays reproducible
    /// for a given seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be rebuilt.
    pub fn reset(&mut self) -> Result<(), TrainingError> {
        self.state = initialize_training(&self.scenario, &self.architecture, &mut self.rng)?;
        self.last_evaluation = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{default_architecture, scenario::ScenarioKind};

    fn session(kind: ScenarioKind, seed: u64) -> TrainingSession {
        TrainingSession::new(Scenario::preset(kind), &default_architecture(), Seed::from_u64(seed)).unwrap()
    }

    #[test]
    fn test_step_records_and_scores() {
        let mut session = session(ScenarioKind::Pattern, 1);
        assert!(session.last_evaluation().is_none());

        let first = session.step().unwrap();
        assert_eq!(first.episode_number, 1);
        let state = session.state();
        assert_eq!(state.episodes().len(), 1);
        assert_eq!(state.current_episode(), 1);
        assert_eq!(state.total_steps(), 80);
        assert_eq!(state.best_accuracy(), first.accuracy);
        // fewer episodes than the convergence window
        assert_eq!(state.convergence_score(), 0.0);
        assert!([0.1, 0.3, 0.6, 0.9].contains(&state.overfitting_risk()));

        let evaluation = *session.last_evaluation().unwrap();
        assert_eq!(
            state.overfitting_risk(),
            overfitting_risk(first.accuracy, evaluation.accuracy)
        );
    }

    #[test]
    fn test_convergence_after_full_window() {
        let mut session = session(ScenarioKind::Game, 2);
        session.run(DEFAULT_CONVERGENCE_WINDOW).unwrap();
        let state = session.state();
        assert_eq!(
            state.convergence_score(),
            convergence(state.episodes(), DEFAULT_CONVERGENCE_WINDOW)
        );
        assert!((0.0..=1.0).contains(&state.convergence_score()));
    }

    #[test]
    fn test_episode_numbers_are_sequential() {
        let mut session = session(ScenarioKind::Maze, 3);
        let last = session.run(7).unwrap().unwrap().episode_number;
        assert_eq!(last, 7);
        let numbers: Vec<_> = session.state().episodes().iter().map(|e| e.episode_number).collect();
        assert_eq!(numbers, (1..=7).collect::<Vec<_>>());
        assert_eq!(session.state().total_steps(), 7 * 80);
    }

    #[test]
    fn test_run_zero_episodes() {
        let mut session = session(ScenarioKind::Maze, 4);
        assert!(session.run(0).unwrap().is_none());
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let mut a = session(ScenarioKind::Optimization, 5);
        let mut b = session(ScenarioKind::Optimization, 5);
        a.run(5).unwrap();
        b.run(5).unwrap();
        assert_eq!(a.state().network(), b.state().network());
        for (x, y) in a.state().episodes().iter().zip(b.state().episodes()) {
            assert_eq!(x.accuracy, y.accuracy);
            assert_eq!(x.loss, y.loss);
        }
    }

    #[test]
    fn test_with_network_trains_given_network() {
        let scenario = Scenario::preset(ScenarioKind::Pattern);
        let mut trained = session(ScenarioKind::Pattern, 7);
        trained.run(3).unwrap();
        let network = trained.state().network().clone();

        let mut resumed =
            TrainingSession::with_network(scenario, &default_architecture(), network.clone(), Seed::from_u64(8))
                .unwrap();
        assert_eq!(resumed.state().network(), &network);
        assert!(resumed.state().episodes().is_empty());
        resumed.step().unwrap();
        assert_ne!(resumed.state().network(), &network);
    }

    #[test]
    fn test_with_network_rejects_mismatched_shape() {
        let maze = session(ScenarioKind::Maze, 9);
        let network = maze.state().network().clone();
        let err = TrainingSession::with_network(
            Scenario::preset(ScenarioKind::Pattern),
            &default_architecture(),
            network,
            Seed::from_u64(9),
        )
        .unwrap_err();
        assert!(matches!(err, TrainingError::InvalidScenario { .. }));
    }

    #[test]
    fn test_reset_starts_over() {
        let mut session = session(ScenarioKind::Freeform, 6);
        let initial_network = session.state().network().clone();
        session.run(3).unwrap();
        session.reset().unwrap();

        let state = session.state();
        assert!(state.episodes().is_empty());
        assert_eq!(state.current_episode(), 0);
        assert_eq!(state.total_steps(), 0);
        assert_eq!(state.best_accuracy(), 0.0);
        assert!(session.last_evaluation().is_none());
        assert_ne!(state.network(), &initial_network);
        assert_eq!(state.architecture().input_size(), session.scenario().input_size);
    }
}
