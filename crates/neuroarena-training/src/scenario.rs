//! Scenario definitions and the synthetic data generator.
//!
//! A scenario declares the shape of the problem (input and output sizes), how
//! noisy its inputs are, and which pseudo-labeling rule turns an input into a
//! target. No environment is simulated: every target is a deterministic
//! function of its input, except for [`ScenarioKind::Freeform`].
//!
//! # Inputs
//!
//! Every input component is drawn as
//!
//! ```text
//! x = clamp(U(0, 1) + U(-variance / 2, variance / 2), 0, 1)
//! ```
//!
//! # Labeling Rules
//!
//! | kind             | target                                                         |
//! |------------------|----------------------------------------------------------------|
//! | `maze`           | one-hot at `argmax(input[0..4])`                               |
//! | `pattern`        | one-hot at `floor(mean(input) × outputs)`, clamped to range    |
//! | `game`           | one-hot at `argmax(input[i] × (i + 1))`                        |
//! | `classification` | one-hot at `count(input[i] > 0.5)`                             |
//! | `optimization`   | `target[i] = 1 - input[i mod inputs]`                          |
//! | `freeform`       | `target[i] ~ U(0, 1)`                                          |
//!
//! One-hot indices that fall outside the output layer wrap modulo the output
//! size. `argmax` returns the first maximal index.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::TrainingError;

/// Pseudo-labeling rule of a scenario.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    #[display("maze")]
    Maze,
    #[display("pattern")]
    Pattern,
    #[display("game")]
    Game,
    #[display("classification")]
    Classification,
    #[display("optimization")]
    Optimization,
    /// Targets are uniform noise, unrelated to the input.
    #[display("freeform")]
    Freeform,
}

impl ScenarioKind {
    pub const ALL: [Self; 6] = [
        Self::Maze,
        Self::Pattern,
        Self::Game,
        Self::Classification,
        Self::Optimization,
        Self::Freeform,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub kind: ScenarioKind,
    pub input_size: usize,
    pub output_size: usize,
    /// Width of the uniform noise added to every input component.
    pub variance: f64,
}

/// One labeled sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub input: Vec<f64>,
    pub target: Vec<f64>,
}

impl Scenario {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: ScenarioKind,
        input_size: usize,
        output_size: usize,
        variance: f64,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            input_size,
            output_size,
            variance,
        }
    }

    /// A ready-made scenario for each kind.
    ///
    /// The classification preset is the 2-input, 1-output, variance 0.2 setup.
    #[must_use]
    pub fn preset(kind: ScenarioKind) -> Self {
        let (name, input_size, output_size, variance) = match kind {
            ScenarioKind::Maze => ("maze-runner", 8, 4, 0.1),
            ScenarioKind::Pattern => ("pattern-matcher", 6, 3, 0.15),
            ScenarioKind::Game => ("game-agent", 6, 4, 0.1),
            ScenarioKind::Classification => ("binary-classifier", 2, 1, 0.2),
            ScenarioKind::Optimization => ("optimizer", 4, 4, 0.05),
            ScenarioKind::Freeform => ("freeform", 3, 2, 0.2),
        };
        Self::new(name, kind, input_size, output_size, variance)
    }

    pub fn validate(&self) -> Result<(), TrainingError> {
        let invalid = |reason: &str| TrainingError::InvalidScenario {
            scenario: self.name.clone(),
            reason: reason.to_owned(),
        };
        if self.input_size == 0 {
            return Err(invalid("input size must be at least 1"));
        }
        if self.output_size == 0 {
            return Err(invalid("output size must be at least 1"));
        }
        if !(self.variance.is_finite() && self.variance >= 0.0) {
            return Err(invalid("variance must be finite and non-negative"));
        }
        Ok(())
    }

    /// Computes the target for `input` under this scenario's labeling rule.
    ///
    /// Only [`ScenarioKind::Freeform`] draws from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::InvalidScenario`] if the scenario fails
    /// [`Self::validate`] or `input` does not have `input_size` values.
    pub fn label<R>(&self, input: &[f64], rng: &mut R) -> Result<Vec<f64>, TrainingError>
    where
        R: Rng + ?Sized,
    {
        self.validate()?;
        if input.len() != self.input_size {
            return Err(TrainingError::InvalidScenario {
                scenario: self.name.clone(),
                reason: format!(
                    "input has {} values, expected {}",
                    input.len(),
                    self.input_size
                ),
            });
        }
        Ok(self.label_unchecked(input, rng))
    }

    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn label_unchecked<R>(&self, input: &[f64], rng: &mut R) -> Vec<f64>
    where
        R: Rng + ?Sized,
    {
        let outputs = self.output_size;
        match self.kind {
            ScenarioKind::Maze => {
                let window = &input[..input.len().min(4)];
                one_hot(argmax(window) % outputs, outputs)
            }
            ScenarioKind::Pattern => {
                let mean = input.iter().sum::<f64>() / input.len() as f64;
                let index = (mean * outputs as f64).floor().max(0.0) as usize;
                one_hot(index.min(outputs - 1), outputs)
            }
            ScenarioKind::Game => {
                let weighted: Vec<f64> = input
                    .iter()
                    .enumerate()
                    .map(|(i, x)| x * (i + 1) as f64)
                    .collect();
                one_hot(argmax(&weighted) % outputs, outputs)
            }
            ScenarioKind::Classification => {
                let above = input.iter().filter(|&&x| x > 0.5).count();
                one_hot(above % outputs, outputs)
            }
            ScenarioKind::Optimization => (0..outputs)
                .map(|i| 1.0 - input[i % input.len()])
                .collect(),
            ScenarioKind::Freeform => (0..outputs).map(|_| rng.random_range(0.0..1.0)).collect(),
        }
    }
}

/// Generates `count` labeled examples for `scenario` with the given input noise.
///
/// `variance` overrides the scenario's own value, which lets callers such as
/// [`battle`](crate::battle::battle) draw from a fixed noise level.
///
/// # Errors
///
/// Returns [`TrainingError::InvalidScenario`] if the scenario has a zero input
/// or output size, or if `variance` is negative or not finite.
///
/// # Example
///
/// ```
/// use neuroarena_network::Seed;
/// use neuroarena_training::scenario::{Scenario, ScenarioKind, generate};
///
/// let scenario = Scenario::preset(ScenarioKind::Maze);
/// let examples = generate(&scenario, 10, 0.1, &mut Seed::from_u64(3).rng()).unwrap();
/// assert_eq!(examples.len(), 10);
/// for e in &examples {
///     assert_eq!(e.input.len(), scenario.input_size);
///     assert_eq!(e.target.iter().sum::<f64>(), 1.0);
/// }
/// ```
pub fn generate<R>(
    scenario: &Scenario,
    count: usize,
    variance: f64,
    rng: &mut R,
) -> Result<Vec<TrainingExample>, TrainingError>
where
    R: Rng + ?Sized,
{
    Scenario {
        variance,
        ..scenario.clone()
    }
    .validate()?;

    let half = variance / 2.0;
    let examples = (0..count)
        .map(|_| {
            let input: Vec<f64> = (0..scenario.input_size)
                .map(|_| {
                    let base = rng.random_range(0.0..1.0);
                    let noise = rng.random_range(-half..=half);
                    f64::clamp(base + noise, 0.0, 1.0)
                })
                .collect();
            let target = scenario.label_unchecked(&input, rng);
            TrainingExample { input, target }
        })
        .collect();
    Ok(examples)
}

/// Index of the first maximal value, or 0 for an empty slice.
#[must_use]
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

fn one_hot(index: usize, len: usize) -> Vec<f64> {
    let mut v = vec![0.0; len];
    v[index] = 1.0;
    v
}
