use serde::{Deserialize, Serialize};

/// Slope applied to negative inputs by [`ActivationKind::LeakyReLU`].
pub const LEAKY_RELU_SLOPE: f64 = 0.01;

/// Element-wise activation function of a layer.
///
/// Both [`Self::apply`] and [`Self::derivative`] take the *pre-activation* sum
/// of a neuron, never its cached output.
///
/// Parses case-insensitively from the variant name (`relu`, `leakyrelu`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::FromStr)]
pub enum ActivationKind {
    #[serde(rename = "relu")]
    ReLU,
    #[serde(rename = "sigmoid")]
    Sigmoid,
    #[serde(rename = "tanh")]
    Tanh,
    #[serde(rename = "linear")]
    Linear,
    #[serde(rename = "leaky_relu")]
    LeakyReLU,
}

impl ActivationKind {
    /// All activation kinds, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::ReLU,
        Self::Sigmoid,
        Self::Tanh,
        Self::Linear,
        Self::LeakyReLU,
    ];

    /// Evaluates the activation function at `x`.
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::ReLU => x.max(0.0),
            Self::Sigmoid => sigmoid(x),
            Self::Tanh => x.tanh(),
            Self::Linear => x,
            Self::LeakyReLU => {
                if x > 0.0 {
                    x
                } else {
                    LEAKY_RELU_SLOPE * x
                }
            }
        }
    }

    /// Evaluates the derivative of the activation function at the pre-activation sum `x`.
    #[must_use]
    pub fn derivative(self, x: f64) -> f64 {
        match self {
            Self::ReLU => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Sigmoid => {
                let s = sigmoid(x);
                s * (1.0 - s)
            }
            Self::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            Self::Linear => 1.0,
            Self::LeakyReLU => {
                if x > 0.0 {
                    1.0
                } else {
                    LEAKY_RELU_SLOPE
                }
            }
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_parse() {
        assert_eq!("relu".parse::<ActivationKind>().unwrap(), ActivationKind::ReLU);
        assert_eq!("Sigmoid".parse::<ActivationKind>().unwrap(), ActivationKind::Sigmoid);
        assert_eq!("leakyrelu".parse::<ActivationKind>().unwrap(), ActivationKind::LeakyReLU);
        assert!("softmax".parse::<ActivationKind>().is_err());
    }

    #[test]
    fn test_relu_values_and_derivative() {
        assert_eq!(ActivationKind::ReLU.apply(-2.0), 0.0);
        assert_eq!(ActivationKind::ReLU.apply(3.0), 3.0);
        assert_eq!(ActivationKind::ReLU.derivative(-2.0), 0.0);
        assert_eq!(ActivationKind::ReLU.derivative(0.0), 0.0);
        assert_eq!(ActivationKind::ReLU.derivative(3.0), 1.0);
    }

    #[test]
    fn test_leaky_relu_values_and_derivative() {
        let act = ActivationKind::LeakyReLU;
        assert!((act.apply(-2.0) - -0.02).abs() < EPS);
        assert_eq!(act.apply(3.0), 3.0);
        assert_eq!(act.derivative(-2.0), LEAKY_RELU_SLOPE);
        assert_eq!(act.derivative(0.0), LEAKY_RELU_SLOPE);
        assert_eq!(act.derivative(3.0), 1.0);
    }

    #[test]
    fn test_sigmoid_values_and_derivative() {
        let act = ActivationKind::Sigmoid;
        assert!((act.apply(0.0) - 0.5).abs() < EPS);
        assert!(act.apply(10.0) > 0.9999);
        assert!(act.apply(-10.0) < 0.0001);
        assert!((act.derivative(0.0) - 0.25).abs() < EPS);
    }

    #[test]
    fn test_tanh_derivative_uses_pre_activation() {
        let x: f64 = 0.3;
        let expected = 1.0 - x.tanh() * x.tanh();
        assert!((ActivationKind::Tanh.derivative(x) - expected).abs() < EPS);
    }

    #[test]
    fn test_linear_is_identity() {
        assert_eq!(ActivationKind::Linear.apply(-4.5), -4.5);
        assert_eq!(ActivationKind::Linear.derivative(-4.5), 1.0);
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let h = 1e-6;
        for act in ActivationKind::ALL {
            for x in [-1.7, -0.4, 0.25, 1.3] {
                let numeric = (act.apply(x + h) - act.apply(x - h)) / (2.0 * h);
                assert!(
                    (numeric - act.derivative(x)).abs() < 1e-6,
                    "{act:?} at {x}: numeric={numeric}, analytic={}",
                    act.derivative(x)
                );
            }
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ActivationKind::LeakyReLU).unwrap();
        assert_eq!(json, "\"leaky_relu\"");
        let act: ActivationKind = serde_json::from_str("\"relu\"").unwrap();
        assert_eq!(act, ActivationKind::ReLU);
    }
}
