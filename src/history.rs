//! Accuracy and loss recorded over the epochs of a training run.

use ndarray::Array1;
use crate::Error;

/// Number of epochs of the recorded run.
pub const EPOCHS: usize = 10;

pub const TRAIN_LOSS: [f64; EPOCHS] = [
    358.9673815, 148.4768019, 113.404618, 96.01466146, 83.44248024,
    75.02453544, 66.30372481, 60.79469905, 55.59118463, 54.46087288];

pub const VALIDATION_LOSS: [f64; EPOCHS] = [
    0.225829059, 0.382017976, 0.107053657, 0.332196101, 0.159677622,
    0.138603878, 0.117637143, 0.087404981, 0.140071558, 0.057751027];

/// Training accuracy, in percent.
pub const TRAIN_ACCURACY: [f64; EPOCHS] = [
    83.18333333, 93.89166667, 95.53666667, 96.37666667, 97.08,
    97.45666667, 97.78833333, 97.97666667, 98.255, 98.30166667];

/// Validation accuracy, in percent.
pub const VALIDATION_ACCURACY: [f64; EPOCHS] = [
    95.3, 96.14, 97.19, 97.19, 97.45, 97.61, 97.78, 97.67, 98.08, 97.98];

/// One labelled series, holding a value per epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub label: String,
    pub values: Array1<f64>,
}

impl Curve {
    pub fn new(label: impl Into<String>, values: impl Into<Array1<f64>>)
               -> Self {
        Self { label: label.into(), values: values.into() }
    }

    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }
}

/// A quantity measured on both the training and the validation sets.
/// Each metric is drawn in its own plot area titled `title`.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub title: String,
    pub train: Curve,
    pub validation: Curve,
}

impl Metric {
    pub fn curves(&self) -> [&Curve; 2] {
        [&self.train, &self.validation]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingHistory {
    pub accuracy: Metric,
    pub loss: Metric,
}

impl TrainingHistory {
    /// The run recorded in [`TRAIN_ACCURACY`], [`VALIDATION_ACCURACY`],
    /// [`TRAIN_LOSS`] and [`VALIDATION_LOSS`].
    pub fn recorded() -> Self {
        TrainingHistory {
            accuracy: Metric {
                title: "Accuracy".into(),
                train: Curve::new("Train Accuracy", TRAIN_ACCURACY.to_vec()),
                validation: Curve::new("Validation Accuracy",
                                       VALIDATION_ACCURACY.to_vec()),
            },
            loss: Metric {
                title: "Loss".into(),
                train: Curve::new("Train Loss", TRAIN_LOSS.to_vec()),
                validation: Curve::new("Validation Loss",
                                       VALIDATION_LOSS.to_vec()),
            },
        }
    }

    /// Number of epochs, taken from the training accuracy.
    pub fn n_epochs(&self) -> usize {
        self.accuracy.train.len()
    }

    /// The epoch numbers 0, 1,..., `n_epochs() - 1`.
    pub fn epochs(&self) -> Array1<f64> {
        Array1::range(0., self.n_epochs() as f64, 1.)
    }

    pub fn metrics(&self) -> [&Metric; 2] {
        [&self.accuracy, &self.loss]
    }

    /// Check that every curve holds exactly one value per epoch.
    pub fn validate(&self) -> Result<(), Error> {
        let expected = self.n_epochs();
        for curve in self.metrics().into_iter().flat_map(Metric::curves) {
            if curve.len() != expected {
                return Err(Error::LengthMismatch {
                    label: curve.label.clone(),
                    expected,
                    found: curve.len(),
                })
            }
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_is_consistent() -> Result<(), Error> {
        let h = TrainingHistory::recorded();
        h.validate()?;
        assert_eq!(h.n_epochs(), EPOCHS);
        Ok(())
    }

    #[test]
    fn epochs_are_0_to_9() {
        let h = TrainingHistory::recorded();
        let e: Vec<f64> = h.epochs().to_vec();
        assert_eq!(e, (0 .. 10).map(|i| i as f64).collect::<Vec<_>>());
    }

    #[test]
    fn loss_curves_are_the_loss_series() {
        let h = TrainingHistory::recorded();
        assert_eq!(h.loss.train.values.to_vec(), TRAIN_LOSS.to_vec());
        assert_eq!(h.loss.validation.values.to_vec(),
                   VALIDATION_LOSS.to_vec());
        assert_ne!(h.loss.validation.values, h.accuracy.validation.values);
    }

    #[test]
    fn short_curve_is_rejected() {
        let mut h = TrainingHistory::recorded();
        h.loss.validation = Curve::new("Validation Loss",
                                       VALIDATION_LOSS[.. 7].to_vec());
        match h.validate() {
            Err(Error::LengthMismatch { label, expected, found }) => {
                assert_eq!(label, "Validation Loss");
                assert_eq!(expected, 10);
                assert_eq!(found, 7);
            }
            r => panic!("expected a length mismatch, got {:?}", r),
        }
    }
}
