//! Calibrated multi-class linear classification.

pub mod calibration;
pub mod folds;
pub mod logistic;
pub mod metrics;

pub use calibration::fit_temperature;
pub use folds::{effective_folds, stratified_folds};
pub use logistic::{FitParams, LinearClassifier};
pub use metrics::{argmax, log_loss, macro_f1, softmax};
