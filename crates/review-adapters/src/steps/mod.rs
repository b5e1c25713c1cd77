//! Steps integrados.

pub mod barchart;
pub mod classifier;
pub mod embed;
pub mod metric;
pub mod preprocess;
pub mod ratings;

pub use barchart::{BarChartConfig, BarChartVisualizer};
pub use classifier::{CentroidClassifier, CentroidClassifierConfig};
pub use embed::{TokenCountEmbedder, TokenCountEmbedderConfig};
pub use metric::{BinaryEvaluationMetric, BinaryEvaluationMetricConfig};
pub use preprocess::{TextPreprocessor, TextPreprocessorConfig};
pub use ratings::{RatingAnalyser, RatingAnalyserConfig};
