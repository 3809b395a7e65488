use crate::clustering::params::KMedoidsParams;
use crate::core::float::MetricFloat;
use crate::core::{ClusteringError, ClusteringResult};
use crate::distances::{
    ChebyshevDistance, DistanceMetric, EuclideanDistance, FeatureVector, ManhattanDistance,
};
use log::{error, LevelFilter};
use serde::Deserialize;
use std::{fmt, sync::Arc};

#[derive(Debug, Deserialize)]
pub struct ClusteringParamsConfig {
    pub distance_metric: String, // E.g., "Euclidean"
    pub k: usize,                // 0 selects k automatically
    pub max_iterations: usize,
    #[serde(default)]
    pub epsilon: f64,
    #[serde(default = "default_fraction_epsilon")]
    pub fraction_epsilon: f64,
    pub sample_size: usize,
    #[serde(default)]
    pub num_threads: Option<usize>, // Defaults to the available parallelism
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_fraction_epsilon() -> f64 {
    KMedoidsParams::default().fraction_epsilon
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: String, // Log level, e.g., "info", "debug", "warn", "error"
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub clustering_params: ClusteringParamsConfig,
    pub data_file: Option<String>, // Path to the dataset file
    pub logging: LoggingConfig,    // Logging settings
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = &self.clustering_params;
        writeln!(f, "Configuration:")?;
        writeln!(f, "  Clustering Parameters:")?;
        if params.k == 0 {
            writeln!(f, "    K: auto (MDL)")?;
        } else {
            writeln!(f, "    K: {}", params.k)?;
        }
        writeln!(f, "    Max Iterations: {}", params.max_iterations)?;
        writeln!(f, "    Epsilon: {}", params.epsilon)?;
        writeln!(f, "    Fraction Epsilon: {}", params.fraction_epsilon)?;
        writeln!(f, "    Sample Size: {}", params.sample_size)?;
        match params.num_threads {
            Some(n) => writeln!(f, "    Threads: {}", n)?,
            None => writeln!(f, "    Threads: auto")?,
        }
        match params.seed {
            Some(seed) => writeln!(f, "    Seed: {}", seed)?,
            None => writeln!(f, "    Seed: default")?,
        }
        writeln!(f, "    Distance Metric: {}", params.distance_metric)?;
        if let Some(data_file) = &self.data_file {
            writeln!(f, "  Data File: {}", data_file)?;
        } else {
            writeln!(f, "  Data File: None")?;
        }
        writeln!(f, "  Logging:")?;
        writeln!(f, "    Level: {}", self.logging.level)?;
        Ok(())
    }
}

impl Config {
    /// Reads the YAML configuration file and returns a validated `Config`.
    pub fn from_file(file_path: &str) -> ClusteringResult<Self> {
        let file_content = std::fs::read_to_string(file_path)
            .map_err(|e| ClusteringError::Config(format!("{}: {}", file_path, e)))?;
        Self::from_yaml(&file_content)
    }

    pub fn from_yaml(content: &str) -> ClusteringResult<Self> {
        let config: Config =
            serde_yaml::from_str(content).map_err(|e| ClusteringError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ClusteringResult<()> {
        match self.clustering_params.distance_metric.as_str() {
            "Euclidean" | "Manhattan" | "Chebyshev" => (),
            other => {
                return Err(ClusteringError::Config(format!(
                    "Unsupported distance metric: {}",
                    other
                )))
            }
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => (),
            other => {
                return Err(ClusteringError::Config(format!(
                    "Unsupported log level: {}",
                    other
                )))
            }
        }

        self.to_params().validate()
    }

    /// Converts the clustering section into trainer parameters.
    pub fn to_params(&self) -> KMedoidsParams {
        let c = &self.clustering_params;
        let defaults = KMedoidsParams::default();
        defaults
            .clone()
            .with_k(c.k)
            .with_max_iterations(c.max_iterations)
            .with_epsilon(c.epsilon)
            .with_fraction_epsilon(c.fraction_epsilon)
            .with_sample_size(c.sample_size)
            .with_num_threads(c.num_threads.unwrap_or(defaults.num_threads))
            .with_seed(c.seed.unwrap_or(defaults.seed))
    }

    /// The configured reference metric for feature-vector data.
    pub fn distance_metric<F: MetricFloat>(&self) -> Arc<dyn DistanceMetric<FeatureVector<F>>> {
        match self.clustering_params.distance_metric.as_str() {
            "Manhattan" => Arc::new(ManhattanDistance),
            "Chebyshev" => Arc::new(ChebyshevDistance),
            // validate() only lets the three known names through
            _ => Arc::new(EuclideanDistance),
        }
    }

    /// Reads the configured data file: one point per line, coordinates split
    /// by whitespace or commas. Blank lines and `#` comments are skipped.
    pub fn load_data(&self) -> ClusteringResult<Vec<FeatureVector<f64>>> {
        let path = self
            .data_file
            .as_deref()
            .ok_or_else(|| ClusteringError::Config("No data_file configured".to_string()))?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClusteringError::Config(format!("{}: {}", path, e)))?;
        parse_points(&content)
    }

    /// Sets up logging based on the logging level in the configuration.
    pub fn setup_logging(&self) {
        let level_filter = match self.logging.level.to_lowercase().as_str() {
            "trace" => LevelFilter::Trace,
            "debug" => LevelFilter::Debug,
            "warn" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            _ => LevelFilter::Info,
        };

        if let Err(e) = env_logger::Builder::new()
            .filter_level(level_filter)
            .try_init()
        {
            error!("Failed to initialize logger: {}", e);
        }
    }
}

/// Parses numeric rows into feature vectors. Every row must have the same
/// number of coordinates.
pub fn parse_points(content: &str) -> ClusteringResult<Vec<FeatureVector<f64>>> {
    let mut points = Vec::new();
    let mut dim = None;
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let values = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(|token| {
                token.parse::<f64>().map_err(|e| {
                    ClusteringError::Config(format!("line {}: `{}`: {}", line_no + 1, token, e))
                })
            })
            .collect::<ClusteringResult<Vec<f64>>>()?;

        match dim {
            None => dim = Some(values.len()),
            Some(d) if d != values.len() => {
                return Err(ClusteringError::Config(format!(
                    "line {}: expected {} values, found {}",
                    line_no + 1,
                    d,
                    values.len()
                )))
            }
            _ => (),
        }
        points.push(FeatureVector::from(values));
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::{parse_points, Config};
    use crate::core::ClusteringError;
    use crate::distances::FeatureVector;

    const YAML: &str = r#"
clustering_params:
  distance_metric: Manhattan
  k: 0
  max_iterations: 10
  sample_size: 500
  num_threads: 2
  seed: 9
data_file: data/points.txt
logging:
  level: debug
"#;

    #[test]
    fn test_parse_and_convert() {
        let config = Config::from_yaml(YAML).unwrap();
        let params = config.to_params();
        assert!(params.auto_k());
        assert_eq!(params.max_iterations, 10);
        assert_eq!(params.sample_size, 500);
        assert_eq!(params.num_threads, 2);
        assert_eq!(params.seed, 9);
        assert_eq!(params.epsilon, 0.0);
        assert_eq!(params.fraction_epsilon, 0.0001);
        assert_eq!(config.data_file.as_deref(), Some("data/points.txt"));

        let metric = config.distance_metric::<f64>();
        let a = FeatureVector::from(vec![0.0, 0.0]);
        let b = FeatureVector::from(vec![3.0, 4.0]);
        assert_eq!(metric.compute(&a, &b), 7.0);
        assert!(config.to_string().contains("K: auto (MDL)"));
    }

    #[test]
    fn test_rejects_unknown_metric() {
        let yaml = YAML.replace("Manhattan", "Cosine");
        assert!(matches!(
            Config::from_yaml(&yaml),
            Err(ClusteringError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_params() {
        let yaml = YAML.replace("max_iterations: 10", "max_iterations: 0");
        assert!(matches!(
            Config::from_yaml(&yaml),
            Err(ClusteringError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_parse_points() {
        let points = parse_points("# x y\n1.0 2.0\n\n3,4\n 5.5,\t-6\n").unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[1], FeatureVector::from(vec![3.0, 4.0]));
        assert_eq!(points[2], FeatureVector::from(vec![5.5, -6.0]));

        assert!(parse_points("1 2\n3\n").is_err());
        assert!(parse_points("1 abc\n").is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Config::from_file("does/not/exist.yaml"),
            Err(ClusteringError::Config(_))
        ));
    }
}
