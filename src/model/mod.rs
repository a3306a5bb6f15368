//! NOx prediction from a pre-trained regression model.
//!
//! The model is an opaque artifact loaded once at startup (see
//! [`artifact`] for the file layout). [`Predictor`] validates the artifact's
//! feature schema against [`Reading`] at load time and resolves the column
//! order once, so each prediction is a straight lookup.

pub mod artifact;

pub use artifact::{ForestModel, LinearModel, ModelArtifact, ModelSpec};

use std::collections::HashSet;
use std::fmt::Debug;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::data::{Feature, Reading};
use crate::error::{NoxError, Result};

/// A regression model over a fixed-width feature row.
pub trait Regressor: Debug {
    /// Number of values `predict_row` expects.
    fn n_features(&self) -> usize;

    /// Predict from a row ordered as the model's feature schema.
    fn predict_row(&self, row: &[f64]) -> Result<f64>;
}

/// Maps a [`Reading`] to a scalar NOx prediction.
#[derive(Debug)]
pub struct Predictor {
    model: Box<dyn Regressor>,
    columns: Vec<Feature>,
    description: String,
}

impl Predictor {
    /// Load and validate a model artifact.
    ///
    /// A missing or corrupt file is [`NoxError::ModelLoad`]; a feature set
    /// that differs from [`Reading`]'s is [`NoxError::SchemaMismatch`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| NoxError::model_load(path, e))?;
        let artifact = ModelArtifact::from_json(&text).map_err(|e| NoxError::model_load(path, e))?;
        let model = artifact
            .build_regressor()
            .map_err(|e| NoxError::model_load(path, e))?;

        let description = format!("{} ({})", path.display(), artifact.model.summary());
        let predictor = Self::new(&artifact.feature_names, model, description)?;
        info!(
            path = %path.display(),
            model = %artifact.model.summary(),
            target = artifact.target.as_deref().unwrap_or("nox"),
            "model loaded"
        );
        Ok(predictor)
    }

    /// Wrap an already-built regressor, validating its declared schema.
    ///
    /// `feature_names` must name every [`Feature`] exactly once, in any order.
    pub fn new(
        feature_names: &[String],
        model: Box<dyn Regressor>,
        description: impl Into<String>,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut columns = Vec::with_capacity(feature_names.len());
        for name in feature_names {
            let feature = Feature::from_name(name).ok_or_else(|| {
                NoxError::SchemaMismatch(format!(
                    "model expects feature '{name}' which readings do not provide"
                ))
            })?;
            if !seen.insert(feature) {
                return Err(NoxError::SchemaMismatch(format!(
                    "feature '{name}' listed more than once"
                )));
            }
            columns.push(feature);
        }

        if let Some(missing) = Feature::ALL.iter().find(|f| !seen.contains(f)) {
            return Err(NoxError::SchemaMismatch(format!(
                "reading field '{missing}' is missing from the model schema"
            )));
        }

        if model.n_features() != columns.len() {
            return Err(NoxError::SchemaMismatch(format!(
                "model consumes {} values but declares {} feature names",
                model.n_features(),
                columns.len()
            )));
        }

        Ok(Self {
            model,
            columns,
            description: description.into(),
        })
    }

    /// Predict the NOx concentration for one reading. Deterministic.
    pub fn predict(&self, reading: &Reading) -> Result<f64> {
        let row: Vec<f64> = self.columns.iter().map(|&f| reading.get(f)).collect();
        self.model.predict_row(&row)
    }

    /// Column order the model consumes.
    pub fn columns(&self) -> &[Feature] {
        &self.columns
    }

    /// Artifact path and model shape, shown in the dashboard header.
    pub fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn names(features: &[Feature]) -> Vec<String> {
        features.iter().map(|f| f.name().to_string()).collect()
    }

    fn reading() -> Reading {
        Reading {
            no: 50.0,
            no2: 60.0,
            relativehumidity: 55.0,
            temperature: 30.0,
            wind_direction: 180.0,
            wind_speed: 5.0,
            hour: 14,
            day: 10,
            weekday: 2,
            month: 6,
        }
    }

    /// Picks out a single column so tests can see which value arrives where.
    #[derive(Debug)]
    struct PickColumn(usize, usize);

    impl Regressor for PickColumn {
        fn n_features(&self) -> usize {
            self.1
        }

        fn predict_row(&self, row: &[f64]) -> Result<f64> {
            Ok(row[self.0])
        }
    }

    #[test]
    fn schema_is_name_matched_not_positional() {
        let mut order = Feature::ALL.to_vec();
        order.reverse();
        // Column 0 in reversed order is `month`.
        let predictor = Predictor::new(&names(&order), Box::new(PickColumn(0, 10)), "test").unwrap();
        assert_eq!(predictor.predict(&reading()).unwrap(), 6.0);
        assert_eq!(predictor.columns()[9], Feature::No);
    }

    #[test]
    fn missing_feature_is_schema_mismatch() {
        let partial = &Feature::ALL[..9];
        let err = Predictor::new(&names(partial), Box::new(PickColumn(0, 9)), "test").unwrap_err();
        assert!(matches!(err, NoxError::SchemaMismatch(ref m) if m.contains("month")), "{err}");
    }

    #[test]
    fn unknown_or_duplicate_feature_is_schema_mismatch() {
        let mut extra = names(&Feature::ALL);
        extra.push("ozone".to_string());
        assert!(matches!(
            Predictor::new(&extra, Box::new(PickColumn(0, 11)), "test"),
            Err(NoxError::SchemaMismatch(_))
        ));

        let mut dup = names(&Feature::ALL);
        dup[1] = "no".to_string();
        assert!(matches!(
            Predictor::new(&dup, Box::new(PickColumn(0, 10)), "test"),
            Err(NoxError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Predictor::load(Path::new("/nonexistent/nox_model.json")).unwrap_err();
        assert!(matches!(err, NoxError::ModelLoad { .. }));
    }

    #[test]
    fn load_reports_corrupt_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not a model").unwrap();
        let err = Predictor::load(file.path()).unwrap_err();
        assert!(matches!(err, NoxError::ModelLoad { .. }));
    }

    #[test]
    fn load_linear_artifact_and_predict() {
        let mut file = NamedTempFile::new().unwrap();
        let names = serde_json::to_string(&names(&Feature::ALL)).unwrap();
        write!(
            file,
            r#"{{
                "feature_names": {names},
                "model": {{
                    "kind": "linear",
                    "intercept": 1.0,
                    "coefficients": [0.5, 0.25, 0, 0, 0, 0, 0, 0, 0, 0]
                }}
            }}"#
        )
        .unwrap();
        file.flush().unwrap();

        let predictor = Predictor::load(file.path()).unwrap();
        assert!(predictor.description().ends_with("(linear)"));
        // 1 + 0.5*50 + 0.25*60
        assert_eq!(predictor.predict(&reading()).unwrap(), 41.0);
        assert_eq!(predictor.predict(&reading()).unwrap(), 41.0);
    }

    #[test]
    fn bundled_demo_model_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("models/nox_model.json");
        let predictor = Predictor::load(&path).unwrap();
        let p = predictor.predict(&reading()).unwrap();
        assert!(p.is_finite());
    }
}
