//! On-disk model artifact and the regressors it decodes into.
//!
//! The artifact is a JSON document:
//!
//! ```json
//! {
//!   "target": "nox",
//!   "feature_names": ["no", "no2", "..."],
//!   "model": { "kind": "forest", "trees": [ { "children_left": [1, -1, -1], "...": [] } ] }
//! }
//! ```
//!
//! Forest trees use the flat node layout exported by common tree learners:
//! parallel arrays indexed by node id, with `-1` children marking a leaf.
//! A sample goes left when `x[feature] <= threshold`.

use serde::Deserialize;

use super::Regressor;
use crate::error::{NoxError, Result};

/// Deserialized artifact file.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelArtifact {
    /// Name of the predicted quantity; informational only.
    #[serde(default)]
    pub target: Option<String>,
    /// Column names in the order the model consumes them.
    pub feature_names: Vec<String>,
    pub model: ModelSpec,
}

/// The model body, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelSpec {
    Linear {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    Forest {
        trees: Vec<TreeSpec>,
    },
}

/// One regression tree in flat-array form.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeSpec {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl ModelSpec {
    /// Short human-readable shape of the model, e.g. `forest, 3 trees`.
    pub fn summary(&self) -> String {
        match self {
            ModelSpec::Linear { .. } => "linear".to_string(),
            ModelSpec::Forest { trees } => match trees.len() {
                1 => "forest, 1 tree".to_string(),
                n => format!("forest, {n} trees"),
            },
        }
    }
}

impl ModelArtifact {
    /// Parse an artifact from JSON text.
    pub fn from_json(text: &str) -> std::result::Result<Self, String> {
        serde_json::from_str(text).map_err(|e| format!("invalid artifact: {e}"))
    }

    /// Validate the model body and build a regressor for it.
    pub fn build_regressor(&self) -> std::result::Result<Box<dyn Regressor>, String> {
        let n_features = self.feature_names.len();
        match &self.model {
            ModelSpec::Linear {
                intercept,
                coefficients,
            } => {
                if coefficients.len() != n_features {
                    return Err(format!(
                        "linear model has {} coefficients for {} features",
                        coefficients.len(),
                        n_features
                    ));
                }
                Ok(Box::new(LinearModel {
                    intercept: *intercept,
                    coefficients: coefficients.clone(),
                }))
            }
            ModelSpec::Forest { trees } => {
                if trees.is_empty() {
                    return Err("forest has no trees".to_string());
                }
                let trees = trees
                    .iter()
                    .enumerate()
                    .map(|(i, t)| Tree::from_spec(t, n_features).map_err(|e| format!("tree {i}: {e}")))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(Box::new(ForestModel { n_features, trees }))
            }
        }
    }
}

/// `intercept + Σ coefficient·x`.
#[derive(Debug, Clone)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl Regressor for LinearModel {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_row(&self, row: &[f64]) -> Result<f64> {
        check_width(row, self.n_features())?;
        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c * x)
                .sum::<f64>())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

/// A validated regression tree.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_spec(spec: &TreeSpec, n_features: usize) -> std::result::Result<Self, String> {
        let n = spec.children_left.len();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if [
            spec.children_right.len(),
            spec.feature.len(),
            spec.threshold.len(),
            spec.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err("node arrays differ in length".to_string());
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let (left, right) = (spec.children_left[i], spec.children_right[i]);
            if left == -1 && right == -1 {
                nodes.push(Node::Leaf(spec.value[i]));
                continue;
            }
            // Children must come after their parent; this also rules out cycles.
            let child = |c: i64| -> std::result::Result<usize, String> {
                usize::try_from(c)
                    .ok()
                    .filter(|&c| c > i && c < n)
                    .ok_or_else(|| format!("node {i} has invalid child {c}"))
            };
            let feature = usize::try_from(spec.feature[i])
                .ok()
                .filter(|&f| f < n_features)
                .ok_or_else(|| format!("node {i} splits on unknown feature {}", spec.feature[i]))?;
            nodes.push(Node::Split {
                feature,
                threshold: spec.threshold[i],
                left: child(left)?,
                right: child(right)?,
            });
        }

        Ok(Self { nodes })
    }

    fn predict(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

/// Mean of the outputs of its trees.
#[derive(Debug, Clone)]
pub struct ForestModel {
    n_features: usize,
    trees: Vec<Tree>,
}

impl Regressor for ForestModel {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_row(&self, row: &[f64]) -> Result<f64> {
        check_width(row, self.n_features)?;
        let sum: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        Ok(sum / self.trees.len() as f64)
    }
}

fn check_width(row: &[f64], expected: usize) -> Result<()> {
    if row.len() != expected {
        return Err(NoxError::SchemaMismatch(format!(
            "row has {} values, model expects {}",
            row.len(),
            expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump_json() -> &'static str {
        // Two trees over two features:
        //   tree 0: x0 <= 50 ? 10 : 90
        //   tree 1: x1 <= 5  ? 20 : (x0 <= 100 ? 40 : 60)
        r#"{
            "target": "nox",
            "feature_names": ["a", "b"],
            "model": {
                "kind": "forest",
                "trees": [
                    {
                        "children_left":  [1, -1, -1],
                        "children_right": [2, -1, -1],
                        "feature":        [0, -2, -2],
                        "threshold":      [50.0, -2.0, -2.0],
                        "value":          [0.0, 10.0, 90.0]
                    },
                    {
                        "children_left":  [1, -1, 3, -1, -1],
                        "children_right": [2, -1, 4, -1, -1],
                        "feature":        [1, -2, 0, -2, -2],
                        "threshold":      [5.0, -2.0, 100.0, -2.0, -2.0],
                        "value":          [0.0, 20.0, 0.0, 40.0, 60.0]
                    }
                ]
            }
        }"#
    }

    #[test]
    fn forest_averages_tree_outputs() {
        let artifact = ModelArtifact::from_json(stump_json()).unwrap();
        assert_eq!(artifact.target.as_deref(), Some("nox"));
        assert_eq!(artifact.model.summary(), "forest, 2 trees");
        let model = artifact.build_regressor().unwrap();
        assert_eq!(model.n_features(), 2);

        // tree0 -> 10 (50 <= 50 goes left), tree1 -> 20
        assert_eq!(model.predict_row(&[50.0, 5.0]).unwrap(), 15.0);
        // tree0 -> 90, tree1 -> 40
        assert_eq!(model.predict_row(&[80.0, 6.0]).unwrap(), 65.0);
        // tree0 -> 90, tree1 -> 60
        assert_eq!(model.predict_row(&[150.0, 6.0]).unwrap(), 75.0);
    }

    #[test]
    fn linear_is_dot_product_plus_intercept() {
        let model = LinearModel {
            intercept: 1.0,
            coefficients: vec![2.0, -1.0],
        };
        assert_eq!(model.predict_row(&[3.0, 4.0]).unwrap(), 3.0);
    }

    #[test]
    fn wrong_row_width_is_schema_mismatch() {
        let model = LinearModel {
            intercept: 0.0,
            coefficients: vec![1.0, 1.0],
        };
        assert!(matches!(
            model.predict_row(&[1.0]),
            Err(NoxError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn rejects_malformed_trees() {
        let cyclic = r#"{
            "feature_names": ["a"],
            "model": { "kind": "forest", "trees": [ {
                "children_left": [0], "children_right": [0],
                "feature": [0], "threshold": [1.0], "value": [0.0]
            } ] }
        }"#;
        let err = ModelArtifact::from_json(cyclic)
            .unwrap()
            .build_regressor()
            .unwrap_err();
        assert!(err.contains("invalid child"), "{err}");

        let bad_feature = r#"{
            "feature_names": ["a"],
            "model": { "kind": "forest", "trees": [ {
                "children_left": [1, -1, -1], "children_right": [2, -1, -1],
                "feature": [3, -2, -2], "threshold": [1.0, 0.0, 0.0], "value": [0.0, 1.0, 2.0]
            } ] }
        }"#;
        let err = ModelArtifact::from_json(bad_feature)
            .unwrap()
            .build_regressor()
            .unwrap_err();
        assert!(err.contains("unknown feature"), "{err}");

        let ragged = r#"{
            "feature_names": ["a"],
            "model": { "kind": "forest", "trees": [ {
                "children_left": [-1], "children_right": [-1, -1],
                "feature": [-2], "threshold": [0.0], "value": [1.0]
            } ] }
        }"#;
        assert!(ModelArtifact::from_json(ragged)
            .unwrap()
            .build_regressor()
            .is_err());

        let empty = r#"{ "feature_names": ["a"], "model": { "kind": "forest", "trees": [] } }"#;
        assert!(ModelArtifact::from_json(empty)
            .unwrap()
            .build_regressor()
            .is_err());
    }

    #[test]
    fn linear_coefficient_count_must_match() {
        let json = r#"{
            "feature_names": ["a", "b"],
            "model": { "kind": "linear", "intercept": 0.0, "coefficients": [1.0] }
        }"#;
        assert!(ModelArtifact::from_json(json)
            .unwrap()
            .build_regressor()
            .is_err());
    }

    #[test]
    fn unknown_kind_fails_to_parse() {
        let json = r#"{ "feature_names": [], "model": { "kind": "svm" } }"#;
        assert!(ModelArtifact::from_json(json).is_err());
    }
}
