//! Predictor registry for discovery and introspection.
//!
//! The registry provides a centralized way to discover, instantiate, and
//! query predictors, and to compute all of them in one pass.

use crate::{
    ConfigurablePredictor, Predictor, PredictorConfig, Result, SignalError, TableSet,
    distress::OScore,
    investment::Noa,
    issuance::{CompEquIss, Nsi},
    profitability::Roa,
};
use derive_more::Display;
use polars::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::info;

/// Predictor category for grouping related signals.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PredictorCategory {
    /// Investment - balance-sheet expansion signals
    Investment,
    /// Issuance - equity issuance and repurchase signals
    Issuance,
    /// Profitability - earnings relative to assets
    Profitability,
    /// Distress - bankruptcy and financial distress signals
    Distress,
}

/// Metadata for predictor introspection.
#[derive(Debug, Clone, Serialize)]
pub struct PredictorInfo {
    /// Predictor name (unique identifier)
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Predictor category
    pub category: PredictorCategory,
    /// Input tables with their required columns
    pub inputs: Vec<(String, Vec<String>)>,
    /// Publication lag in months
    pub publication_lag: u32,
}

/// Build a predictor by name with an explicit configuration.
pub fn configured(name: &str, config: PredictorConfig) -> Result<Arc<dyn Predictor>> {
    let predictor: Arc<dyn Predictor> = match name {
        "NOA" => Arc::new(Noa::with_config(config)),
        "NSI" => Arc::new(Nsi::with_config(config)),
        "OScore" => Arc::new(OScore::with_config(config)),
        "ROA" => Arc::new(Roa::with_config(config)),
        "CompEquIss" => Arc::new(CompEquIss::with_config(config)),
        _ => return Err(SignalError::NotFound(name.to_string())),
    };
    Ok(predictor)
}

/// Registry for predictor discovery and instantiation.
#[derive(Debug, Default)]
pub struct PredictorRegistry {
    predictors: HashMap<String, Arc<dyn Predictor>>,
}

impl PredictorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            predictors: HashMap::new(),
        }
    }

    /// Register all standard predictors with their default configuration.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(Arc::new(Noa::default()));
        registry.register(Arc::new(Nsi::default()));
        registry.register(Arc::new(CompEquIss::default()));
        registry.register(Arc::new(OScore::default()));
        registry.register(Arc::new(Roa::default()));

        registry
    }

    /// Register a predictor, replacing any predictor with the same name.
    pub fn register(&mut self, predictor: Arc<dyn Predictor>) {
        self.predictors
            .insert(predictor.name().to_string(), predictor);
    }

    /// Replace a registered predictor with one built from `config`.
    pub fn configure(&mut self, name: &str, config: PredictorConfig) -> Result<()> {
        if !self.predictors.contains_key(name) {
            return Err(SignalError::NotFound(name.to_string()));
        }
        self.register(configured(name, config)?);
        Ok(())
    }

    /// Get a predictor by name.
    pub fn get(&self, name: &str) -> Option<&dyn Predictor> {
        self.predictors.get(name).map(|p| p.as_ref())
    }

    /// Get predictors by category.
    pub fn by_category(&self, category: PredictorCategory) -> Vec<&dyn Predictor> {
        self.predictors
            .values()
            .filter(|p| p.category() == category)
            .map(|p| p.as_ref())
            .collect()
    }

    /// Metadata for every predictor, sorted by name.
    pub fn all_info(&self) -> Vec<PredictorInfo> {
        let mut info: Vec<_> = self
            .predictors
            .values()
            .map(|p| PredictorInfo {
                name: p.name().to_string(),
                description: p.description().to_string(),
                category: p.category(),
                inputs: p
                    .inputs()
                    .iter()
                    .map(|input| {
                        (
                            input.table.to_string(),
                            input.columns.iter().map(|c| c.to_string()).collect(),
                        )
                    })
                    .collect(),
                publication_lag: p.publication_lag(),
            })
            .collect();
        info.sort_by(|a, b| a.name.cmp(&b.name));
        info
    }

    /// All predictor names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.predictors.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Compute every registered predictor.
    ///
    /// Returns the standardized output of each predictor keyed by name.
    pub fn compute_all(&self, tables: &TableSet) -> Result<BTreeMap<String, DataFrame>> {
        let mut results = BTreeMap::new();

        for name in self.names() {
            let predictor = &self.predictors[name];
            info!(predictor = name, "computing");
            results.insert(name.to_string(), predictor.compute(tables)?);
        }

        Ok(results)
    }

    /// Number of registered predictors.
    pub fn len(&self) -> usize {
        self.predictors.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.predictors.is_empty()
    }
}
