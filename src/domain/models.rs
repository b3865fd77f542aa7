use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::rating::{FitMethod, FitReport, ItemId, PlackettLuce, Ranking};

/// Rankings loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    /// Optional display names, indexed by item id
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub n_items: Option<usize>,
    pub rankings: Vec<Ranking>,
}

impl Dataset {
    /// Explicit `n_items`, else the number of names, else the largest id + 1
    pub fn resolve_n_items(&self) -> Result<usize> {
        if let Some(n_items) = self.n_items {
            return Ok(n_items);
        }
        if !self.items.is_empty() {
            return Ok(self.items.len());
        }

        match self.rankings.iter().flatten().max() {
            Some(&max_id) => Ok(max_id + 1),
            None => bail!("Dataset has no items: provide `n_items`, `items` or non-empty rankings"),
        }
    }

    pub fn item_name(&self, item: ItemId) -> Option<&str> {
        self.items.get(item).map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ItemSummary {
    pub rank: usize,
    pub item: ItemId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub strength: f64,
}

/// Everything the CLI reports after a fit
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FitSummary {
    pub method: FitMethod,
    pub n_items: usize,
    pub n_rankings: usize,
    pub iterations: usize,
    pub converged: bool,
    pub log_likelihood: f64,
    pub ranking: Vec<ItemSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<Vec<ItemId>>,
}

impl FitSummary {
    pub fn build(
        dataset: &Dataset,
        model: &PlackettLuce,
        report: &FitReport,
        top_k: Option<usize>,
    ) -> Result<Self> {
        let ranking = model
            .rank_items()?
            .into_iter()
            .enumerate()
            .map(|(idx, item)| ItemSummary {
                rank: idx + 1,
                item,
                name: dataset.item_name(item).map(str::to_string),
                strength: model.strengths()[item],
            })
            .collect();

        let top_k = top_k.map(|k| model.top_k(k)).transpose()?;

        Ok(Self {
            method: report.method,
            n_items: model.n_items(),
            n_rankings: dataset.rankings.len(),
            iterations: report.iterations,
            converged: report.converged,
            log_likelihood: report.log_likelihood,
            ranking,
            top_k,
        })
    }
}
