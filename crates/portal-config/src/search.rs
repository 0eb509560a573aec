//! Search engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default cap on results per result type.
const fn default_max_results_per_type() -> usize {
    5000
}

/// Default number of ontology individuals resolved per annotation lookup.
const fn default_individual_batch_size() -> usize {
    10
}

const fn default_min_dataset_query_len() -> usize {
    3
}

const fn default_min_term_len() -> usize {
    2
}

fn default_gene_uri_marker() -> String {
    String::from("ncbi_gene")
}

fn default_gene_uri_prefix() -> String {
    String::from("http://purl.org/commons/record/ncbi_gene/")
}

const fn default_slow_stage_ms() -> u64 {
    500
}

const fn default_slow_backend_ms() -> u64 {
    1000
}

const fn default_phenotype_gene_limit() -> usize {
    100
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SearchConfig {
    /// Default cap applied to each result-type bucket.
    #[serde(default = "default_max_results_per_type")]
    pub max_results_per_type: usize,

    /// How many ontology individuals are looked up per annotation query.
    #[serde(default = "default_individual_batch_size")]
    pub individual_batch_size: usize,

    /// Shortest query accepted by the id-only dataset search.
    #[serde(default = "default_min_dataset_query_len")]
    pub min_dataset_query_len: usize,

    /// Shorter whitespace-separated tokens are dropped from general queries.
    #[serde(default = "default_min_term_len")]
    pub min_term_len: usize,

    /// Substring identifying a gene URI (e.g. `http://purl.org/commons/record/ncbi_gene/1017`).
    #[serde(default = "default_gene_uri_marker")]
    pub gene_uri_marker: String,

    /// Prefix used to build the URI of a gene from its NCBI id.
    #[serde(default = "default_gene_uri_prefix")]
    pub gene_uri_prefix: String,

    /// Root prefix for the links embedded in annotation highlight text.
    #[serde(default)]
    pub link_root: String,

    /// Soft threshold above which a search stage logs its timing.
    #[serde(default = "default_slow_stage_ms")]
    pub slow_stage_ms: u64,

    /// Soft threshold above which a per-type backend search logs its timing.
    #[serde(default = "default_slow_backend_ms")]
    pub slow_backend_ms: u64,

    /// Stop collecting phenotype-linked genes after this many.
    #[serde(default = "default_phenotype_gene_limit")]
    pub phenotype_gene_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results_per_type: default_max_results_per_type(),
            individual_batch_size: default_individual_batch_size(),
            min_dataset_query_len: default_min_dataset_query_len(),
            min_term_len: default_min_term_len(),
            gene_uri_marker: default_gene_uri_marker(),
            gene_uri_prefix: default_gene_uri_prefix(),
            link_root: String::new(),
            slow_stage_ms: default_slow_stage_ms(),
            slow_backend_ms: default_slow_backend_ms(),
            phenotype_gene_limit: default_phenotype_gene_limit(),
        }
    }
}

impl SearchConfig {
    /// Reject values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a zero result cap, a zero
    /// batch size, a blank gene URI marker, or a gene URI prefix that the
    /// marker would not recognize.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_results_per_type == 0 {
            return Err(invalid("search.max_results_per_type", "must be positive"));
        }
        if self.individual_batch_size == 0 {
            return Err(invalid("search.individual_batch_size", "must be positive"));
        }
        if self.gene_uri_marker.trim().is_empty() {
            return Err(invalid("search.gene_uri_marker", "must not be blank"));
        }
        if !self.gene_uri_prefix.contains(&self.gene_uri_marker) {
            return Err(invalid(
                "search.gene_uri_prefix",
                "must contain the gene URI marker",
            ));
        }
        Ok(())
    }
}

pub(crate) fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
