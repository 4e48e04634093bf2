//! Confidence scoring for completed agent runs

use std::collections::BTreeMap;

use serde_json::Value;

use crate::types::{is_present, round2, AgentResult, DataMap};

/// How an agent turns a successful run into a confidence score.
/// Every variant is capped and rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfidenceFormula {
    /// `base + per_optional * optional_count + schema_coverage * completeness_weight`
    Coverage {
        base: f64,
        per_optional: f64,
        completeness_weight: f64,
        cap: f64,
    },
    /// Rewards the number of profile sources supplied (required source
    /// included) and the share of per-source analyses without an `error` key.
    Sources {
        base: f64,
        max_sources: usize,
        sources_weight: f64,
        analyses_key: &'static str,
        success_weight: f64,
        cap: f64,
    },
    /// Fixed boost per completed upstream agent plus completeness over a
    /// handful of key output fields.
    Upstream {
        base: f64,
        upstream: &'static [(&'static str, f64)],
        key_fields: &'static [&'static str],
        completeness_weight: f64,
        cap: f64,
    },
}

impl ConfidenceFormula {
    /// The shared formula used by most agents
    pub const DEFAULT: ConfidenceFormula = ConfidenceFormula::Coverage {
        base: 0.7,
        per_optional: 0.05,
        completeness_weight: 0.2,
        cap: 1.0,
    };

    pub fn score(&self, inputs: &ConfidenceInputs<'_>) -> f64 {
        let (raw, cap) = match *self {
            ConfidenceFormula::Coverage {
                base,
                per_optional,
                completeness_weight,
                cap,
            } => {
                let coverage = fraction_present(inputs.output, inputs.schema);
                (
                    base + per_optional * inputs.optional_count as f64
                        + coverage * completeness_weight,
                    cap,
                )
            }
            ConfidenceFormula::Sources {
                base,
                max_sources,
                sources_weight,
                analyses_key,
                success_weight,
                cap,
            } => {
                let sources = (inputs.optional_count + 1).min(max_sources.max(1));
                let source_share = sources as f64 / max_sources.max(1) as f64;
                let success_share = analysis_success_share(inputs.output.get(analyses_key));
                (
                    base + source_share * sources_weight + success_share * success_weight,
                    cap,
                )
            }
            ConfidenceFormula::Upstream {
                base,
                upstream,
                key_fields,
                completeness_weight,
                cap,
            } => {
                let boost: f64 = upstream
                    .iter()
                    .filter(|(id, _)| inputs.previous_outputs.contains_key(*id))
                    .map(|(_, weight)| weight)
                    .sum();
                let completeness = fraction_present(inputs.output, key_fields);
                (base + boost + completeness * completeness_weight, cap)
            }
        };
        round2(raw.clamp(0.0, cap))
    }
}

/// Data a formula may look at
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceInputs<'a> {
    /// Optional fields that were present in user data
    pub optional_count: usize,
    pub output: &'a DataMap,
    pub schema: &'a [&'a str],
    pub previous_outputs: &'a BTreeMap<String, AgentResult>,
}

fn fraction_present(output: &DataMap, keys: &[&str]) -> f64 {
    if keys.is_empty() {
        return 0.0;
    }
    let present = keys.iter().filter(|k| is_present(output.get(**k))).count();
    present as f64 / keys.len() as f64
}

fn analysis_success_share(analyses: Option<&Value>) -> f64 {
    let Some(Value::Object(analyses)) = analyses else {
        return 0.0;
    };
    let succeeded = analyses
        .values()
        .filter(|a| a.get("error").is_none())
        .count();
    succeeded as f64 / analyses.len().max(1) as f64
}
