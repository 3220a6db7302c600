use flexstr::SharedStr as FlexStr;
use serde_json::Value;

use crate::bio::lollipop::AggregatedVariantEntry;
use crate::bio::proximity::DistanceEdge;
use crate::db::gene::GeneMetrics;
use crate::db::scores::{PlddtScore, RegionalConstraint};
use crate::types::{GeneSymbol, UniProtId};

// the {name, values} shape the plotting front end reads its data sets from
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct NamedValues<T> {
    pub name: &'static str,
    pub values: T,
}

impl<T> NamedValues<T> {
    pub fn new(name: &'static str, values: T) -> NamedValues<T> {
        NamedValues {
            name,
            values,
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct LollipopPayload {
    pub gene: GeneSymbol,
    pub sequence: NamedValues<Value>,
    pub domains: NamedValues<Vec<Value>>,
    pub distance: NamedValues<Vec<DistanceEdge>>,
    pub variants: NamedValues<Vec<AggregatedVariantEntry>>,
    pub consequences: Vec<FlexStr>,
}

#[derive(Serialize, Clone, Debug)]
pub struct GenePagePayload {
    pub gene: GeneSymbol,
    pub metrics: GeneMetrics,
    pub sequence: NamedValues<Value>,
    pub aa_change: NamedValues<u64>,
    pub domains: NamedValues<Vec<Value>>,
    pub distance: NamedValues<Vec<DistanceEdge>>,
    pub variants: NamedValues<Vec<AggregatedVariantEntry>>,
    pub consequences: Vec<FlexStr>,
    pub conditions: Vec<FlexStr>,
    pub constraints: NamedValues<Vec<RegionalConstraint>>,
    pub plddt: NamedValues<Vec<PlddtScore>>,
    pub uniprot_id: Option<UniProtId>,
    pub display_fields: Vec<FlexStr>,
    // the cohort rows of the gene with every stored column
    pub rows: Vec<serde_json::Map<String, Value>>,
}

#[derive(Serialize, Clone, Debug)]
pub struct SamplePagePayload {
    pub sample: serde_json::Map<String, Value>,
    pub display_fields: Vec<FlexStr>,
    pub rows: Vec<serde_json::Map<String, Value>>,
}
