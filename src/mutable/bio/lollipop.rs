use std::collections::BTreeSet;

use flexstr::{SharedStr as FlexStr, ToSharedStr};
use indexmap::IndexMap;

use crate::bio::aa_change::{is_placeholder_aa_change, parse_aa_position, rebuild_plain_label,
                            strip_transcript_prefix, AaChangeNotation};
use crate::bio::variant_upload::Variant;
use crate::constants::{INVISIBLE, MISSENSE};
use crate::types::{AaChange, Consequence, ResidueNumber};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum VariantLabel {
    Text(FlexStr),
    Position(ResidueNumber),
}

// scores and sample information that only the cohort tables have
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct CohortDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<FlexStr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gmvp: Option<FlexStr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub misfit_d: Option<FlexStr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alphamissense: Option<FlexStr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariantRow {
    pub consequence: Consequence,
    pub aa_change: Option<AaChange>,
    pub details: CohortDetails,
}

impl From<&Variant> for VariantRow {
    fn from(variant: &Variant) -> VariantRow {
        VariantRow {
            consequence: variant.consequence.clone(),
            aa_change: variant.aa_change.clone(),
            details: CohortDetails::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AggregatedVariantEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<VariantLabel>,
    pub position: ResidueNumber,
    pub count: usize,
    #[serde(rename = "type")]
    pub consequence_type: Consequence,
    #[serde(flatten)]
    pub details: CohortDetails,
}

impl AggregatedVariantEntry {
    pub fn increment(&mut self) {
        self.count += 1;
    }

    // The plotting library mishandles a plot where every count is 1.
    // This entry widens the count range and is hidden by the front end.
    pub fn invisible_placeholder() -> AggregatedVariantEntry {
        AggregatedVariantEntry {
            label: None,
            position: 1,
            count: 2,
            consequence_type: INVISIBLE.into(),
            details: CohortDetails::default(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        &*self.consequence_type == INVISIBLE
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct LollipopVariants {
    pub entries: Vec<AggregatedVariantEntry>,
    pub consequences: Vec<FlexStr>,
    pub more_than_one: bool,
}

pub fn consequence_label(consequence: &str) -> FlexStr {
    consequence.replace("_variant", "").to_shared_str()
}

// missense first for nicer colouring, otherwise alphabetical
pub fn order_consequences(consequences: BTreeSet<FlexStr>) -> Vec<FlexStr> {
    let mut ordered: Vec<FlexStr> = consequences.into_iter().collect();
    ordered.sort_by_key(|consequence| !consequence.contains(MISSENSE));
    ordered
}

fn make_label(aa_change: &str, consequence: &str, position: ResidueNumber,
              notation: AaChangeNotation)
    -> VariantLabel
{
    // cohort rows label other consequences with the digits of their position
    if !consequence.contains(MISSENSE) {
        return match notation {
            AaChangeNotation::ProteinNotation =>
                VariantLabel::Text(position.to_string().to_shared_str()),
            AaChangeNotation::PlainDigits => VariantLabel::Position(position),
        };
    }

    match notation {
        AaChangeNotation::ProteinNotation => VariantLabel::Text(aa_change.to_shared_str()),
        AaChangeNotation::PlainDigits => {
            if aa_change.contains("p.") {
                VariantLabel::Text(aa_change.to_shared_str())
            } else {
                VariantLabel::Text(rebuild_plain_label(aa_change).to_shared_str())
            }
        }
    }
}

fn position_text(aa_change: &str, notation: AaChangeNotation) -> &str {
    match notation {
        AaChangeNotation::PlainDigits => aa_change,
        AaChangeNotation::ProteinNotation => strip_transcript_prefix(aa_change),
    }
}

// Collapse the rows by their amino acid change text, counting repeats
pub fn aggregate<'a, I>(rows: I, notation: AaChangeNotation) -> LollipopVariants
    where I: IntoIterator<Item = &'a VariantRow>
{
    let mut seen: IndexMap<AaChange, AggregatedVariantEntry> = IndexMap::new();
    let mut consequences = BTreeSet::new();
    let mut more_than_one = false;

    for row in rows {
        let Some(ref aa_change) = row.aa_change
        else {
            continue;
        };

        if is_placeholder_aa_change(aa_change) {
            continue;
        }

        let position_text = position_text(aa_change, notation);

        let Some(position) = parse_aa_position(position_text, notation)
        else {
            tracing::debug!("skipping unparsable amino acid change: {}", aa_change);
            continue;
        };

        let consequence_type = consequence_label(&row.consequence);
        consequences.insert(consequence_type.clone());

        if let Some(entry) = seen.get_mut(aa_change) {
            entry.increment();
            more_than_one = true;
            continue;
        }

        let label = make_label(position_text, &row.consequence, position, notation);

        seen.insert(aa_change.clone(), AggregatedVariantEntry {
            label: Some(label),
            position,
            count: 1,
            consequence_type,
            details: row.details.clone(),
        });
    }

    let mut entries: Vec<_> = seen.into_values().collect();

    if !more_than_one {
        entries.push(AggregatedVariantEntry::invisible_placeholder());
    }

    LollipopVariants {
        entries,
        consequences: order_consequences(consequences),
        more_than_one,
    }
}
