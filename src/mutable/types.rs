use std::collections::{BTreeMap, HashMap};

use flexstr::SharedStr as FlexStr;

pub type GeneSymbol = FlexStr;
pub type UniProtId = FlexStr;
pub type Consequence = FlexStr;
pub type AaChange = FlexStr;

// the structure's own numbering, which may be negative or have gaps
pub type ResidueNumber = i32;

pub type CompositeKey = String;

pub type GeneUniProtMap = HashMap<GeneSymbol, Vec<UniProtId>>;

pub type ResidueCoordinateMap = BTreeMap<ResidueNumber, crate::bio::structure_reader::ResidueCoordinate>;
