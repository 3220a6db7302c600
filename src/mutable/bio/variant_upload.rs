use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use flexstr::{SharedStr as FlexStr, ToSharedStr};

use crate::bio::aa_change::{first_digits, parse_aa_position, AaChangeNotation};
use crate::constants::{CHROMOSOME_COLUMN_NAMES, MISSENSE, POSITION_COLUMN_NAMES};
use crate::db::annotation::AnnotationLookup;
use crate::db::gene::GeneDb;
use crate::error::{MutableError, RequiredColumn, Result, ValidationError};
use crate::types::{AaChange, CompositeKey, Consequence, GeneSymbol, GeneUniProtMap,
                   ResidueNumber};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Variant {
    pub gene: GeneSymbol,
    pub consequence: Consequence,
    pub aa_change: Option<AaChange>,
    pub residue_position: Option<ResidueNumber>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Tsv,
    SpaceSeparated,
    Csv,
}

impl UploadFormat {
    pub fn from_file_name(file_name: &str) -> std::result::Result<UploadFormat, ValidationError> {
        let extension = Path::new(file_name).extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        match extension.as_deref() {
            Some("tsv") => Ok(UploadFormat::Tsv),
            Some("txt") => Ok(UploadFormat::SpaceSeparated),
            Some("csv") => Ok(UploadFormat::Csv),
            _ => Err(ValidationError::UnsupportedFormat(file_name.to_owned())),
        }
    }

    pub fn delimiter(&self) -> u8 {
        match self {
            UploadFormat::Tsv => b'\t',
            UploadFormat::SpaceSeparated => b' ',
            UploadFormat::Csv => b',',
        }
    }
}

// the uploaded rows with lower cased column names
#[derive(Debug, Clone)]
pub struct UploadTable {
    pub headers: Vec<String>,
    pub rows: Vec<StringRecord>,
}

impl UploadTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    // the first of the alternative names that is present
    pub fn first_column_index(&self, names: &[&str]) -> Option<usize> {
        names.iter().find_map(|name| self.column_index(name))
    }
}

fn cell(row: &StringRecord, index: usize) -> &str {
    row.get(index).unwrap_or("")
}

pub fn read_upload_table<R: Read>(reader: R, format: UploadFormat)
    -> std::result::Result<UploadTable, csv::Error>
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(format.delimiter())
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?
        .iter()
        .map(|header| header.to_lowercase())
        .collect();

    let mut rows = vec![];

    for result in csv_reader.records() {
        rows.push(result?);
    }

    Ok(UploadTable {
        headers,
        rows,
    })
}

#[derive(Debug, Clone)]
pub struct VariantLevelInput {
    table: UploadTable,
    consequence: usize,
    chromosome: usize,
    position: usize,
    reference: usize,
    alternate: usize,
}

#[derive(Debug, Clone)]
pub struct GeneLevelInput {
    table: UploadTable,
    gene: usize,
    consequence: usize,
    aa_change: usize,
}

#[derive(Debug, Clone)]
pub enum UploadedTable {
    // CHROM/POS/REF/ALT rows that need annotating
    VariantLevel(VariantLevelInput),
    // rows that already have gene and aa_change
    GeneLevel(GeneLevelInput),
}

fn required(index: Option<usize>, column: RequiredColumn)
    -> std::result::Result<usize, ValidationError>
{
    index.ok_or(ValidationError::MissingColumn(column))
}

pub fn validate_upload(table: UploadTable)
    -> std::result::Result<UploadedTable, ValidationError>
{
    if let Some(aa_change) = table.column_index("aa_change") {
        let gene = required(table.column_index("gene"), RequiredColumn::Gene)?;
        let consequence =
            required(table.column_index("consequence"), RequiredColumn::Consequence)?;

        return Ok(UploadedTable::GeneLevel(GeneLevelInput {
            table,
            gene,
            consequence,
            aa_change,
        }));
    }

    let consequence =
        required(table.column_index("consequence"), RequiredColumn::Consequence)?;
    let chromosome =
        required(table.first_column_index(CHROMOSOME_COLUMN_NAMES), RequiredColumn::Chromosome)?;
    let position =
        required(table.first_column_index(POSITION_COLUMN_NAMES), RequiredColumn::Position)?;
    let reference = required(table.column_index("ref"), RequiredColumn::Ref)?;
    let alternate = required(table.column_index("alt"), RequiredColumn::Alt)?;

    Ok(UploadedTable::VariantLevel(VariantLevelInput {
        table,
        consequence,
        chromosome,
        position,
        reference,
        alternate,
    }))
}

// "chr7", 140453136, "A", "T" -> "7-140453136-A-T"
pub fn composite_key(chromosome: &str, position: &str, reference: &str, alternate: &str)
    -> Option<CompositeKey>
{
    let chromosome_number = first_digits(chromosome)?;

    Some(format!("{}-{}-{}-{}", chromosome_number, position, reference, alternate))
}

impl VariantLevelInput {
    fn missense_row_keys(&self) -> Vec<CompositeKey> {
        self.table.rows.iter()
            .filter(|row| cell(row, self.consequence) == MISSENSE)
            .filter_map(|row| {
                composite_key(cell(row, self.chromosome), cell(row, self.position),
                              cell(row, self.reference), cell(row, self.alternate))
            })
            .collect()
    }

    // Only missense variants can be annotated, rows without a match in the
    // annotation store are dropped
    pub fn into_variants(self, annotations: &dyn AnnotationLookup) -> Result<Vec<Variant>> {
        let row_keys = self.missense_row_keys();
        let distinct_keys: BTreeSet<CompositeKey> = row_keys.iter().cloned().collect();

        let annotation_map = annotations.missense_annotations(&distinct_keys)?;

        tracing::debug!("{} of {} distinct variant keys annotated",
                        annotation_map.len(), distinct_keys.len());

        let variants = row_keys.iter()
            .filter_map(|key| annotation_map.get(key))
            .map(|annotation| Variant {
                gene: annotation.symbol.clone(),
                consequence: MISSENSE.into(),
                aa_change: Some(annotation.aa_change()),
                residue_position: Some(annotation.protein_position),
            })
            .collect();

        Ok(variants)
    }
}

impl GeneLevelInput {
    pub fn into_variants(self) -> Vec<Variant> {
        self.table.rows.iter()
            .filter(|row| !cell(row, self.aa_change).is_empty())
            .map(|row| {
                let aa_change = cell(row, self.aa_change);
                Variant {
                    gene: cell(row, self.gene).to_shared_str(),
                    consequence: cell(row, self.consequence).to_shared_str(),
                    aa_change: Some(aa_change.to_shared_str()),
                    residue_position:
                        parse_aa_position(aa_change, AaChangeNotation::PlainDigits),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct NormalizedUpload {
    pub variants: Vec<Variant>,
    pub gene_uniprot_map: GeneUniProtMap,
    // uploads are analysed one gene at a time: the gene of the first row
    pub gene: GeneSymbol,
}

pub fn normalize_variants(uploaded_table: UploadedTable,
                          annotations: &dyn AnnotationLookup)
    -> Result<Vec<Variant>>
{
    match uploaded_table {
        UploadedTable::VariantLevel(input) => input.into_variants(annotations),
        UploadedTable::GeneLevel(input) => Ok(input.into_variants()),
    }
}

pub fn normalize_upload<R: Read>(reader: R, format: UploadFormat,
                                 annotations: &dyn AnnotationLookup, gene_db: &GeneDb)
    -> Result<NormalizedUpload>
{
    let table = read_upload_table(reader, format)?;

    tracing::debug!("read {} upload rows with columns: {}", table.rows.len(),
                    itertools::join(&table.headers, ", "));

    let uploaded_table = validate_upload(table)?;
    let variants = normalize_variants(uploaded_table, annotations)?;

    let gene: FlexStr =
        match variants.first() {
            Some(variant) => variant.gene.clone(),
            None => return Err(MutableError::NoVariants),
        };

    let gene_uniprot_map = gene_db.gene_uniprot_map()?;

    Ok(NormalizedUpload {
        variants,
        gene_uniprot_map,
        gene,
    })
}
