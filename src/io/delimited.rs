//! Delimited-text reading and writing for expression matrices, group tables
//! and quantile tables

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ::csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use ndarray::Array2;

use crate::data::{ExpressionMatrix, GeneQuantileMap, GroupTable, QuantileTable};
use crate::error::{CenteringError, Result};

/// Tokens read as a missing value
const MISSING_TOKENS: [&str; 6] = ["", "NA", "NaN", "nan", "NULL", "null"];

/// Token written for a missing value
const MISSING_OUT: &str = "NA";

fn is_missing(token: &str) -> bool {
    MISSING_TOKENS.contains(&token)
}

/// Tab if the header line contains one, comma otherwise
fn detect_delimiter(path: &Path) -> Result<u8> {
    let mut header = String::new();
    BufReader::new(File::open(path)?).read_line(&mut header)?;
    if header.trim().is_empty() {
        return Err(CenteringError::EmptyData {
            reason: format!("{} is empty", path.display()),
        });
    }
    Ok(if header.contains('\t') { b'\t' } else { b',' })
}

/// Open a header-first table and return (header, data rows)
fn read_table(path: &Path) -> Result<(StringRecord, Vec<StringRecord>)> {
    let delimiter = detect_delimiter(path)?;
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)?;

    let header = reader.headers()?.clone();
    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        if record.len() != header.len() {
            return Err(CenteringError::InvalidInput {
                reason: format!(
                    "{}: row {} has {} columns, expected {}",
                    path.display(),
                    line + 2,
                    record.len(),
                    header.len()
                ),
            });
        }
        rows.push(record);
    }
    Ok((header, rows))
}

fn parse_value(token: &str) -> Result<Option<f64>> {
    if is_missing(token) {
        return Ok(None);
    }
    token
        .parse::<f64>()
        .map(|v| if v.is_nan() { None } else { Some(v) })
        .map_err(|_| CenteringError::InvalidInput {
            reason: format!("Invalid expression value: {}", token),
        })
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => MISSING_OUT.to_string(),
    }
}

/// Read an expression matrix
/// Expected format: first column is gene IDs, first row is sample IDs
pub fn read_expression_matrix<P: AsRef<Path>>(path: P) -> Result<ExpressionMatrix> {
    let path = path.as_ref();
    let (header, rows) = read_table(path)?;
    if header.len() < 2 {
        return Err(CenteringError::InvalidInput {
            reason: "Not enough columns in expression header".to_string(),
        });
    }

    let sample_ids: Vec<String> = header.iter().skip(1).map(String::from).collect();
    let n_samples = sample_ids.len();

    let mut gene_ids = Vec::with_capacity(rows.len());
    let mut cells = Vec::with_capacity(rows.len() * n_samples);
    for record in &rows {
        gene_ids.push(record[0].to_string());
        for token in record.iter().skip(1) {
            cells.push(parse_value(token)?);
        }
    }

    if gene_ids.is_empty() {
        return Err(CenteringError::EmptyData {
            reason: "No genes found in expression matrix".to_string(),
        });
    }

    let values = Array2::from_shape_vec((gene_ids.len(), n_samples), cells).map_err(|e| {
        CenteringError::Shape {
            reason: e.to_string(),
        }
    })?;

    let matrix = ExpressionMatrix::new(values, gene_ids, sample_ids)?;
    log::debug!(
        "{}: {} genes x {} samples, {} missing cells",
        path.display(),
        matrix.n_genes(),
        matrix.n_samples(),
        matrix.n_missing()
    );
    Ok(matrix)
}

/// Read sample groupings
/// Expected format: first column is sample IDs, remaining columns are
/// grouping schemes. Missing tokens mark unassigned samples.
pub fn read_group_table<P: AsRef<Path>>(path: P) -> Result<GroupTable> {
    let path = path.as_ref();
    let (header, rows) = read_table(path)?;
    if header.len() < 2 {
        return Err(CenteringError::InvalidInput {
            reason: "Group table needs a sample column and at least one grouping column".to_string(),
        });
    }

    if rows.is_empty() {
        return Err(CenteringError::EmptyData {
            reason: "No samples found in group table".to_string(),
        });
    }

    let sample_ids: Vec<String> = rows.iter().map(|r| r[0].to_string()).collect();
    let mut table = GroupTable::new(sample_ids)?;

    for (col, name) in header.iter().enumerate().skip(1) {
        let labels = rows
            .iter()
            .map(|r| {
                let token = &r[col];
                if is_missing(token) {
                    None
                } else {
                    Some(token.to_string())
                }
            })
            .collect();
        table.add_scheme(name, labels)?;
    }

    Ok(table)
}

/// Read per-gene quantiles
/// Expected format: header row, then `gene_id<delim>quantile` per line.
/// A missing quantile token gives an undefined entry for that gene.
pub fn read_gene_quantiles<P: AsRef<Path>>(path: P) -> Result<GeneQuantileMap> {
    let path = path.as_ref();
    let (header, rows) = read_table(path)?;
    if header.len() != 2 {
        return Err(CenteringError::InvalidInput {
            reason: format!("Quantile file must have 2 columns, found {}", header.len()),
        });
    }

    let mut quantiles = GeneQuantileMap::default();
    for record in &rows {
        let gene = &record[0];
        let previous = match parse_value(&record[1])? {
            Some(q) => quantiles.insert(gene, q),
            None => quantiles.insert_undefined(gene),
        };
        if previous.is_some() {
            return Err(CenteringError::Label {
                reason: format!("duplicate gene identifier '{}' in quantile file", gene),
            });
        }
    }

    if quantiles.is_empty() {
        return Err(CenteringError::EmptyData {
            reason: "No genes found in quantile file".to_string(),
        });
    }

    Ok(quantiles)
}

/// Read a quantile table written by [`write_quantile_table`]
pub fn read_quantile_table<P: AsRef<Path>>(path: P) -> Result<QuantileTable> {
    let path = path.as_ref();
    let (header, rows) = read_table(path)?;
    if header.len() < 2 {
        return Err(CenteringError::InvalidInput {
            reason: "Not enough columns in quantile table header".to_string(),
        });
    }

    let group_labels: Vec<String> = header.iter().skip(1).map(String::from).collect();
    let mut gene_ids = Vec::with_capacity(rows.len());
    let mut cells = Vec::with_capacity(rows.len() * group_labels.len());
    for record in &rows {
        gene_ids.push(record[0].to_string());
        for token in record.iter().skip(1) {
            cells.push(parse_value(token)?);
        }
    }

    let values = Array2::from_shape_vec((gene_ids.len(), group_labels.len()), cells).map_err(|e| {
        CenteringError::Shape {
            reason: e.to_string(),
        }
    })?;
    QuantileTable::new(values, gene_ids, group_labels)
}

/// Write an expression matrix as TSV, missing cells as `NA`
pub fn write_expression_matrix<P: AsRef<Path>>(path: P, matrix: &ExpressionMatrix) -> Result<()> {
    let mut writer = WriterBuilder::new().delimiter(b'\t').from_path(path)?;

    let mut header = vec!["gene_id".to_string()];
    header.extend(matrix.sample_ids().iter().cloned());
    writer.write_record(&header)?;

    for (i, gene_id) in matrix.gene_ids().iter().enumerate() {
        let mut record = vec![gene_id.clone()];
        record.extend(matrix.gene_row(i).iter().map(|v| format_value(*v)));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write a quantile table as TSV, missing cells as `NA`
pub fn write_quantile_table<P: AsRef<Path>>(path: P, table: &QuantileTable) -> Result<()> {
    let mut writer = WriterBuilder::new().delimiter(b'\t').from_path(path)?;

    let mut header = vec!["gene_id".to_string()];
    header.extend(table.group_labels().iter().cloned());
    writer.write_record(&header)?;

    for (gene_id, row) in table.gene_ids().iter().zip(table.values().outer_iter()) {
        let mut record = vec![gene_id.clone()];
        record.extend(row.iter().map(|v| format_value(*v)));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write a quantile table as JSON (`null` for missing cells)
pub fn write_quantile_table_json<P: AsRef<Path>>(path: P, table: &QuantileTable) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, table)?;
    Ok(())
}
