// src/export/mod.rs

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{fs::File, path::Path, sync::Arc};
use tracing::info;

use crate::parse::Dataset;

/// Columns numeric in every record become `Float64`; the rest become `Utf8`,
/// with numbers rendered through `Display`. Column order follows the header.
pub fn to_record_batch(dataset: &Dataset) -> Result<RecordBatch> {
    let numeric = dataset.numeric_columns_strict();

    let mut fields = Vec::with_capacity(dataset.columns().len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(dataset.columns().len());
    for col in dataset.columns() {
        if numeric.contains(col) {
            let values: Float64Array = dataset.records().iter().map(|r| r.number(col)).collect();
            fields.push(Field::new(col, DataType::Float64, false));
            arrays.push(Arc::new(values));
        } else {
            let values: StringArray = dataset
                .records()
                .iter()
                .map(|r| r.get(col).map(|v| v.to_string()))
                .collect();
            fields.push(Field::new(col, DataType::Utf8, true));
            arrays.push(Arc::new(values));
        }
    }

    // explicit row count so a header-less dataset still yields a batch
    let options = RecordBatchOptions::new().with_row_count(Some(dataset.len()));
    RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)
        .context("building record batch from dataset")
}

/// Write `dataset` as a single-row-group Parquet file at `path`.
#[tracing::instrument(level = "info", skip(dataset, path), fields(path = %path.as_ref().display()))]
pub fn write_parquet<P: AsRef<Path>>(dataset: &Dataset, path: P) -> Result<()> {
    let path = path.as_ref();
    let batch = to_record_batch(dataset)?;

    let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .context("creating Arrow writer")?;
    writer.write(&batch).context("writing dataset batch")?;
    writer.close().context("closing parquet writer")?;

    info!(rows = batch.num_rows(), cols = batch.num_columns(), "wrote parquet");
    Ok(())
}
