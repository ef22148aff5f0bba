//! Knowledge base ⇄ Arrow `RecordBatch`, plus Parquet files behind the
//! `parquet` feature.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, LargeListArray, LargeStringArray, ListArray, ListBuilder, StringArray,
    StringBuilder,
};
use arrow::record_batch::RecordBatch;
use ayurdx_core::kb::{LIST_COLUMNS, knowledge_base_schema};
use ayurdx_core::{KnowledgeBase, KnowledgeRecord};

use crate::StoreError;

/// One row per disease, in key order.
pub fn to_record_batch(kb: &KnowledgeBase) -> Result<RecordBatch, StoreError> {
    let diseases: Vec<&str> = kb.iter().map(|(name, _)| name).collect();
    let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(diseases))];

    let fields: [fn(&KnowledgeRecord) -> &[String]; 5] = [
        |r| r.medicine_names.as_slice(),
        |r| r.precautions.as_slice(),
        |r| r.preparation_tips.as_slice(),
        |r| r.buy_links.as_slice(),
        |r| r.source.as_slice(),
    ];
    for field in fields {
        let mut builder = ListBuilder::new(StringBuilder::new());
        for (_, record) in kb.iter() {
            for value in field(record) {
                builder.values().append_value(value);
            }
            builder.append(true);
        }
        columns.push(Arc::new(builder.finish()));
    }

    Ok(RecordBatch::try_new(
        Arc::new(knowledge_base_schema()),
        columns,
    )?)
}

/// Rebuild a knowledge base from batches with the knowledge base schema.
/// A missing list column yields empty lists; a missing `disease` column is
/// an error.
pub fn from_batches(batches: &[RecordBatch]) -> Result<KnowledgeBase, StoreError> {
    let mut kb = KnowledgeBase::new();
    for batch in batches {
        let diseases = batch
            .column_by_name("disease")
            .ok_or_else(|| StoreError::Other("batch has no disease column".into()))?;
        let lists: Vec<Option<&ArrayRef>> = LIST_COLUMNS
            .iter()
            .map(|name| batch.column_by_name(name))
            .collect();

        for row in 0..batch.num_rows() {
            let Some(disease) = get_string(diseases.as_ref(), row) else {
                continue;
            };
            let mut values = lists.iter().map(|col| {
                col.and_then(|c| get_string_list(c.as_ref(), row))
                    .unwrap_or_default()
            });
            let record = KnowledgeRecord {
                medicine_names: values.next().unwrap_or_default(),
                precautions: values.next().unwrap_or_default(),
                preparation_tips: values.next().unwrap_or_default(),
                buy_links: values.next().unwrap_or_default(),
                source: values.next().unwrap_or_default(),
            };
            kb.insert(disease, record);
        }
    }
    Ok(kb)
}

#[cfg(feature = "parquet")]
pub fn write_parquet(kb: &KnowledgeBase, path: &std::path::Path) -> Result<usize, StoreError> {
    use parquet::arrow::ArrowWriter;

    let batch = to_record_batch(kb)?;
    let file = std::fs::File::create(path).map_err(|e| StoreError::io(path, e))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;
    tracing::info!(path = %path.display(), rows = batch.num_rows(), "wrote parquet");
    Ok(batch.num_rows())
}

#[cfg(feature = "parquet")]
pub fn read_parquet(path: &std::path::Path) -> Result<KnowledgeBase, StoreError> {
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    if !path.exists() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }
    let file = std::fs::File::open(path).map_err(|e| StoreError::io(path, e))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let batches = reader.collect::<Result<Vec<RecordBatch>, _>>()?;
    from_batches(&batches)
}

// ── Arrow extraction helpers ──

fn get_string(col: &dyn Array, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    col.as_any()
        .downcast_ref::<StringArray>()
        .map(|arr| arr.value(row).to_string())
        .or_else(|| {
            col.as_any()
                .downcast_ref::<LargeStringArray>()
                .map(|arr| arr.value(row).to_string())
        })
}

fn get_string_list(col: &dyn Array, row: usize) -> Option<Vec<String>> {
    if col.is_null(row) {
        return None;
    }
    if let Some(list) = col.as_any().downcast_ref::<ListArray>() {
        return Some(strings_from_array(list.value(row).as_ref()));
    }
    if let Some(list) = col.as_any().downcast_ref::<LargeListArray>() {
        return Some(strings_from_array(list.value(row).as_ref()));
    }
    None
}

fn strings_from_array(arr: &dyn Array) -> Vec<String> {
    if let Some(a) = arr.as_any().downcast_ref::<StringArray>() {
        a.iter().flatten().map(String::from).collect()
    } else if let Some(a) = arr.as_any().downcast_ref::<LargeStringArray>() {
        a.iter().flatten().map(String::from).collect()
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::{DataType, Field, Schema};

    fn sample() -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        let mut jaundice = KnowledgeRecord {
            medicine_names: vec!["Kutki".into(), "Punarnava".into()],
            precautions: vec!["Avoid alcohol and fried food.".into()],
            preparation_tips: vec![],
            source: vec!["Sushruta Samhita (PDF)".into()],
            ..Default::default()
        };
        jaundice.regenerate_links();
        kb.insert("Jaundice", jaundice);
        kb.insert("Acne", KnowledgeRecord::not_found());
        kb
    }

    #[test]
    fn batch_has_one_row_per_disease() {
        let batch = to_record_batch(&sample()).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 6);
        let diseases = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(diseases.value(0), "Acne");
        assert_eq!(diseases.value(1), "Jaundice");
        let medicines = batch
            .column_by_name("medicine_names")
            .unwrap()
            .as_any()
            .downcast_ref::<ListArray>()
            .unwrap();
        assert_eq!(medicines.value(0).len(), 0);
        assert_eq!(medicines.value(1).len(), 2);
    }

    #[test]
    fn batches_rebuild_the_knowledge_base() {
        let kb = sample();
        let batch = to_record_batch(&kb).unwrap();
        assert_eq!(from_batches(&[batch]).unwrap(), kb);
    }

    #[test]
    fn missing_list_column_reads_as_empty() {
        let schema = Schema::new(vec![Field::new("disease", DataType::Utf8, false)]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(StringArray::from(vec!["Malaria"]))],
        )
        .unwrap();
        let kb = from_batches(&[batch]).unwrap();
        assert_eq!(kb.get("Malaria"), Some(&KnowledgeRecord::default()));
    }

    #[test]
    fn missing_disease_column_is_an_error() {
        let schema = Schema::new(vec![Field::new("name", DataType::Utf8, false)]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(StringArray::from(vec!["Malaria"]))],
        )
        .unwrap();
        assert!(from_batches(&[batch]).is_err());
    }

    #[cfg(feature = "parquet")]
    #[test]
    fn parquet_file_round_trip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("kb.parquet");
        let kb = sample();
        assert_eq!(write_parquet(&kb, &path).unwrap(), 2);
        assert_eq!(read_parquet(&path).unwrap(), kb);
    }
}
