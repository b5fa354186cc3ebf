//! Partitions extracted records into fixed-size inference batches.

use crate::models::TagRecord;

/// Contiguous, order-preserving slices of `chunk_size` records; the final
/// slice may be shorter. Index `i` of a batch pairs positionally with
/// index `i` of the parsed model output. `chunk_size` is validated as
/// positive at config load.
pub fn plan(records: &[TagRecord], chunk_size: usize) -> impl Iterator<Item = &[TagRecord]> {
    records.chunks(chunk_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TagValue;

    fn record(name: &str) -> TagRecord {
        TagRecord {
            filename: name.to_string(),
            cleaned_filename: name.to_string(),
            metadata: vec![("artist".into(), TagValue::missing())],
        }
    }

    #[test]
    fn concatenated_batches_reproduce_input() {
        let records: Vec<_> = (0..7).map(|i| record(&format!("{i}.mp3"))).collect();
        for chunk_size in 1..=8 {
            let rebuilt: Vec<_> = plan(&records, chunk_size)
                .flat_map(|b| b.iter().map(|r| r.filename.clone()))
                .collect();
            let original: Vec<_> = records.iter().map(|r| r.filename.clone()).collect();
            assert_eq!(rebuilt, original, "chunk_size {chunk_size}");
        }
    }

    #[test]
    fn all_but_last_batch_are_full() {
        let records: Vec<_> = (0..7).map(|i| record(&format!("{i}.mp3"))).collect();
        let batches: Vec<_> = plan(&records, 3).collect();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 3);
        assert_eq!(batches[1].len(), 3);
        assert_eq!(batches[2].len(), 1);
    }

    #[test]
    fn empty_input_yields_no_batches() {
        assert_eq!(plan(&[], 5).count(), 0);
    }
}
