use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use tracing::{debug, info, warn};

use super::parallel::{ChunkOutput, ChunkWorker};
use super::stats::{Mode, ProcessingStats};
use crate::cleaner;
use crate::config::PipelineConfig;
use crate::error::{RecordError, Result};
use crate::record::{CleanedRecord, RawRecord};
use crate::scoring::Evaluator;
use crate::utils::panic_message;

/// Cleans and scores records one after another on the calling thread.
/// Also the per-chunk worker of the parallel path.
#[derive(Debug, Clone, Copy)]
pub struct SequentialProcessor {
    evaluator: Evaluator,
}

impl SequentialProcessor {
    pub fn new(config: &PipelineConfig) -> Self {
        SequentialProcessor {
            evaluator: Evaluator::new(config),
        }
    }

    pub fn process_batch(&self, records: &[RawRecord]) -> (Vec<CleanedRecord>, ProcessingStats) {
        let start = Instant::now();
        let out = self.process_range(records, 0);
        let stats = ProcessingStats {
            input: records.len(),
            output: out.records.len(),
            rejected: out.rejected,
            record_errors: out.record_errors,
            elapsed: start.elapsed(),
            mode: Mode::Sequential,
            parallel: None,
        };
        info!(
            input = stats.input,
            kept = stats.output,
            rejected = stats.rejected,
            "sequential batch done"
        );
        (out.records, stats)
    }

    /// Clean, evaluate and keep-or-drop a single record. `index` is its
    /// position in the full input and stands in for a missing id.
    ///
    /// A panic anywhere in the step comes back as `RecordError::Panicked`.
    pub fn process_record(
        &self,
        index: usize,
        record: &RawRecord,
    ) -> std::result::Result<Option<CleanedRecord>, RecordError> {
        contain(index, || self.clean_and_score(index, record))
    }

    fn clean_and_score(&self, index: usize, record: &RawRecord) -> Option<CleanedRecord> {
        let fields = cleaner::clean(record);
        let evaluation = self.evaluator.evaluate(&fields);
        debug!(
            index,
            score = evaluation.score,
            cultural = evaluation.cultural_indicators,
            issues = ?evaluation.issues,
            "evaluated"
        );
        if !evaluation.accepted {
            return None;
        }
        let id = record.id.clone().unwrap_or_else(|| index.to_string());
        Some(CleanedRecord::from_fields(
            id,
            record.publish_date.clone().unwrap_or_default(),
            fields,
            evaluation.score,
            evaluation.cultural_indicators,
        ))
    }

    fn process_range(&self, records: &[RawRecord], offset: usize) -> ChunkOutput {
        process_each(records, offset, |index, record| self.clean_and_score(index, record))
    }
}

fn contain<F>(index: usize, step: F) -> std::result::Result<Option<CleanedRecord>, RecordError>
where
    F: FnOnce() -> Option<CleanedRecord>,
{
    panic::catch_unwind(AssertUnwindSafe(step)).map_err(|payload| RecordError::Panicked {
        index,
        message: panic_message(payload.as_ref()),
    })
}

/// Run `step` on every record; a record whose step panics is logged,
/// counted and rejected while the rest of the range carries on.
fn process_each<F>(records: &[RawRecord], offset: usize, step: F) -> ChunkOutput
where
    F: Fn(usize, &RawRecord) -> Option<CleanedRecord>,
{
    let mut out = ChunkOutput::default();
    for (i, record) in records.iter().enumerate() {
        let index = offset + i;
        match contain(index, || step(index, record)) {
            Ok(Some(cleaned)) => out.records.push(cleaned),
            Ok(None) => out.rejected += 1,
            Err(e) => {
                warn!(%e, "record skipped");
                out.record_errors += 1;
                out.rejected += 1;
            }
        }
    }
    out
}

impl ChunkWorker for SequentialProcessor {
    fn process_chunk(&self, records: &[RawRecord], offset: usize) -> Result<ChunkOutput> {
        Ok(self.process_range(records, offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "<p>Rüyada fare görmek, tabire göre bereket ve rızk işaretidir. \
        Kadim kaynaklarda bu konu geniş biçimde anlatılmıştır ve okuyucular merakla takip eder.</p>";

    fn config() -> PipelineConfig {
        PipelineConfig::default()
    }

    #[test]
    fn keeps_good_and_drops_short_in_order() {
        let records = vec![
            RawRecord::new("Rüyada Fare Görmek", GOOD, "u0").with_id("a"),
            RawRecord::new("Kısa", "<p>Kısa bir metin burada</p>", "u1").with_id("b"),
            RawRecord::new("Rüyada Kedi Görmek", GOOD, "u2").with_id("c"),
            RawRecord::new("Boş", "<script>x()</script>", "u3").with_id("d"),
        ];
        let (out, stats) = SequentialProcessor::new(&config()).process_batch(&records);
        let ids: Vec<_> = out.iter().map(|r| r.original_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(out[1].dream_symbol, "kedi");
        assert_eq!(stats.input, 4);
        assert_eq!(stats.output, 2);
        assert_eq!(stats.rejected, 2);
        assert_eq!(stats.record_errors, 0);
        assert_eq!(stats.mode, Mode::Sequential);
    }

    #[test]
    fn missing_id_falls_back_to_index() {
        let records = vec![RawRecord::new("Rüyada Fare Görmek", GOOD, "u")];
        let p = SequentialProcessor::new(&config());
        let (out, _) = p.process_batch(&records);
        assert_eq!(out[0].original_id, "0");

        let chunk = p.process_chunk(&records, 40).unwrap();
        assert_eq!(chunk.records[0].original_id, "40");
    }

    #[test]
    fn every_kept_record_meets_threshold() {
        let records: Vec<_> = (0..20)
            .map(|i| {
                let content = if i % 3 == 0 { "<p>çok kısa</p>" } else { GOOD };
                RawRecord::new("Rüyada Su Görmek", content, format!("u{i}"))
            })
            .collect();
        let (out, stats) = SequentialProcessor::new(&config()).process_batch(&records);
        assert!(out.iter().all(|r| r.quality_score >= 70));
        assert_eq!(stats.output + stats.rejected, stats.input);
    }

    #[test]
    fn panicking_record_is_contained() {
        let records = vec![
            RawRecord::new("Rüyada Fare Görmek", GOOD, "u0").with_id("a"),
            RawRecord::new("Rüyada Kedi Görmek", GOOD, "u1").with_id("b"),
            RawRecord::new("Rüyada Su Görmek", GOOD, "u2").with_id("c"),
        ];
        let p = SequentialProcessor::new(&config());
        let out = process_each(&records, 10, |index, record| {
            if index == 11 {
                panic!("bozuk kayıt");
            }
            p.clean_and_score(index, record)
        });
        let ids: Vec<_> = out.records.iter().map(|r| r.original_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(out.record_errors, 1);
        assert_eq!(out.rejected, 1);

        let err = contain(11, || panic!("bozuk kayıt")).unwrap_err();
        assert!(matches!(
            err,
            RecordError::Panicked { index: 11, ref message } if message == "bozuk kayıt"
        ));
    }

    #[test]
    fn empty_batch() {
        let (out, stats) = SequentialProcessor::new(&config()).process_batch(&[]);
        assert!(out.is_empty());
        assert_eq!(stats.input, 0);
        assert_eq!(stats.rejected, 0);
    }
}
