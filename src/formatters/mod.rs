//! Fine-tuning exports.
//!
//! Each kept record becomes up to four question/answer examples. The
//! questions come from Turkish templates around the dream symbol, the answer
//! is the record's cleaned content.

pub mod cohere;
pub mod openai;

pub use cohere::{CohereExample, CohereFormatter};
pub use openai::{OpenAiExample, OpenAiFormatter};

use serde::Serialize;
use tracing::{debug, info};

use crate::record::CleanedRecord;
use crate::utils::lowercase_tr;

pub const SYSTEM_MESSAGE: &str = "Sen uzman bir Türk rüya yorumcususun. Türk kültürü ve İslami geleneklere uygun olarak rüya tabirlerini açıklarsın. Rüyaları yorumlarken:

1. Türk halk kültürü ve İslami kaynaklara dayanarak açıklama yap
2. Hem olumlu hem olumsuz anlamları belirt
3. Kültürel bağlamı ve geleneksel yorumları dahil et
4. Açıklayıcı ve anlayışlı bir dil kullan
5. Rüya sahibinin durumuna göre farklı yorumlar olabileceğini belirt";

const QUESTION_TEMPLATES: [&str; 10] = [
    "Rüyamda {symbol} gördüm, ne anlama gelir?",
    "Rüyada {symbol} görmek neye işaret eder?",
    "{symbol} rüyası nasıl yorumlanır?",
    "Rüyada {symbol} görmenin anlamı nedir?",
    "{symbol} rüyasının tabiri nedir?",
    "Rüyamda {symbol} vardı, bu neyi ifade eder?",
    "Rüyada {symbol} görmek iyi mi kötü mü?",
    "{symbol} ile ilgili rüyamın açıklaması nedir?",
    "Rüyada {symbol} görmek hakkında ne dersiniz?",
    "{symbol} rüyasının İslami yorumu nedir?",
];

const SYMBOL_TEMPLATES: usize = 6;
const TAG_QUESTIONS: usize = 2;
const MAX_QUESTIONS: usize = 4;
const MAX_ANSWER_PARAGRAPHS: usize = 4;
const MIN_PARAGRAPH_CHARS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExampleMetadata {
    pub dream_symbol: String,
    pub original_id: String,
    pub source_url: String,
}

impl ExampleMetadata {
    pub fn from_record(record: &CleanedRecord) -> Self {
        ExampleMetadata {
            dream_symbol: record.dream_symbol.clone(),
            original_id: record.original_id.clone(),
            source_url: record.url.clone(),
        }
    }
}

pub trait SftFormatter {
    type Example: Serialize;

    fn format_name(&self) -> &'static str;

    /// Training examples for one record; empty when it has no usable answer.
    fn format_single(&self, record: &CleanedRecord) -> Vec<Self::Example>;

    fn format_batch(&self, records: &[CleanedRecord]) -> Vec<Self::Example> {
        info!(format = self.format_name(), records = records.len(), "formatting");
        let mut out = Vec::with_capacity(records.len() * MAX_QUESTIONS);
        for (i, record) in records.iter().enumerate() {
            if i % 50 == 0 {
                debug!(format = self.format_name(), "record {}/{}", i + 1, records.len());
            }
            out.extend(self.format_single(record));
        }
        info!(format = self.format_name(), examples = out.len(), "formatting complete");
        out
    }
}

/// Up to four user questions for a record.
pub fn generate_questions(record: &CleanedRecord) -> Vec<String> {
    let symbol = record.dream_symbol.as_str();
    let title = record.title.trim();
    let mut questions = Vec::new();

    if !symbol.is_empty() {
        questions.extend(
            QUESTION_TEMPLATES[..SYMBOL_TEMPLATES]
                .iter()
                .map(|t| t.replace("{symbol}", symbol)),
        );
        if !title.is_empty() && !lowercase_tr(title).contains(&lowercase_tr(symbol)) {
            questions.push(format!("{title} hakkında ne söyleyebilirsiniz?"));
        }
    } else if !title.is_empty() {
        questions.push(format!("{title} ne anlama gelir?"));
        questions.push(format!("{title} nasıl yorumlanır?"));
        questions.push(format!("{title} hakkında bilgi verir misiniz?"));
    }

    for tag in record.tags.iter().take(TAG_QUESTIONS) {
        if !tag.is_empty() && tag != symbol {
            questions.push(format!("Rüyada {tag} görmek neyi ifade eder?"));
        }
    }

    questions.truncate(MAX_QUESTIONS);
    questions
}

/// The answer text: first paragraphs longer than 30 chars, blank-line separated.
pub fn clean_content_for_answer(content: &str) -> String {
    content
        .lines()
        .map(str::trim)
        .filter(|p| p.chars().count() > MIN_PARAGRAPH_CHARS)
        .take(MAX_ANSWER_PARAGRAPHS)
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n\n")
}
