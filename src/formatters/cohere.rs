use serde::Serialize;

use super::{clean_content_for_answer, generate_questions, ExampleMetadata, SftFormatter};
use crate::record::CleanedRecord;

const PROMPT_CONTEXT: &str = "Sen uzman bir Türk rüya yorumcususun. Türk kültürü ve İslami geleneklere uygun rüya tabirleri yaparsın.";

/// One line of a Cohere prompt/completion file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohereExample {
    pub prompt: String,
    pub completion: String,
    pub metadata: ExampleMetadata,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CohereFormatter;

impl SftFormatter for CohereFormatter {
    type Example = CohereExample;

    fn format_name(&self) -> &'static str {
        "cohere"
    }

    fn format_single(&self, record: &CleanedRecord) -> Vec<CohereExample> {
        let answer = clean_content_for_answer(&record.cleaned_content);
        if answer.is_empty() {
            return Vec::new();
        }
        let metadata = ExampleMetadata::from_record(record);
        generate_questions(record)
            .into_iter()
            .map(|question| CohereExample {
                prompt: format!("{PROMPT_CONTEXT}\n\nSoru: {question}\n\nCevap:"),
                completion: answer.clone(),
                metadata: metadata.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatters::tests::record;

    #[test]
    fn prompt_completion_layout() {
        let content = "Rüyada yılan görmek düşmana delalet eder, dikkatli olmak gerekir.";
        let examples = CohereFormatter.format_single(&record("yılan", "Rüyada Yılan Görmek", content, &[]));
        assert_eq!(examples.len(), 4);
        let first = &examples[0];
        assert!(first.prompt.starts_with("Sen uzman bir Türk rüya yorumcususun."));
        assert!(first
            .prompt
            .ends_with("Soru: Rüyamda yılan gördüm, ne anlama gelir?\n\nCevap:"));
        assert_eq!(first.completion, content);
        assert_eq!(first.metadata.dream_symbol, "yılan");
    }

    #[test]
    fn same_example_count_as_openai() {
        use crate::formatters::OpenAiFormatter;
        let content = "Rüyada yılan görmek düşmana delalet eder, dikkatli olmak gerekir.";
        let records = vec![
            record("yılan", "Rüyada Yılan Görmek", content, &["yılan", "zehir"]),
            record("", "Su", content, &["su"]),
            record("at", "At", "kısa", &[]),
        ];
        assert_eq!(
            CohereFormatter.format_batch(&records).len(),
            OpenAiFormatter.format_batch(&records).len()
        );
    }
}
