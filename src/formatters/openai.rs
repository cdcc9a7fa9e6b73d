use serde::Serialize;

use super::{clean_content_for_answer, generate_questions, ExampleMetadata, SftFormatter, SYSTEM_MESSAGE};
use crate::record::CleanedRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// One line of an OpenAI chat fine-tuning file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenAiExample {
    pub messages: Vec<Message>,
    pub metadata: ExampleMetadata,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OpenAiFormatter;

impl SftFormatter for OpenAiFormatter {
    type Example = OpenAiExample;

    fn format_name(&self) -> &'static str {
        "openai"
    }

    fn format_single(&self, record: &CleanedRecord) -> Vec<OpenAiExample> {
        let answer = clean_content_for_answer(&record.cleaned_content);
        if answer.is_empty() {
            return Vec::new();
        }
        let metadata = ExampleMetadata::from_record(record);
        generate_questions(record)
            .into_iter()
            .map(|question| OpenAiExample {
                messages: vec![
                    Message {
                        role: Role::System,
                        content: SYSTEM_MESSAGE.to_string(),
                    },
                    Message {
                        role: Role::User,
                        content: question,
                    },
                    Message {
                        role: Role::Assistant,
                        content: answer.clone(),
                    },
                ],
                metadata: metadata.clone(),
            })
            .collect()
    }
}
