//! Display shaping for research results and the clarification form

use crate::research::WorkflowState;
use deepresearch_core::{
    validation_error, ClarificationAnswer, ClarificationQuestion, DeepResearchResult, Payload,
    ResearchResult, ResearchStep, StepType,
};
use serde::{Deserialize, Serialize};

/// Characters of fetched content shown in a source preview
pub const PREVIEW_CHARS: usize = 500;

/// `850 ms`, `1.2 s`, `2 min 5 s`
pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        return format!("{} ms", ms);
    }

    // Seconds are shown to the nearest tenth, so round before picking the unit
    let tenths = (ms + 50) / 100;
    if tenths < 600 {
        format!("{}.{} s", tenths / 10, tenths % 10)
    } else {
        let seconds = ms.max(60_000) / 1000;
        format!("{} min {} s", seconds / 60, seconds % 60)
    }
}

/// `0.873` -> `87%`; absent scores render as `n/a`
pub fn format_relevance(score: Option<f64>) -> String {
    match score {
        Some(score) => format!("{:.0}%", (score * 100.0).round()),
        None => "n/a".to_string(),
    }
}

/// First `max_chars` characters, with an ellipsis when truncated
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.char_indices();
    match chars.nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Completed,
    /// Succeeded but found no sources
    NoResults,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TimelineEntry {
    pub label: String,
    pub step_type: StepType,
    pub timestamp: String,
    pub duration: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SearchSourceView {
    pub id: String,
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub relevance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FetchSourceView {
    pub id: String,
    pub preview: String,
    pub content_length: usize,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub metadata: Payload,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SourcesView {
    pub search: Vec<SearchSourceView>,
    pub fetch: Vec<FetchSourceView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct QuestionAnswerView {
    pub question: String,
    pub context: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RewriteView {
    pub original_query: String,
    pub rewritten_prompt: String,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DetailView {
    pub clarification: Vec<QuestionAnswerView>,
    pub clarified_intent: Option<String>,
    pub rewrite: Option<RewriteView>,
}

/// The four views of a research result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ResultView {
    pub status: ResultStatus,
    pub analysis: String,
    pub error_message: Option<String>,
    pub timeline: Vec<TimelineEntry>,
    pub sources: SourcesView,
    pub detail: DetailView,
    pub total_duration: String,
}

fn step_label(step_type: StepType) -> &'static str {
    match step_type {
        StepType::Clarification => "Clarification",
        StepType::PromptRewriting => "Prompt rewriting",
        StepType::Search => "Search",
        StepType::Fetch => "Fetch",
        StepType::Analysis => "Analysis",
    }
}

fn text_field<'a>(payload: &'a Payload, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(|v| v.as_str()).filter(|s| !s.is_empty())
}

fn count_field(payload: &Payload, key: &str) -> Option<u64> {
    payload.get(key).and_then(|v| v.as_u64())
}

fn step_summary(step: &ResearchStep) -> String {
    let input = &step.input_data;
    let output = &step.output_data;
    match step.step_type {
        StepType::Clarification => {
            let questions = output
                .get("questions")
                .and_then(|q| q.as_array())
                .map(|q| q.len())
                .unwrap_or(0);
            format!("{} clarifying question(s)", questions)
        }
        StepType::PromptRewriting => text_field(output, "rewritten_prompt")
            .map(|p| preview(p, 120))
            .unwrap_or_default(),
        StepType::Search => {
            let query = text_field(input, "query").unwrap_or("(no query)");
            match count_field(output, "results_count") {
                Some(count) => format!("{} ({} results)", query, count),
                None => query.to_string(),
            }
        }
        StepType::Fetch => {
            let id = text_field(input, "id").unwrap_or("(unknown document)");
            match count_field(output, "content_length") {
                Some(length) => format!("{} ({} chars)", id, length),
                None => id.to_string(),
            }
        }
        StepType::Analysis => match count_field(output, "analysis_length") {
            Some(length) => format!("{} characters of analysis", length),
            None => String::new(),
        },
    }
}

impl ResultView {
    pub fn from_result(result: &ResearchResult) -> Self {
        let status = if !result.success {
            ResultStatus::Failed
        } else if result.has_no_sources() {
            ResultStatus::NoResults
        } else {
            ResultStatus::Completed
        };

        let timeline = result
            .steps
            .iter()
            .map(|step| TimelineEntry {
                label: step_label(step.step_type).to_string(),
                step_type: step.step_type,
                timestamp: step.timestamp.clone(),
                duration: format_duration(step.duration_ms),
                summary: step_summary(step),
            })
            .collect();

        let sources = SourcesView {
            search: result
                .search_results
                .iter()
                .map(|r| SearchSourceView {
                    id: r.id.clone(),
                    title: r.title.clone(),
                    url: r.url.clone(),
                    snippet: r.snippet.clone(),
                    relevance: format_relevance(r.relevance_score),
                })
                .collect(),
            fetch: result
                .fetch_results
                .iter()
                .map(|f| FetchSourceView {
                    id: f.id.clone(),
                    preview: preview(&f.content, PREVIEW_CHARS),
                    content_length: f.content.chars().count(),
                    metadata: f.metadata.clone(),
                })
                .collect(),
        };

        let detail = DetailView {
            clarification: result
                .clarification
                .iter()
                .flat_map(|c| c.answered_pairs())
                .map(|(question, answer)| QuestionAnswerView {
                    question: question.question.clone(),
                    context: question.context.clone(),
                    answer: answer.to_string(),
                })
                .collect(),
            clarified_intent: result
                .clarification
                .as_ref()
                .map(|c| c.clarified_intent.clone()),
            rewrite: result.prompt_rewrite.as_ref().map(|r| RewriteView {
                original_query: r.original_query.clone(),
                rewritten_prompt: r.rewritten_prompt.clone(),
                reasoning: r.reasoning.clone(),
            }),
        };

        Self {
            status,
            analysis: result.final_analysis.clone(),
            error_message: result.error_message.clone(),
            timeline,
            sources,
            detail,
            total_duration: format_duration(result.total_duration_ms),
        }
    }
}

impl From<&ResearchResult> for ResultView {
    fn from(result: &ResearchResult) -> Self {
        Self::from_result(result)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FormField {
    pub question_index: usize,
    pub question: String,
    pub context: String,
    pub answer: String,
}

/// One answer field per clarification question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ClarificationForm {
    pub fields: Vec<FormField>,
}

impl ClarificationForm {
    pub fn new(questions: &[ClarificationQuestion]) -> Self {
        Self {
            fields: questions
                .iter()
                .enumerate()
                .map(|(index, q)| FormField {
                    question_index: index,
                    question: q.question.clone(),
                    context: q.context.clone(),
                    answer: String::new(),
                })
                .collect(),
        }
    }

    /// Form for a workflow suspended on clarification, if it is
    pub fn for_state(state: &WorkflowState) -> Option<Self> {
        let questions = state.pending_questions();
        (!questions.is_empty()).then(|| Self::new(questions))
    }

    pub fn set_answer(&mut self, question_index: usize, answer: impl Into<String>) -> DeepResearchResult<()> {
        let field = self.fields.get_mut(question_index).ok_or_else(|| {
            validation_error!(
                format!("No question at index {}", question_index),
                "question_index",
                "presenter"
            )
        })?;
        field.answer = answer.into();
        Ok(())
    }

    /// Submit is offered only when every field has a non-blank answer
    pub fn can_submit(&self) -> bool {
        self.fields.iter().all(|f| !f.answer.trim().is_empty())
    }

    pub fn answers(&self) -> Vec<ClarificationAnswer> {
        self.fields
            .iter()
            .map(|f| ClarificationAnswer {
                question_index: f.question_index,
                answer: f.answer.trim().to_string(),
            })
            .collect()
    }

    pub fn submit(&self) -> DeepResearchResult<Vec<ClarificationAnswer>> {
        if !self.can_submit() {
            return Err(validation_error!(
                "Every clarification question needs an answer",
                "answers",
                "presenter"
            ));
        }
        Ok(self.answers())
    }
}
