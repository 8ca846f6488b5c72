//! Prompt templates sent to the provider models

use deepresearch_core::ClarificationWithAnswers;
use std::fmt::Write;

/// Instructions given to the research model for every research call
pub const RESEARCH_INSTRUCTIONS: &str = "You are an expert research analyst. Investigate the topic thoroughly using the tools available to you.

Process:
1. Use search to find relevant sources.
2. Use fetch to read the most promising ones in full.
3. Synthesize what you found into a structured analysis.
4. Cite the sources that support each conclusion.

Prefer authoritative and recent sources, present competing views where they exist, \
include concrete data and examples, and organize the answer with headings and bullet points.";

pub fn clarification_prompt(query: &str) -> String {
    format!(
        r#"You are an expert research assistant. A user submitted this research query:

"{query}"

Identify ambiguities or missing context, then write 2-3 clarifying questions that would make the research more useful, and a clarified intent statement based on reasonable assumptions.

Consider the scope and depth needed, the audience or use case, time frame or geography, and preferred kinds of sources or evidence.

Respond with a JSON object of this shape:
{{
  "questions": [{{"question": "...", "context": "..."}}],
  "clarified_intent": "What the user most likely wants researched"
}}"#
    )
}

pub fn rewrite_prompt(original_query: &str, clarification: &ClarificationWithAnswers) -> String {
    let mut answers = String::new();
    let mut pairs = clarification.answered_pairs().peekable();
    if pairs.peek().is_some() {
        answers.push_str("\nThe user answered these clarification questions:\n");
        for (question, answer) in pairs {
            let _ = write!(answers, "Q: {}\nA: {}\n\n", question.question, answer);
        }
    }

    format!(
        r#"You are an expert prompt engineer for research tasks. Rewrite the user's query into a detailed prompt for a deep research model.

Original query: "{original_query}"
Clarified intent: "{intent}"
{answers}
The rewritten prompt should define the scope and objectives, say what kind of analysis is needed, give guidance on source types and evidence quality, and describe the structure of the expected output. Fold in any preferences the user expressed.

The research model will search for sources, fetch the promising ones and synthesize a comprehensive analysis.

Respond with a JSON object of this shape:
{{
  "original_query": "{original_query}",
  "rewritten_prompt": "The detailed research prompt",
  "reasoning": "How the clarification shaped the prompt"
}}"#,
        intent = clarification.clarified_intent,
    )
}
