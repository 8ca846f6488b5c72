//! Terminal rendition of the clarification form

use deepresearch_applications::ClarificationForm;
use deepresearch_core::{ClarificationAnswer, DeepResearchResult};
use std::io::{BufRead, Write};

/// Typing this at any prompt skips clarification
pub const SKIP_COMMAND: &str = ":skip";

#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    Submit(Vec<ClarificationAnswer>),
    Skip,
}

/// Ask each question in turn until every field has an answer.
///
/// Blank lines re-prompt. End of input is treated as a skip.
pub fn collect_answers<R: BufRead, W: Write>(
    form: &mut ClarificationForm,
    input: &mut R,
    output: &mut W,
) -> DeepResearchResult<FormOutcome> {
    writeln!(
        output,
        "\n❓ A few questions to focus the research (type {} to skip):",
        SKIP_COMMAND
    )?;

    for index in 0..form.fields.len() {
        let (question, context) = {
            let field = &form.fields[index];
            (field.question.clone(), field.context.clone())
        };

        writeln!(output, "\n  {}. {}", index + 1, question)?;
        if !context.trim().is_empty() {
            writeln!(output, "     ({})", context)?;
        }

        loop {
            write!(output, "  > ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                return Ok(FormOutcome::Skip);
            }

            let answer = line.trim();
            if answer == SKIP_COMMAND {
                return Ok(FormOutcome::Skip);
            }
            if answer.is_empty() {
                writeln!(output, "  ⚠️  An answer is required")?;
                continue;
            }

            form.set_answer(index, answer)?;
            break;
        }
    }

    Ok(FormOutcome::Submit(form.submit()?))
}
