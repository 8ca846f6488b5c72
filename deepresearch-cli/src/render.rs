//! Plain-text rendering of catalogs and result views

use deepresearch_applications::{ApiInfo, DepthOptions, ModeInfo, ResultStatus, ResultView};
use deepresearch_core::ResearchMode;
use deepresearch_provider::ToolDefinition;
use std::collections::BTreeMap;
use std::fmt;

/// Sources listed per kind before the rest is summarized
const MAX_LISTED_SOURCES: usize = 10;

pub struct ResultReport<'a>(pub &'a ResultView);

impl fmt::Display for ResultReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;

        match view.status {
            ResultStatus::Completed => writeln!(f, "✅ Research completed in {}", view.total_duration)?,
            ResultStatus::NoResults => writeln!(
                f,
                "🤷 Research completed in {} but found no sources",
                view.total_duration
            )?,
            ResultStatus::Failed => writeln!(
                f,
                "❌ Research failed after {}: {}",
                view.total_duration,
                view.error_message.as_deref().unwrap_or("unknown error")
            )?,
        }

        if !view.analysis.trim().is_empty() {
            writeln!(f, "\n📝 Analysis\n")?;
            writeln!(f, "{}", view.analysis.trim_end())?;
        }

        if !view.timeline.is_empty() {
            writeln!(f, "\n🕒 Timeline")?;
            for entry in &view.timeline {
                write!(f, "  • {:<17} {:>10}", entry.label, entry.duration)?;
                if entry.summary.is_empty() {
                    writeln!(f)?;
                } else {
                    writeln!(f, "  {}", entry.summary)?;
                }
            }
        }

        let sources = &view.sources;
        if !sources.search.is_empty() || !sources.fetch.is_empty() {
            writeln!(f, "\n📚 Sources")?;
            for (i, source) in sources.search.iter().take(MAX_LISTED_SOURCES).enumerate() {
                writeln!(f, "  {}. {} [{}]", i + 1, source.title, source.relevance)?;
                if !source.url.is_empty() {
                    writeln!(f, "     {}", source.url)?;
                }
            }
            if sources.search.len() > MAX_LISTED_SOURCES {
                writeln!(
                    f,
                    "  ... and {} more search results",
                    sources.search.len() - MAX_LISTED_SOURCES
                )?;
            }
            for document in sources.fetch.iter().take(MAX_LISTED_SOURCES) {
                writeln!(
                    f,
                    "  📄 {} ({} chars)",
                    document.id, document.content_length
                )?;
            }
        }

        let detail = &view.detail;
        if !detail.clarification.is_empty() || detail.rewrite.is_some() {
            writeln!(f, "\n🔎 Clarification and rewrite")?;
            for pair in &detail.clarification {
                writeln!(f, "  Q: {}", pair.question)?;
                writeln!(f, "  A: {}", pair.answer)?;
            }
            if let Some(intent) = &detail.clarified_intent {
                writeln!(f, "  Intent: {}", intent)?;
            }
            if let Some(rewrite) = &detail.rewrite {
                writeln!(f, "  Prompt: {}", rewrite.rewritten_prompt)?;
                if !rewrite.reasoning.is_empty() {
                    writeln!(f, "  Why: {}", rewrite.reasoning)?;
                }
            }
        }

        Ok(())
    }
}

pub struct ModesReport<'a>(pub &'a BTreeMap<ResearchMode, ModeInfo>);

impl fmt::Display for ModesReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "🧭 Research modes")?;
        for (mode, info) in self.0 {
            writeln!(f, "\n  {} ({})", info.name, mode)?;
            writeln!(f, "    {}", info.description)?;
            let capabilities: Vec<&str> = info.capabilities.iter().map(String::as_str).collect();
            writeln!(f, "    capabilities: {}", capabilities.join(", "))?;
            writeln!(f, "    workflow: {}", info.workflow)?;
        }
        Ok(())
    }
}

pub struct DepthsReport<'a>(pub &'a DepthOptions);

impl fmt::Display for DepthsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📏 {}", self.0.description)?;
        for (depth, option) in &self.0.depth_options {
            let marker = if *depth == self.0.default { " (default)" } else { "" };
            writeln!(
                f,
                "  • {:<7} {:>3} tool calls  {}{}",
                depth.as_str(),
                option.max_tool_calls,
                option.description,
                marker
            )?;
        }
        Ok(())
    }
}

pub struct ToolsReport<'a>(pub &'a [ToolDefinition]);

impl fmt::Display for ToolsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "🛠️  Research tools")?;
        for tool in self.0 {
            writeln!(f, "  • {}: {}", tool.name(), tool.function.description)?;
        }
        writeln!(
            f,
            "\n  Deep research models only access the search and fetch tools"
        )
    }
}

/// One-line service banner
pub fn banner(info: &ApiInfo, mode_count: usize) -> String {
    format!("🔬 {} v{} ({} research modes)", info.message, info.version, mode_count)
}
