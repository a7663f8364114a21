//! Persona prompt
//!
//! Builds the single system message that frames every turn: who the agent
//! is, how it talks, what it knows, and which tool answers which kind of
//! question. The tool rules here are advisory; the orchestrator enforces the
//! one-tool limit regardless of what the model does.

use std::fmt::Write as _;

use crate::profile::Profile;
use crate::tools::{IntentRoute, INTENT_ROUTES};
use crate::types::ChatMessage;

/// Builder for the persona's system message
pub struct PersonaPromptBuilder<'a> {
    profile: &'a Profile,
    routes: Vec<(String, String)>,
}

impl<'a> PersonaPromptBuilder<'a> {
    pub fn new(profile: &'a Profile) -> Self {
        Self {
            profile,
            routes: Vec::new(),
        }
    }

    /// Add an intent → tool routing line
    pub fn with_route(mut self, intent: impl Into<String>, tool: impl Into<String>) -> Self {
        self.routes.push((intent.into(), tool.into()));
        self
    }

    /// Add several routes, keeping their order
    pub fn with_routes<'r>(mut self, routes: impl IntoIterator<Item = &'r IntentRoute>) -> Self {
        for route in routes {
            self = self.with_route(route.intent, route.tool);
        }
        self
    }

    /// Render the prompt text
    pub fn render(&self) -> String {
        let p = self.profile;
        let id = &p.identity;
        let mut out = String::new();

        // `write!` into a String cannot fail
        let _ = writeln!(out, "# Character: {}\n", id.name);
        let _ = writeln!(out, "Act as me, {}, a {}. {}", id.name, id.headline, id.role_play);
        let _ = writeln!(
            out,
            "If someone asks a question outside my scope, you can say: \"{}\".\n",
            id.out_of_scope_reply
        );

        section(&mut out, "## Tone & Style", &p.tone);
        section(&mut out, "## Response Structure", &p.response_style);

        out.push_str("## Background Information\n\n");
        section(&mut out, "### About Me", &id.facts);

        if !p.projects.is_empty() {
            out.push_str("### Key Projects\n");
            for project in &p.projects {
                let _ = writeln!(out, "- **{}** ({}, {})", project.title, project.category, project.date);
            }
            out.push('\n');
        }

        if !p.skills.is_empty() {
            out.push_str("### Skills\n");
            for group in &p.skills {
                let _ = writeln!(out, "**{}** ({})", group.category, group.tier.label());
                let _ = writeln!(out, "- {}", group.chips.join(", "));
            }
            out.push('\n');
        }

        section(&mut out, "### Personal", &p.personal);

        out.push_str("## Tool Usage Guidelines\n");
        out.push_str("- Use AT MOST ONE TOOL per response\n");
        out.push_str("- Don't repeat what the tool outputs, just show it\n");
        for (intent, tool) in &self.routes {
            let _ = writeln!(out, "- For {}: use **{}**", intent, tool);
        }

        out
    }

    /// Build the system message
    pub fn build(&self) -> ChatMessage {
        ChatMessage::system(self.render())
    }
}

fn section(out: &mut String, heading: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    out.push_str(heading);
    out.push('\n');
    for line in lines {
        let _ = writeln!(out, "- {}", line);
    }
    out.push('\n');
}

/// Persona message for `profile` with the standard portfolio routing
pub fn persona_prompt(profile: &Profile) -> ChatMessage {
    PersonaPromptBuilder::new(profile)
        .with_routes(INTENT_ROUTES)
        .build()
}
