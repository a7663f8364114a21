//! The portfolio tool catalog
//!
//! Seven information tools, each a pure mapping from validated arguments to
//! content rendered from the [`Profile`]. Structured tools return JSON the
//! consumer renders as a card; markdown tools return ready-to-show text.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::logging::Logger;
use crate::profile::Profile;
use crate::types::ToolResult;

use super::error::ToolError;
use super::registry::{ToolDefinition, ToolExecutor, ToolRegistry};
use super::schema::{ParamKind, ParamSpec, ParameterSchema};
use super::validator::ToolArguments;

pub const GET_PROJECTS: &str = "getProjects";
pub const GET_RESUME: &str = "getResume";
pub const GET_CONTACT: &str = "getContact";
pub const GET_PRESENTATION: &str = "getPresentation";
pub const GET_SKILLS: &str = "getSkills";
pub const GET_INTERNSHIP: &str = "getInternship";
pub const GET_CRAZY: &str = "getCrazy";

/// One row of the intent → tool routing table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntentRoute {
    /// What the visitor is asking about, as phrased in the persona prompt
    pub intent: &'static str,
    /// Lowercase words that signal this intent in a visitor message
    pub keywords: &'static [&'static str],
    /// Tool that answers it
    pub tool: &'static str,
}

/// Routing table shared by the persona prompt and the offline mock model
pub const INTENT_ROUTES: &[IntentRoute] = &[
    IntentRoute {
        intent: "projects",
        keywords: &["project", "built", "portfolio", "aiva", "notebuddy", "robot"],
        tool: GET_PROJECTS,
    },
    IntentRoute {
        intent: "resume",
        keywords: &["resume", "résumé", "cv"],
        tool: GET_RESUME,
    },
    IntentRoute {
        intent: "contact info",
        keywords: &["contact", "email", "reach", "linkedin"],
        tool: GET_CONTACT,
    },
    IntentRoute {
        intent: "detailed background",
        keywords: &["who are you", "about yourself", "introduce", "background"],
        tool: GET_PRESENTATION,
    },
    IntentRoute {
        intent: "skills",
        keywords: &["skill", "stack", "good at", "languages"],
        tool: GET_SKILLS,
    },
    IntentRoute {
        intent: "internship, career or tutoring in a career context",
        keywords: &["internship", "intern", "hire", "hiring", "job", "career", "available"],
        tool: GET_INTERNSHIP,
    },
    IntentRoute {
        intent: "fun and hobbies",
        keywords: &["fun", "hobby", "hobbies", "game", "gaming", "esports", "league"],
        tool: GET_CRAZY,
    },
];

/// `getProjects`: the project list, optionally filtered by category
pub struct ProjectsTool {
    profile: Arc<Profile>,
}

impl ProjectsTool {
    pub fn new(profile: Arc<Profile>) -> Self {
        Self { profile }
    }

    /// Schema built from the profile: the category enum lists its categories
    pub fn schema(&self) -> ParameterSchema {
        let categories = self.profile.project_categories();
        let mut schema = ParameterSchema::empty();
        if !categories.is_empty() {
            schema = schema.with(ParamSpec::new(
                "category",
                "Only return projects in this category",
                ParamKind::one_of(categories),
            ));
        }
        let max = self.profile.projects.len().max(1) as f64;
        schema.with(
            ParamSpec::new("limit", "Maximum number of projects to return", ParamKind::integer())
                .with_range(Some(1.0), Some(max))
                .coerce_from_string(),
        )
    }
}

#[async_trait]
impl ToolExecutor for ProjectsTool {
    async fn execute(&self, args: &ToolArguments) -> Result<ToolResult, String> {
        let category = args.get_str("category");
        let limit = args.get_i64("limit").map(|n| n as usize).unwrap_or(usize::MAX);

        let projects: Vec<_> = self
            .profile
            .projects
            .iter()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .take(limit)
            .collect();

        Ok(ToolResult::structured(json!({
            "projects": projects,
            "total": self.profile.projects.len(),
        })))
    }
}

/// `getResume`: résumé card with download link
pub struct ResumeTool {
    profile: Arc<Profile>,
}

#[async_trait]
impl ToolExecutor for ResumeTool {
    async fn execute(&self, _args: &ToolArguments) -> Result<ToolResult, String> {
        serde_json::to_value(&self.profile.resume)
            .map(ToolResult::structured)
            .map_err(|e| e.to_string())
    }
}

/// `getContact`: email, handle and social links
pub struct ContactTool {
    profile: Arc<Profile>,
}

#[async_trait]
impl ToolExecutor for ContactTool {
    async fn execute(&self, _args: &ToolArguments) -> Result<ToolResult, String> {
        serde_json::to_value(&self.profile.contact)
            .map(ToolResult::structured)
            .map_err(|e| e.to_string())
    }
}

/// `getPresentation`: short self-introduction
pub struct PresentationTool {
    profile: Arc<Profile>,
}

#[async_trait]
impl ToolExecutor for PresentationTool {
    async fn execute(&self, _args: &ToolArguments) -> Result<ToolResult, String> {
        Ok(ToolResult::structured(json!({
            "presentation": self.profile.presentation,
        })))
    }
}

/// `getSkills`: skill groups with tier and highlights
pub struct SkillsTool {
    profile: Arc<Profile>,
}

#[async_trait]
impl ToolExecutor for SkillsTool {
    async fn execute(&self, _args: &ToolArguments) -> Result<ToolResult, String> {
        Ok(ToolResult::structured(json!({
            "skills": self.profile.skills,
        })))
    }
}

/// `getInternship`: what kind of internship is wanted, as markdown
pub struct InternshipTool {
    profile: Arc<Profile>,
}

impl InternshipTool {
    fn render(&self) -> String {
        let i = &self.profile.internship;
        let c = &self.profile.contact;

        let mut out = format!("{}\n\n", i.intro);
        out.push_str(&format!("- 📅 **Duration**: {}\n", i.duration));
        out.push_str(&format!("- 🌎 **Location**: {}\n", i.locations));
        out.push_str(&format!("- 🎯 **Focus**: {}\n", i.focus));
        out.push_str(&format!("- 🧰 **Stack**: {}\n", i.stack));
        if !i.highlights.is_empty() {
            out.push_str("- 🚀 **Highlights**:\n");
            for h in &i.highlights {
                out.push_str(&format!("  - {}\n", h));
            }
        }
        out.push_str(&format!("\n- 🛂 **Work authorization**: {}\n", i.work_authorization));

        out.push_str("\n📬 **Contact**\n");
        out.push_str(&format!("- Email: **{}**\n", c.email));
        for link in &c.socials {
            out.push_str(&format!("- {}: **{}**\n", link.name, link.url));
        }
        out.push_str(&format!("\n{}", i.closing));
        out
    }
}

#[async_trait]
impl ToolExecutor for InternshipTool {
    async fn execute(&self, _args: &ToolArguments) -> Result<ToolResult, String> {
        Ok(ToolResult::text(self.render()))
    }
}

/// `getCrazy`: esports and hobbies, as markdown
pub struct CrazyTool {
    profile: Arc<Profile>,
}

impl CrazyTool {
    fn render(&self) -> String {
        let e = &self.profile.esports;
        format!(
            "{}\n\n\
             - 🏆 **Rank**: {}\n\
             - 🏫 **Team**: {}\n\
             - 🎯 **Role**: {}\n\
             - 🧠 **Strengths**: {}\n\
             - ❤️ **Champs**: {}\n\
             - ✍️ **What it taught me**: {}\n\n\
             {}",
            e.intro,
            e.rank,
            e.team,
            e.roles.join(", "),
            e.strengths.join(", "),
            e.champions.join(", "),
            e.lessons,
            e.closing,
        )
    }
}

#[async_trait]
impl ToolExecutor for CrazyTool {
    async fn execute(&self, _args: &ToolArguments) -> Result<ToolResult, String> {
        Ok(ToolResult::text(self.render()))
    }
}

/// Register the seven portfolio tools, in catalog order
pub fn register_portfolio_tools(
    registry: &mut ToolRegistry,
    profile: Arc<Profile>,
) -> Result<(), ToolError> {
    let name = &profile.identity.name;
    let projects = ProjectsTool::new(profile.clone());
    let projects_schema = projects.schema();

    let defs = [
        ToolDefinition::new(
            GET_PROJECTS,
            format!("Lists {}'s projects with description, tech stack and links. Optionally filter by category or limit the count.", name),
            Arc::new(projects),
        )
        .with_schema(projects_schema),
        ToolDefinition::new(
            GET_RESUME,
            format!("Returns {}'s résumé card with a download link.", name),
            Arc::new(ResumeTool { profile: profile.clone() }),
        ),
        ToolDefinition::new(
            GET_CONTACT,
            format!("Returns {}'s contact information and social links.", name),
            Arc::new(ContactTool { profile: profile.clone() }),
        ),
        ToolDefinition::new(
            GET_PRESENTATION,
            format!("Returns a concise personal introduction of {}. Use it to answer \"Who are you?\" or \"Tell me about yourself\".", name),
            Arc::new(PresentationTool { profile: profile.clone() }),
        ),
        ToolDefinition::new(
            GET_SKILLS,
            format!("Returns {}'s skills grouped by area, with depth and highlights.", name),
            Arc::new(SkillsTool { profile: profile.clone() }),
        ),
        ToolDefinition::new(
            GET_INTERNSHIP,
            format!("Summarizes the internship {} is seeking and how to reach them. Use when users ask about internships, availability, or hiring.", name),
            Arc::new(InternshipTool { profile: profile.clone() }),
        ),
        ToolDefinition::new(
            GET_CRAZY,
            format!("Shares {}'s fun side: esports background and hobbies.", name),
            Arc::new(CrazyTool { profile }),
        ),
    ];

    for def in defs {
        registry.register(def)?;
    }
    Ok(())
}

/// Build a registry holding exactly the portfolio catalog
pub fn portfolio_registry(
    profile: Arc<Profile>,
    logger: Arc<dyn Logger>,
) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new(logger);
    register_portfolio_tools(&mut registry, profile)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::types::ToolCall;
    use serde_json::Value;

    fn registry() -> ToolRegistry {
        let profile = Arc::new(Profile::builtin().unwrap().clone());
        portfolio_registry(profile, Arc::new(NoOpLogger::new())).unwrap()
    }

    #[test]
    fn test_catalog_order() {
        assert_eq!(
            registry().list_tool_names(),
            vec![
                GET_PROJECTS,
                GET_RESUME,
                GET_CONTACT,
                GET_PRESENTATION,
                GET_SKILLS,
                GET_INTERNSHIP,
                GET_CRAZY
            ]
        );
    }

    #[test]
    fn test_routes_cover_catalog() {
        let reg = registry();
        for route in INTENT_ROUTES {
            assert!(reg.contains(route.tool), "route to missing tool {}", route.tool);
        }
        assert_eq!(INTENT_ROUTES.len(), reg.len());
    }

    #[test]
    fn test_registering_twice_fails() {
        let mut reg = registry();
        let profile = Arc::new(Profile::builtin().unwrap().clone());
        let err = register_portfolio_tools(&mut reg, profile).unwrap_err();
        assert_eq!(err, ToolError::Duplicate(GET_PROJECTS.to_string()));
    }

    #[tokio::test]
    async fn test_every_tool_returns_content() {
        let reg = registry();
        for name in reg.list_tool_names() {
            let result = reg
                .execute_tool_call(&ToolCall::no_args("c1", name))
                .await
                .unwrap();
            assert!(!result.is_empty(), "{} returned nothing", name);
        }
    }

    #[tokio::test]
    async fn test_projects_filter_and_limit() {
        let reg = registry();

        let result = reg
            .execute_tool_call(&ToolCall::new("c1", GET_PROJECTS, json!({"category": "Robotics"})))
            .await
            .unwrap();
        let value = result.as_structured().unwrap();
        let projects = value["projects"].as_array().unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0]["title"], "Jurassic Rescue Robot - MREN 303");
        assert_eq!(value["total"], 5);

        // Numeric strings are accepted for limit
        let result = reg
            .execute_tool_call(&ToolCall::new("c2", GET_PROJECTS, json!({"limit": "2"})))
            .await
            .unwrap();
        assert_eq!(result.as_structured().unwrap()["projects"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_projects_rejects_bad_arguments() {
        let reg = registry();
        for input in [
            json!({"category": "Cooking"}),
            json!({"limit": 0}),
            json!({"limit": 99}),
            json!({"limit": "two"}),
            json!({"sort": "date"}),
        ] {
            let err = reg
                .execute_tool_call(&ToolCall::new("c1", GET_PROJECTS, input.clone()))
                .await
                .unwrap_err();
            assert!(
                matches!(err, ToolError::SchemaMismatch { .. }),
                "{} should be rejected",
                input
            );
        }
    }

    #[tokio::test]
    async fn test_argument_less_tools_reject_arguments() {
        let reg = registry();
        for name in [GET_RESUME, GET_CONTACT, GET_PRESENTATION, GET_SKILLS, GET_INTERNSHIP, GET_CRAZY] {
            let err = reg
                .execute_tool_call(&ToolCall::new("c1", name, json!({"x": 1})))
                .await
                .unwrap_err();
            assert!(matches!(err, ToolError::SchemaMismatch { .. }));
        }
    }

    #[tokio::test]
    async fn test_structured_payloads() {
        let reg = registry();

        let resume = reg.execute_tool_call(&ToolCall::no_args("c", GET_RESUME)).await.unwrap();
        assert_eq!(resume.as_structured().unwrap()["file_type"], "PDF");

        let contact = reg.execute_tool_call(&ToolCall::no_args("c", GET_CONTACT)).await.unwrap();
        assert_eq!(contact.as_structured().unwrap()["email"], "mousapir@gmail.com");

        let intro = reg.execute_tool_call(&ToolCall::no_args("c", GET_PRESENTATION)).await.unwrap();
        assert!(matches!(intro.as_structured().unwrap()["presentation"], Value::String(_)));

        let skills = reg.execute_tool_call(&ToolCall::no_args("c", GET_SKILLS)).await.unwrap();
        assert_eq!(skills.as_structured().unwrap()["skills"][0]["tier"], "expert");
    }

    #[tokio::test]
    async fn test_markdown_payloads() {
        let reg = registry();

        let internship = reg.execute_tool_call(&ToolCall::no_args("c", GET_INTERNSHIP)).await.unwrap();
        let text = internship.as_text().unwrap();
        assert!(text.contains("**Duration**"));
        assert!(text.contains("mousapir@gmail.com"));

        let crazy = reg.execute_tool_call(&ToolCall::no_args("c", GET_CRAZY)).await.unwrap();
        let text = crazy.as_text().unwrap();
        assert!(text.contains("**Masters**"));
        assert!(text.contains("Akali, Katarina, Yone, Zed, Lucian"));
    }
}
