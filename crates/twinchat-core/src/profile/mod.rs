//! Authored profile content
//!
//! Everything the agent knows about its subject lives here: identity and tone
//! for the persona prompt, and the projects, skills, résumé, contact,
//! internship and esports content the tools return. The content is data, not
//! code, so another person's profile can be loaded from YAML without touching
//! the tools.

use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ConfigResult};

const BUILTIN_PROFILE: &str = include_str!("builtin.yaml");

static BUILTIN: OnceCell<Profile> = OnceCell::new();

/// The full authored profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub identity: Identity,
    /// Tone and voice directives for the persona
    #[serde(default)]
    pub tone: Vec<String>,
    /// Response structure guidance for the persona
    #[serde(default)]
    pub response_style: Vec<String>,
    /// Personal background facts
    #[serde(default)]
    pub personal: Vec<String>,
    /// Short self-introduction returned by `getPresentation`
    pub presentation: String,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub skills: Vec<SkillGroup>,
    pub resume: Resume,
    pub contact: Contact,
    pub internship: Internship,
    pub esports: Esports,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub headline: String,
    /// Framing paragraph that opens the persona prompt
    pub role_play: String,
    /// Fixed reply for requests outside the persona's scope
    pub out_of_scope_reply: String,
    #[serde(default)]
    pub facts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub category: String,
    pub date: String,
    pub description: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Self-assessed depth in a skill area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillTier {
    Comfort,
    Advanced,
    Expert,
}

impl SkillTier {
    pub fn label(&self) -> &'static str {
        match self {
            SkillTier::Comfort => "Comfort",
            SkillTier::Advanced => "Advanced",
            SkillTier::Expert => "Expert",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGroup {
    pub category: String,
    pub tier: SkillTier,
    /// Short highlight bullets
    #[serde(default)]
    pub points: Vec<String>,
    /// Individual skills
    #[serde(default)]
    pub chips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resume {
    pub title: String,
    pub description: String,
    pub file_type: String,
    pub last_updated: String,
    pub download_url: String,
    pub view_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub handle: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub socials: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Internship {
    pub intro: String,
    pub duration: String,
    pub locations: String,
    pub focus: String,
    pub stack: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    pub work_authorization: String,
    pub closing: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Esports {
    pub intro: String,
    pub rank: String,
    pub team: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub champions: Vec<String>,
    pub lessons: String,
    pub closing: String,
}

impl Profile {
    /// The embedded default profile, parsed once per process
    pub fn builtin() -> ConfigResult<&'static Profile> {
        BUILTIN.get_or_try_init(|| Profile::from_yaml_str(BUILTIN_PROFILE))
    }

    /// Parse and check a profile from YAML text
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let profile: Profile = serde_yaml::from_str(content)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load a profile from a YAML file
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Distinct project categories, in first-seen order
    pub fn project_categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.projects
            .iter()
            .map(|p| p.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.identity.name.trim().is_empty() {
            return Err(ConfigError::Invalid("profile identity.name must not be empty".into()));
        }
        if self.presentation.trim().is_empty() {
            return Err(ConfigError::Invalid("profile presentation must not be empty".into()));
        }

        let mut titles = HashSet::new();
        for project in &self.projects {
            if !titles.insert(project.title.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate project title in profile: {}",
                    project.title
                )));
            }
        }
        Ok(())
    }
}
