use serde::{Deserialize, Serialize};

/// An agent persona, stored as one YAML file per agent in a profile set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personality {
    pub name: String,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<Interests>,
    #[serde(default)]
    pub quirks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_pattern: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interests {
    #[serde(default)]
    pub primary_topics: Vec<String>,
    #[serde(default)]
    pub key_figures: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_focus: Option<String>,
}

/// `personality:`-wrapped form produced by the generator model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalityDocument {
    pub personality: Personality,
}

impl Personality {
    #[must_use]
    pub fn mood_or_neutral(&self) -> &str {
        self.mood.as_deref().unwrap_or("neutral")
    }

    /// File stem used when the persona is written into a profile set.
    #[must_use]
    pub fn file_stem(&self) -> String {
        let stem: String = self
            .name
            .trim()
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        if stem.is_empty() { "unnamed".to_owned() } else { stem }
    }

    /// One-paragraph description used inside prompts.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = format!("Name: {}\n", self.name);
        if !self.traits.is_empty() {
            out.push_str(&format!("Traits: {}\n", self.traits.join(", ")));
        }
        out.push_str(&format!("Current mood: {}\n", self.mood_or_neutral()));
        if let Some(interests) = &self.interests {
            if !interests.primary_topics.is_empty() {
                out.push_str(&format!("Interests: {}\n", interests.primary_topics.join(", ")));
            }
            if !interests.key_figures.is_empty() {
                out.push_str(&format!("Key figures: {}\n", interests.key_figures.join(", ")));
            }
            if let Some(focus) = &interests.specific_focus {
                out.push_str(&format!("Obsession: {focus}\n"));
            }
        }
        if !self.quirks.is_empty() {
            out.push_str(&format!("Quirks: {}\n", self.quirks.join("; ")));
        }
        if let Some(speech) = &self.speech_pattern {
            out.push_str(&format!("Speech pattern: {speech}\n"));
        }
        out
    }
}

/// Written next to the personas of a generated profile set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSetMetadata {
    pub profile_generation_session_id: String,
    pub num_agents: usize,
    #[serde(default)]
    pub field_of_focus: Option<String>,
    #[serde(default)]
    pub personalities: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_replaces_spaces_and_symbols() {
        let p = Personality {
            name: "Captain Hinge/Bolt".to_owned(),
            traits: vec![],
            mood: None,
            interests: None,
            quirks: vec![],
            speech_pattern: None,
        };
        assert_eq!(p.file_stem(), "Captain_Hinge_Bolt");
    }

    #[test]
    fn test_summary_includes_defaults() {
        let p = Personality {
            name: "Bog Oracle".to_owned(),
            traits: vec!["damp".to_owned(), "wise".to_owned()],
            mood: None,
            interests: Some(Interests {
                primary_topics: vec!["peat bog preservation".to_owned()],
                key_figures: vec![],
                specific_focus: None,
            }),
            quirks: vec![],
            speech_pattern: Some("whispers".to_owned()),
        };
        let summary = p.summary();
        assert!(summary.contains("Traits: damp, wise"));
        assert!(summary.contains("Current mood: neutral"));
        assert!(summary.contains("Interests: peat bog preservation"));
        assert!(summary.contains("Speech pattern: whispers"));
        assert!(!summary.contains("Quirks"));
    }
}
