//! Profile sets: a directory of agent personalities plus generation metadata.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tweetvec_core::{Personality, ProfileSetMetadata};
use tweetvec_llm::{parse_personality_yaml, ProfileGenerator};

use crate::error::ServiceError;

const METADATA_FILE: &str = "profile_generation_metadata.yaml";

/// A loaded profile set.
#[derive(Debug, Clone)]
pub struct ProfileSet {
    pub dir: PathBuf,
    pub personalities: Vec<Personality>,
}

impl ProfileSet {
    /// Reads every `*.yaml`/`*.yml` file in `dir`, in file-name order.
    ///
    /// Files ending in `metadata.yaml` are skipped. Each file may hold a bare personality or one
    /// wrapped in `personality:`.
    pub fn load(dir: &Path) -> Result<Self, ServiceError> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(|e| ServiceError::io(dir, e))?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| is_personality_file(path))
            .collect();
        files.sort();

        let mut personalities = Vec::with_capacity(files.len());
        for path in &files {
            let raw = std::fs::read_to_string(path).map_err(|e| ServiceError::io(path, e))?;
            let personality = parse_personality_yaml(&raw).map_err(|e| {
                ServiceError::InvalidInput(format!("{}: {e}", path.display()))
            })?;
            tracing::debug!(path = %path.display(), name = %personality.name, "Loaded personality");
            personalities.push(personality);
        }
        if personalities.is_empty() {
            return Err(ServiceError::InvalidInput(format!(
                "no personalities found in {}",
                dir.display()
            )));
        }
        tracing::info!(dir = %dir.display(), agents = personalities.len(), "Loaded profile set");
        Ok(Self { dir: dir.to_path_buf(), personalities })
    }

    /// Writes a new `profile-set-<uuid>` directory under `root`.
    pub fn write(
        root: &Path,
        personalities: Vec<Personality>,
        field_of_focus: Option<&str>,
    ) -> Result<Self, ServiceError> {
        let id = format!("profile-set-{}", uuid::Uuid::new_v4());
        let dir = root.join(&id);
        std::fs::create_dir_all(&dir).map_err(|e| ServiceError::io(&dir, e))?;

        let mut used = HashSet::new();
        for personality in &personalities {
            let stem = unique_stem(&mut used, personality.file_stem());
            let path = dir.join(format!("{stem}.yaml"));
            write_yaml(&path, personality)?;
        }

        let metadata = ProfileSetMetadata {
            profile_generation_session_id: id,
            num_agents: personalities.len(),
            field_of_focus: field_of_focus.map(ToOwned::to_owned),
            personalities: personalities.iter().map(|p| p.name.clone()).collect(),
        };
        write_yaml(&dir.join(METADATA_FILE), &metadata)?;
        tracing::info!(dir = %dir.display(), agents = personalities.len(), "Wrote profile set");
        Ok(Self { dir, personalities })
    }

    /// Generates `num_agents` personalities and writes them as a new set under `root`.
    pub async fn generate(
        generator: &ProfileGenerator,
        root: &Path,
        num_agents: usize,
        field_of_focus: Option<&str>,
    ) -> Result<Self, ServiceError> {
        let mut personalities = Vec::with_capacity(num_agents);
        for i in 0..num_agents {
            let personality = generator.generate(field_of_focus).await?;
            tracing::info!(
                n = i.saturating_add(1),
                total = num_agents,
                name = %personality.name,
                "Generated personality"
            );
            personalities.push(personality);
        }
        Self::write(root, personalities, field_of_focus)
    }
}

fn is_personality_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.is_file() && (name.ends_with(".yaml") || name.ends_with(".yml")) && !name.ends_with("metadata.yaml")
}

fn unique_stem(used: &mut HashSet<String>, stem: String) -> String {
    if used.insert(stem.clone()) {
        return stem;
    }
    let mut n = 2_usize;
    loop {
        let candidate = format!("{stem}_{n}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n = n.saturating_add(1);
    }
}

fn write_yaml<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), ServiceError> {
    let yaml = serde_yaml::to_string(value)
        .map_err(|source| ServiceError::Yaml { path: path.to_path_buf(), source })?;
    std::fs::write(path, yaml).map_err(|e| ServiceError::io(path, e))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "test code")]

    use tempfile::TempDir;

    use super::*;

    fn persona(name: &str) -> Personality {
        Personality {
            name: name.to_owned(),
            traits: vec!["curious".to_owned()],
            mood: None,
            interests: None,
            quirks: Vec::new(),
            speech_pattern: None,
        }
    }

    #[test]
    fn test_write_then_load_round_trips_names() {
        let root = TempDir::new().unwrap();
        let written = ProfileSet::write(
            root.path(),
            vec![persona("Barnaby Hinge"), persona("Barnaby Hinge"), persona("Ada")],
            Some("vc"),
        )
        .unwrap();

        assert!(written.dir.join("Barnaby_Hinge.yaml").is_file());
        assert!(written.dir.join("Barnaby_Hinge_2.yaml").is_file());
        let metadata: ProfileSetMetadata =
            serde_yaml::from_str(&std::fs::read_to_string(written.dir.join(METADATA_FILE)).unwrap())
                .unwrap();
        assert_eq!(metadata.num_agents, 3);
        assert_eq!(metadata.field_of_focus.as_deref(), Some("vc"));
        assert!(metadata.profile_generation_session_id.starts_with("profile-set-"));

        let loaded = ProfileSet::load(&written.dir).unwrap();
        let names: Vec<&str> = loaded.personalities.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Barnaby Hinge", "Barnaby Hinge"]);
    }

    #[test]
    fn test_load_accepts_wrapped_yaml_and_skips_metadata() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.yaml"), "personality:\n  name: Wrapped\n").unwrap();
        std::fs::write(dir.path().join("b.yml"), "name: Bare\nmood: calm\n").unwrap();
        std::fs::write(dir.path().join("session_metadata.yaml"), "num_agents: 2\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore").unwrap();

        let set = ProfileSet::load(dir.path()).unwrap();
        assert_eq!(set.personalities.len(), 2);
        assert_eq!(set.personalities[0].name, "Wrapped");
        assert_eq!(set.personalities[1].mood_or_neutral(), "calm");
    }

    #[test]
    fn test_empty_or_broken_sets_are_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(ProfileSet::load(dir.path()), Err(ServiceError::InvalidInput(_))));
        std::fs::write(dir.path().join("bad.yaml"), "- not\n- a persona\n").unwrap();
        assert!(matches!(ProfileSet::load(dir.path()), Err(ServiceError::InvalidInput(_))));
    }
}
