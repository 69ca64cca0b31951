//! Read-only catalog of preset MCP server templates.

use std::{collections::HashSet, fs, path::Path};

use anyhow::Context;
use serde_json::Value;

use crate::{types::Preset, validation};

const BUNDLED_PRESETS: &str = include_str!("../presets/presets.json");

#[derive(Debug, Clone)]
pub struct PresetCatalog {
    presets: Vec<Preset>,
}

impl PresetCatalog {
    /// The catalog shipped with the binary.
    pub fn bundled() -> anyhow::Result<Self> {
        Self::from_json_str(BUNDLED_PRESETS).context("bundled preset catalog is invalid")
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read preset catalog {}", path.display()))?;
        Self::from_json_str(&content).with_context(|| format!("invalid preset catalog {}", path.display()))
    }

    /// Uses `path` when configured, the bundled catalog otherwise.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        match path.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) => Self::from_file(Path::new(p)),
            None => Self::bundled(),
        }
    }

    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        let raw: Vec<Value> = serde_json::from_str(content).context("preset catalog must be a JSON array")?;

        let mut presets = Vec::with_capacity(raw.len());
        let mut seen = HashSet::new();
        for (i, entry) in raw.into_iter().enumerate() {
            let id = entry.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
            if let Some(cfg) = entry.get("config") {
                let issues = validation::validate_server(&id, cfg);
                if !issues.is_empty() {
                    let joined = issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ");
                    anyhow::bail!("preset #{} ('{}') has an invalid config: {}", i, id, joined);
                }
            }
            let preset: Preset =
                serde_json::from_value(entry).with_context(|| format!("preset #{} ('{}') is malformed", i, id))?;
            if preset.id.trim().is_empty() {
                anyhow::bail!("preset #{} has an empty id", i);
            }
            if !seen.insert(preset.id.clone()) {
                anyhow::bail!("duplicate preset id '{}'", preset.id);
            }
            presets.push(preset);
        }

        Ok(Self { presets })
    }

    pub fn all(&self) -> &[Preset] {
        &self.presets
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Case-insensitive substring match on id, name, description and category.
    /// A blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<&Preset> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.presets.iter().collect();
        }
        self.presets
            .iter()
            .filter(|p| {
                [&p.id, &p.name, &p.description, &p.category]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Distinct categories in catalog order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.presets
            .iter()
            .map(|p| p.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&Preset> {
        self.presets.iter().filter(|p| p.category.eq_ignore_ascii_case(category.trim())).collect()
    }
}
