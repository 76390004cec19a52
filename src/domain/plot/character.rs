//! The character created in the previous stage.

use serde::{Deserialize, Serialize};

/// Read-only description of the student's character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub name: String,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CharacterProfile {
    /// Creates a profile with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_species(mut self, species: impl Into<String>) -> Self {
        self.species = Some(species.into());
        self
    }

    pub fn with_traits<I, S>(mut self, traits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.traits = traits.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Renders the profile as the block embedded in the opening prompt.
    ///
    /// Blank optional parts are left out entirely.
    pub fn prompt_block(&self) -> String {
        let mut lines = vec![format!("Character name: {}", self.name)];

        if let Some(species) = non_blank(&self.species) {
            lines.push(format!("Species: {}", species));
        }
        let traits: Vec<&str> = self
            .traits
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if !traits.is_empty() {
            lines.push(format!("Traits: {}", traits.join(", ")));
        }
        if let Some(description) = non_blank(&self.description) {
            lines.push(format!("Description: {}", description));
        }

        lines.join("\n")
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_profile_renders_every_line() {
        let profile = CharacterProfile::named("Pip")
            .with_species("fox")
            .with_traits(["brave", "curious"])
            .with_description("A small fox with a red scarf");

        assert_eq!(
            profile.prompt_block(),
            "Character name: Pip\nSpecies: fox\nTraits: brave, curious\nDescription: A small fox with a red scarf"
        );
    }

    #[test]
    fn blank_parts_are_omitted() {
        let profile = CharacterProfile::named("Pip")
            .with_species("  ")
            .with_traits(["", " "]);

        assert_eq!(profile.prompt_block(), "Character name: Pip");
    }
}
