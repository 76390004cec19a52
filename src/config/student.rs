//! Student and upstream character settings for a terminal session

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::foundation::ParticipantId;
use crate::domain::plot::CharacterProfile;

/// Who is brainstorming, and the character they made earlier
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentConfig {
    /// Participant id sent to the backend; anonymous when absent
    pub participant_id: Option<String>,

    /// Name of the previously created character
    pub character_name: Option<String>,

    pub character_species: Option<String>,

    /// Comma-separated trait list
    pub character_traits: Option<String>,

    pub character_description: Option<String>,
}

impl StudentConfig {
    /// The configured participant, or the anonymous one
    pub fn participant(&self) -> Result<ParticipantId, ValidationError> {
        match self.participant_id.as_deref() {
            None => Ok(ParticipantId::anonymous()),
            Some(id) => ParticipantId::new(id).map_err(|_| ValidationError::InvalidParticipantId),
        }
    }

    /// The character, if one was named
    pub fn character(&self) -> Option<CharacterProfile> {
        let name = self.character_name.as_deref().map(str::trim).filter(|n| !n.is_empty())?;
        let mut profile = CharacterProfile::named(name);
        if let Some(species) = &self.character_species {
            profile = profile.with_species(species.trim());
        }
        if let Some(traits) = &self.character_traits {
            profile = profile.with_traits(traits.split(',').map(str::trim).filter(|t| !t.is_empty()));
        }
        if let Some(description) = &self.character_description {
            profile = profile.with_description(description.trim());
        }
        Some(profile)
    }

    /// Validate student configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.participant().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_anonymous_without_character() {
        let config = StudentConfig::default();
        assert_eq!(config.participant().unwrap().as_str(), "default-user");
        assert!(config.character().is_none());
    }

    #[test]
    fn test_character_from_flat_settings() {
        let config = StudentConfig {
            character_name: Some("Pip".to_string()),
            character_species: Some("fox".to_string()),
            character_traits: Some("brave, curious,".to_string()),
            ..Default::default()
        };
        let character = config.character().unwrap();
        assert_eq!(character.name, "Pip");
        assert_eq!(character.traits, vec!["brave", "curious"]);
        assert!(character.description.is_none());
    }

    #[test]
    fn test_blank_participant_is_invalid() {
        let config = StudentConfig {
            participant_id: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidParticipantId));
    }
}
