//! Entity registry payloads: businesses, bridgechains, developers and plugins.
//!
//! Entities are driven from the command line as
//! `<category> <action> [args...]`:
//!
//! ```text
//! business register <name> <ipfs>
//! plugin-core update <registration_id> <ipfs>
//! developer resign <registration_id>
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntityError {
    #[error("unknown entity category '{0}'")]
    UnknownCategory(String),

    #[error("unknown entity action '{0}'")]
    UnknownAction(String),

    #[error("entity {action} needs a {argument}")]
    MissingArgument {
        action: &'static str,
        argument: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    Business,
    Bridgechain,
    Developer,
    Plugin,
}

impl EntityType {
    pub fn wire_value(&self) -> u8 {
        match self {
            Self::Business => 0,
            Self::Bridgechain => 1,
            Self::Developer => 2,
            Self::Plugin => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntitySubType {
    None,
    PluginCore,
    PluginDesktop,
}

impl EntitySubType {
    pub fn wire_value(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::PluginCore => 1,
            Self::PluginDesktop => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityAction {
    Register,
    Update,
    Resign,
}

impl EntityAction {
    pub fn wire_value(&self) -> u8 {
        match self {
            Self::Register => 0,
            Self::Update => 1,
            Self::Resign => 2,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Update => "update",
            Self::Resign => "resign",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipfs_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityAsset {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub sub_type: EntitySubType,
    pub action: EntityAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_id: Option<String>,
    pub data: EntityData,
}

impl EntityAsset {
    /// Parses `category action args...` as typed on the prompt.
    ///
    /// Trailing arguments beyond what the action needs are ignored. The ipfs
    /// argument of `register` and `update` is optional.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, EntityError> {
        let arg = |i: usize| args.get(i).map(|s| s.as_ref().to_string());

        let category = arg(0).unwrap_or_default();
        let (entity_type, sub_type) = match category.as_str() {
            "business" => (EntityType::Business, EntitySubType::None),
            "bridgechain" => (EntityType::Bridgechain, EntitySubType::None),
            "developer" => (EntityType::Developer, EntitySubType::None),
            "plugin-core" => (EntityType::Plugin, EntitySubType::PluginCore),
            "plugin-desktop" => (EntityType::Plugin, EntitySubType::PluginDesktop),
            _ => return Err(EntityError::UnknownCategory(category)),
        };

        let action_name = arg(1).unwrap_or_default();
        let action = match action_name.as_str() {
            "register" => EntityAction::Register,
            "update" => EntityAction::Update,
            "resign" => EntityAction::Resign,
            _ => return Err(EntityError::UnknownAction(action_name)),
        };

        let required = |i: usize, argument: &'static str| {
            arg(i).ok_or(EntityError::MissingArgument {
                action: action.name(),
                argument,
            })
        };

        let (registration_id, data) = match action {
            EntityAction::Register => (
                None,
                EntityData {
                    name: Some(required(2, "name")?),
                    ipfs_data: arg(3),
                },
            ),
            EntityAction::Update => (
                Some(required(2, "registration id")?),
                EntityData {
                    name: None,
                    ipfs_data: arg(3),
                },
            ),
            EntityAction::Resign => (Some(required(2, "registration id")?), EntityData::default()),
        };

        Ok(Self {
            entity_type,
            sub_type,
            action,
            registration_id,
            data,
        })
    }
}
