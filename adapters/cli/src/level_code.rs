//! Single-line level codes for sharing mazes on the command line.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use glam::Vec2;
use keymaze_core::{GridError, ReservedTiles, TileCode, TileMap};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::levels::LevelDefinition;

const CODE_DOMAIN: &str = "keymaze";
const CODE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded level payload.
pub(crate) const CODE_HEADER: &str = "keymaze:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableLevel {
    name: String,
    codes: Vec<i32>,
    key: i32,
    exit: i32,
    spawn: [f32; 2],
    facing: [f32; 2],
}

/// Encodes a level into a `keymaze:v1:<W>x<H>:<payload>` string.
pub(crate) fn encode(level: &LevelDefinition) -> Result<String, LevelCodeError> {
    let reserved = level.map.reserved();
    let payload = SerializableLevel {
        name: level.name.clone(),
        codes: level.map.tiles().iter().map(TileCode::get).collect(),
        key: reserved.key.get(),
        exit: reserved.exit.get(),
        spawn: level.spawn.to_array(),
        facing: level.facing.to_array(),
    };
    let json = serde_json::to_vec(&payload).map_err(LevelCodeError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!(
        "{CODE_HEADER}:{}x{}:{encoded}",
        level.map.width(),
        level.map.height()
    ))
}

/// Decodes a level from the provided string representation.
pub(crate) fn decode(value: &str) -> Result<LevelDefinition, LevelCodeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LevelCodeError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(LevelCodeError::MissingPrefix)?;
    let version = parts.next().ok_or(LevelCodeError::MissingVersion)?;
    let dimensions = parts.next().ok_or(LevelCodeError::MissingDimensions)?;
    let payload = parts.next().ok_or(LevelCodeError::MissingPayload)?;

    if domain != CODE_DOMAIN {
        return Err(LevelCodeError::InvalidPrefix(domain.to_owned()));
    }
    if version != CODE_VERSION {
        return Err(LevelCodeError::UnsupportedVersion(version.to_owned()));
    }

    let (width, height) = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(LevelCodeError::InvalidEncoding)?;
    let decoded: SerializableLevel =
        serde_json::from_slice(&bytes).map_err(LevelCodeError::InvalidPayload)?;

    let reserved = ReservedTiles::new(TileCode::new(decoded.key), TileCode::new(decoded.exit));
    let map = TileMap::from_codes(width, height, &decoded.codes, reserved)?;
    LevelDefinition::new(
        decoded.name,
        map,
        Vec2::from_array(decoded.spawn),
        Vec2::from_array(decoded.facing),
    )
    .map_err(|error| LevelCodeError::InvalidLevel(format!("{error:#}")))
}

/// Errors that can occur while decoding level codes.
#[derive(Debug, Error)]
pub(crate) enum LevelCodeError {
    /// The provided string was empty or contained only whitespace.
    #[error("level code was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the code.
    #[error("level code is missing the prefix")]
    MissingPrefix,
    /// The code did not contain a version segment.
    #[error("level code is missing the version")]
    MissingVersion,
    /// The code did not include grid dimensions.
    #[error("level code is missing the grid dimensions")]
    MissingDimensions,
    /// The code did not include the payload segment.
    #[error("level code is missing the payload")]
    MissingPayload,
    /// The code used an unexpected prefix segment.
    #[error("level code prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The code used an unsupported version identifier.
    #[error("level code version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode level payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    #[error("could not parse level payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The decoded tiles did not form a valid map.
    #[error("level code holds an invalid map: {0}")]
    InvalidMap(#[from] GridError),
    /// The decoded level failed validation.
    #[error("level code holds an invalid level: {0}")]
    InvalidLevel(String),
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LevelCodeError> {
    let invalid = || LevelCodeError::InvalidDimensions(dimensions.to_owned());
    let (width, height) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
    let height = height.trim().parse::<u32>().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }

    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::builtin_levels;

    #[test]
    fn builtin_level_survives_a_code() {
        let levels = builtin_levels().expect("built-in levels are valid");

        let encoded = encode(&levels[1]).expect("level encodes");
        assert!(encoded.starts_with(&format!("{CODE_HEADER}:16x16:")));
        assert!(!encoded.contains('\n'));

        let decoded = decode(&encoded).expect("code decodes");
        assert_eq!(decoded, levels[1]);
    }

    #[test]
    fn decode_rejects_foreign_prefixes() {
        assert!(matches!(
            decode("maze:v1:4x4:e30"),
            Err(LevelCodeError::InvalidPrefix(prefix)) if prefix == "maze"
        ));
        assert!(matches!(
            decode("keymaze:v9:4x4:e30"),
            Err(LevelCodeError::UnsupportedVersion(_))
        ));
        assert!(matches!(decode("   "), Err(LevelCodeError::EmptyPayload)));
        assert!(matches!(
            decode("keymaze:v1"),
            Err(LevelCodeError::MissingDimensions)
        ));
    }

    #[test]
    fn decode_rejects_bad_dimensions() {
        assert!(matches!(
            decode("keymaze:v1:0x4:e30"),
            Err(LevelCodeError::InvalidDimensions(_))
        ));
        assert!(matches!(
            decode("keymaze:v1:four:e30"),
            Err(LevelCodeError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn decode_rejects_mismatched_tile_counts() {
        let levels = builtin_levels().expect("built-in levels are valid");
        let encoded = encode(&levels[0]).expect("level encodes");
        let resized = encoded.replacen(":16x16:", ":8x8:", 1);

        assert!(matches!(
            decode(&resized),
            Err(LevelCodeError::InvalidMap(GridError::NotRectangular { .. }))
        ));
    }
}
