//! Resolution of wall tile codes into texture identifiers.

use std::collections::BTreeMap;

use keymaze_core::{HitMaterial, TextureId, TileCode, TileMap};
use thiserror::Error;

/// Strategy used to pick a texture for each wall code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MaterialMapping {
    /// Codes wrap around the texture set, so codes may alias the same texture.
    #[default]
    Modulo,
    /// Code `n` uses texture `n - 1`; codes without a texture are rejected.
    Direct,
}

/// Size of a loaded wall texture in texels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureDimensions {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
}

impl TextureDimensions {
    /// Creates a new texture size descriptor.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Reasons a material table cannot be built for a map.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MaterialError {
    /// No wall textures were supplied.
    #[error("at least one wall texture is required")]
    NoTextures,
    /// A texture had a zero-sized edge.
    #[error("wall texture {index} has empty dimensions {width}x{height}")]
    EmptyTexture {
        /// Position of the texture in the texture set.
        index: usize,
        /// Reported width.
        width: u32,
        /// Reported height.
        height: u32,
    },
    /// Direct mapping found a wall code with no matching texture.
    #[error("wall code {code} has no texture under direct mapping ({available} textures loaded)")]
    MissingTexture {
        /// Offending wall code.
        code: i32,
        /// Number of textures available.
        available: usize,
    },
}

/// Lookup from hit materials to textures for a single tile map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterialTable {
    mapping: MaterialMapping,
    textures: Vec<TextureDimensions>,
    lookup: BTreeMap<TileCode, TextureId>,
}

impl MaterialTable {
    /// Resolves every wall code of `map` against the texture set.
    ///
    /// # Errors
    ///
    /// Returns [`MaterialError`] when the texture set is empty, a texture has
    /// an empty edge, or direct mapping finds a code without a texture.
    pub fn build(
        map: &TileMap,
        textures: &[TextureDimensions],
        mapping: MaterialMapping,
    ) -> Result<Self, MaterialError> {
        if textures.is_empty() {
            return Err(MaterialError::NoTextures);
        }
        if let Some((index, texture)) = textures
            .iter()
            .enumerate()
            .find(|(_, texture)| texture.width == 0 || texture.height == 0)
        {
            return Err(MaterialError::EmptyTexture {
                index,
                width: texture.width,
                height: texture.height,
            });
        }

        let mut lookup = BTreeMap::new();
        for code in map.wall_codes() {
            let texture = resolve(code, textures.len(), mapping)?;
            let _ = lookup.insert(code, texture);
        }

        Ok(Self {
            mapping,
            textures: textures.to_vec(),
            lookup,
        })
    }

    /// Mapping strategy the table was built with.
    #[must_use]
    pub fn mapping(&self) -> MaterialMapping {
        self.mapping
    }

    /// Texture drawn for the provided hit material.
    ///
    /// Boundary hits and codes unknown to the map use the first texture.
    #[must_use]
    pub fn texture_for(&self, material: HitMaterial) -> TextureId {
        match material {
            HitMaterial::Wall(code) => self
                .lookup
                .get(&code)
                .copied()
                .unwrap_or(TextureId::new(0)),
            HitMaterial::Boundary => TextureId::new(0),
        }
    }

    /// Width in texels of the provided texture, or zero when unknown.
    #[must_use]
    pub fn texture_width(&self, texture: TextureId) -> u32 {
        self.textures
            .get(texture.index())
            .map_or(0, |dimensions| dimensions.width)
    }
}

fn resolve(
    code: TileCode,
    available: usize,
    mapping: MaterialMapping,
) -> Result<TextureId, MaterialError> {
    let zero_based = usize::try_from(code.get().saturating_sub(1)).unwrap_or(0);
    let index = match mapping {
        MaterialMapping::Modulo if available == 1 => 0,
        MaterialMapping::Modulo => zero_based % available,
        MaterialMapping::Direct if zero_based < available => zero_based,
        MaterialMapping::Direct => {
            return Err(MaterialError::MissingTexture {
                code: code.get(),
                available,
            })
        }
    };
    Ok(TextureId::new(u32::try_from(index).unwrap_or(0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use keymaze_core::ReservedTiles;

    fn map_with(codes: &[i32]) -> TileMap {
        let width = u32::try_from(codes.len()).expect("small map");
        TileMap::from_codes(width, 1, codes, ReservedTiles::default()).expect("valid map")
    }

    fn textures(count: usize) -> Vec<TextureDimensions> {
        vec![TextureDimensions::new(64, 64); count]
    }

    #[test]
    fn modulo_mapping_wraps_codes() {
        let map = map_with(&[1, 2, 3, 4, 5]);
        let table = MaterialTable::build(&map, &textures(3), MaterialMapping::Modulo)
            .expect("modulo accepts any code");

        let texture = |code| table.texture_for(HitMaterial::Wall(TileCode::new(code)));
        assert_eq!(texture(1), TextureId::new(0));
        assert_eq!(texture(2), TextureId::new(1));
        assert_eq!(texture(3), TextureId::new(2));
        assert_eq!(texture(4), TextureId::new(0));
        assert_eq!(texture(5), TextureId::new(1));
    }

    #[test]
    fn single_texture_covers_every_code() {
        let map = map_with(&[1, 6, 42]);
        let table = MaterialTable::build(&map, &textures(1), MaterialMapping::Modulo)
            .expect("modulo accepts any code");

        for code in [1, 6, 42] {
            assert_eq!(
                table.texture_for(HitMaterial::Wall(TileCode::new(code))),
                TextureId::new(0)
            );
        }
    }

    #[test]
    fn boundary_uses_the_first_texture() {
        let map = map_with(&[0, 2]);
        let table = MaterialTable::build(&map, &textures(2), MaterialMapping::Direct)
            .expect("code 2 has a texture");

        assert_eq!(table.texture_for(HitMaterial::Boundary), TextureId::new(0));
        assert_eq!(table.texture_width(TextureId::new(0)), 64);
    }

    #[test]
    fn direct_mapping_rejects_codes_without_textures() {
        let map = map_with(&[1, 2, 3, 8, 9]);

        let error = MaterialTable::build(&map, &textures(2), MaterialMapping::Direct)
            .expect_err("code 3 lacks a texture");

        assert_eq!(
            error,
            MaterialError::MissingTexture {
                code: 3,
                available: 2
            }
        );
    }

    #[test]
    fn direct_mapping_ignores_reserved_codes() {
        let map = map_with(&[1, 2, 8, 9]);

        let table = MaterialTable::build(&map, &textures(2), MaterialMapping::Direct)
            .expect("key and exit are not walls");

        assert_eq!(table.mapping(), MaterialMapping::Direct);
        assert_eq!(
            table.texture_for(HitMaterial::Wall(TileCode::new(2))),
            TextureId::new(1)
        );
    }

    #[test]
    fn empty_texture_sets_are_rejected() {
        let map = map_with(&[1]);

        assert_eq!(
            MaterialTable::build(&map, &[], MaterialMapping::Modulo),
            Err(MaterialError::NoTextures)
        );
        assert_eq!(
            MaterialTable::build(
                &map,
                &[TextureDimensions::new(64, 64), TextureDimensions::new(0, 64)],
                MaterialMapping::Modulo
            ),
            Err(MaterialError::EmptyTexture {
                index: 1,
                width: 0,
                height: 64
            })
        );
    }
}
