//! Upstream API response shapes. Only the fields the pipeline reads are
//! modeled; everything else is ignored.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// One page of `/pokemon?limit=&offset=`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListPage {
    pub count: u32,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<NamedResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeSlot {
    pub slot: u32,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpriteSet {
    pub front_default: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Option<SpriteSet>,
    #[serde(default)]
    pub dream_world: Option<SpriteSet>,
    #[serde(default)]
    pub home: Option<SpriteSet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sprites {
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

/// `/pokemon/{id}/`.
#[derive(Debug, Clone, Deserialize)]
pub struct PokemonDetail {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub sprites: Sprites,
}

impl PokemonDetail {
    /// Image URLs in preference order: official artwork, dream world, home,
    /// then the default sprite. Blank entries and repeats are dropped.
    pub fn image_candidates(&self) -> Vec<String> {
        let other = self.sprites.other.as_ref();
        let pick = |set: Option<&SpriteSet>| set.and_then(|s| s.front_default.clone());

        let ordered = [
            pick(other.and_then(|o| o.official_artwork.as_ref())),
            pick(other.and_then(|o| o.dream_world.as_ref())),
            pick(other.and_then(|o| o.home.as_ref())),
            self.sprites.front_default.clone(),
        ];

        let mut out: Vec<String> = Vec::new();
        for url in ordered.into_iter().flatten() {
            let url = url.trim();
            if !url.is_empty() && !out.iter().any(|u| u == url) {
                out.push(url.to_string());
            }
        }
        out
    }

    /// Type names ordered by slot.
    pub fn type_names(&self) -> Vec<String> {
        let mut slots: Vec<&TypeSlot> = self.types.iter().collect();
        slots.sort_by_key(|t| t.slot);
        slots.into_iter().map(|t| t.kind.name.clone()).collect()
    }
}
