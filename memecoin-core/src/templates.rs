//! Static Content Tables
//!
//! Meme templates for client-side composition and the trend seed set used to
//! prime an empty store.

use serde::Serialize;

use crate::types::TrendCategory;

/// Text placement box on a template image, in percent coordinates
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TextArea {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub placeholder: &'static str,
}

/// A meme template
#[derive(Debug, Clone, Serialize)]
pub struct MemeTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub image_url: &'static str,
    pub text_areas: &'static [TextArea],
}

const DRAKE_AREAS: [TextArea; 2] = [
    TextArea { x: 50, y: 20, width: 40, height: Some(30), placeholder: "Thing you don't like" },
    TextArea { x: 50, y: 60, width: 40, height: Some(30), placeholder: "Thing you like" },
];

const DISTRACTED_AREAS: [TextArea; 3] = [
    TextArea { x: 10, y: 80, width: 25, height: None, placeholder: "Loyal thing" },
    TextArea { x: 40, y: 10, width: 25, height: None, placeholder: "New shiny thing" },
    TextArea { x: 70, y: 80, width: 25, height: None, placeholder: "You" },
];

const EXPANDING_AREAS: [TextArea; 4] = [
    TextArea { x: 50, y: 10, width: 45, height: None, placeholder: "Basic idea" },
    TextArea { x: 50, y: 30, width: 45, height: None, placeholder: "Better idea" },
    TextArea { x: 50, y: 50, width: 45, height: None, placeholder: "Great idea" },
    TextArea { x: 50, y: 70, width: 45, height: None, placeholder: "Galaxy brain idea" },
];

const MEME_TEMPLATES: [MemeTemplate; 3] = [
    MemeTemplate {
        id: "drake",
        name: "Drake Pointing",
        image_url: "/templates/drake.jpg",
        text_areas: &DRAKE_AREAS,
    },
    MemeTemplate {
        id: "distracted",
        name: "Distracted Boyfriend",
        image_url: "/templates/distracted.jpg",
        text_areas: &DISTRACTED_AREAS,
    },
    MemeTemplate {
        id: "expanding",
        name: "Expanding Brain",
        image_url: "/templates/expanding.jpg",
        text_areas: &EXPANDING_AREAS,
    },
];

/// Built-in meme template set
pub fn meme_templates() -> &'static [MemeTemplate] {
    &MEME_TEMPLATES
}

/// Seed entry for the trend table
#[derive(Debug, Clone, Copy)]
pub struct TrendSeed {
    pub keyword: &'static str,
    pub category: TrendCategory,
    pub frequency: u64,
}

const TREND_SEEDS: [TrendSeed; 8] = [
    TrendSeed { keyword: "DeFi", category: TrendCategory::Crypto, frequency: 95 },
    TrendSeed { keyword: "NFTs", category: TrendCategory::Crypto, frequency: 87 },
    TrendSeed { keyword: "Base Chain", category: TrendCategory::Crypto, frequency: 92 },
    TrendSeed { keyword: "Meme Coins", category: TrendCategory::Crypto, frequency: 89 },
    TrendSeed { keyword: "Web3", category: TrendCategory::Tech, frequency: 78 },
    TrendSeed { keyword: "AI", category: TrendCategory::Tech, frequency: 85 },
    TrendSeed { keyword: "Crypto Winter", category: TrendCategory::Finance, frequency: 72 },
    TrendSeed { keyword: "HODL", category: TrendCategory::Culture, frequency: 88 },
];

/// Seed trends used when the trend table is empty
pub fn trend_seeds() -> &'static [TrendSeed] {
    &TREND_SEEDS
}
