//! Bridge material calculator.
//!
//! A bridge of a given length is laid out as a fixed sequence of sections
//! (abutments at the ends, crowns or supports in between). Each section type
//! has a per-unit material list for the bridge style, scaled by the width.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::domain::{ItemCode, MaterialAmounts};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BridgeType {
    Rope,
    FlatWood,
    FlatStone,
    FlatMarble,
    FlatSlate,
    FlatRoundedStone,
    FlatPottery,
    FlatSandstone,
    FlatRendered,
    ArchedWood,
    ArchedBrick,
    ArchedMarble,
    ArchedSlate,
    ArchedRoundedStone,
    ArchedPottery,
    ArchedSandstone,
    ArchedRendered,
}

impl BridgeType {
    pub const ALL: [BridgeType; 17] = [
        BridgeType::Rope,
        BridgeType::FlatWood,
        BridgeType::FlatStone,
        BridgeType::FlatMarble,
        BridgeType::FlatSlate,
        BridgeType::FlatRoundedStone,
        BridgeType::FlatPottery,
        BridgeType::FlatSandstone,
        BridgeType::FlatRendered,
        BridgeType::ArchedWood,
        BridgeType::ArchedBrick,
        BridgeType::ArchedMarble,
        BridgeType::ArchedSlate,
        BridgeType::ArchedRoundedStone,
        BridgeType::ArchedPottery,
        BridgeType::ArchedSandstone,
        BridgeType::ArchedRendered,
    ];

    pub fn code(self) -> &'static str {
        match self {
            BridgeType::Rope => "ROPE",
            BridgeType::FlatWood => "FLAT_WOOD",
            BridgeType::FlatStone => "FLAT_STONE",
            BridgeType::FlatMarble => "FLAT_MARBLE",
            BridgeType::FlatSlate => "FLAT_SLATE",
            BridgeType::FlatRoundedStone => "FLAT_ROUNDED_STONE",
            BridgeType::FlatPottery => "FLAT_POTTERY",
            BridgeType::FlatSandstone => "FLAT_SANDSTONE",
            BridgeType::FlatRendered => "FLAT_RENDERED",
            BridgeType::ArchedWood => "ARCHED_WOOD",
            BridgeType::ArchedBrick => "ARCHED_BRICK",
            BridgeType::ArchedMarble => "ARCHED_MARBLE",
            BridgeType::ArchedSlate => "ARCHED_SLATE",
            BridgeType::ArchedRoundedStone => "ARCHED_ROUNDED_STONE",
            BridgeType::ArchedPottery => "ARCHED_POTTERY",
            BridgeType::ArchedSandstone => "ARCHED_SANDSTONE",
            BridgeType::ArchedRendered => "ARCHED_RENDERED",
        }
    }

    /// Human label, e.g. `Flat rounded stone`.
    pub fn label(self) -> String {
        let code = self.code();
        let mut label = code[..1].to_string();
        label.push_str(&code[1..].to_lowercase().replace('_', " "));
        label
    }
}

impl fmt::Display for BridgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown bridge type '{0}'")]
pub struct ParseBridgeTypeError(String);

impl FromStr for BridgeType {
    type Err = ParseBridgeTypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        BridgeType::ALL
            .into_iter()
            .find(|kind| kind.code() == wanted)
            .ok_or_else(|| ParseBridgeTypeError(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BridgeSection {
    Abutment,
    DoubleAbutment,
    Support,
    Crown,
    Bracing,
}

impl fmt::Display for BridgeSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            BridgeSection::Abutment => "ABUTMENT",
            BridgeSection::DoubleAbutment => "DOUBLE_ABUTMENT",
            BridgeSection::Support => "SUPPORT",
            BridgeSection::Crown => "CROWN",
            BridgeSection::Bracing => "BRACING",
        };
        f.write_str(code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectionMaterial {
    pub code: ItemCode,
    pub amount: f64,
}

const fn mat(code: ItemCode, amount: f64) -> SectionMaterial {
    SectionMaterial { code, amount }
}

pub type BridgeMaterials = HashMap<BridgeSection, Vec<SectionMaterial>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeCost {
    pub sections: Vec<BridgeSection>,
    pub total_mats: MaterialAmounts,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("Unspecified cost for bridge type {0}")]
    UnspecifiedType(BridgeType),
    #[error("Unspecified cost for bridge section {1} of bridge type {0}")]
    UnspecifiedSection(BridgeType, BridgeSection),
}

/// Material tables and section layouts per bridge style.
///
/// Layouts are indexed by bridge length: `layouts[kind][length - 1]`. A
/// style or length without a layout resolves to no sections at all.
#[derive(Debug, Clone, Default)]
pub struct BridgeCatalog {
    materials: HashMap<BridgeType, BridgeMaterials>,
    layouts: HashMap<BridgeType, Vec<Vec<BridgeSection>>>,
}

impl BridgeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in catalog.
    pub fn standard() -> &'static BridgeCatalog {
        static STANDARD: OnceLock<BridgeCatalog> = OnceLock::new();
        STANDARD.get_or_init(build_standard_catalog)
    }

    pub fn with_materials(mut self, kind: BridgeType, materials: BridgeMaterials) -> Self {
        self.materials.insert(kind, materials);
        self
    }

    pub fn with_layouts(mut self, kind: BridgeType, layouts: Vec<Vec<BridgeSection>>) -> Self {
        self.layouts.insert(kind, layouts);
        self
    }

    pub fn materials(&self, kind: BridgeType) -> Option<&BridgeMaterials> {
        self.materials.get(&kind)
    }

    pub fn sections(&self, kind: BridgeType, length: u32) -> Vec<BridgeSection> {
        let Some(index) = (length as usize).checked_sub(1) else {
            return Vec::new();
        };
        self.layouts
            .get(&kind)
            .and_then(|layouts| layouts.get(index))
            .cloned()
            .unwrap_or_default()
    }

    pub fn cost(&self, kind: BridgeType, length: u32, width: u32) -> Result<BridgeCost, BridgeError> {
        let section_costs = self
            .materials(kind)
            .ok_or(BridgeError::UnspecifiedType(kind))?;

        let sections = self.sections(kind, length);
        let mut total_mats = MaterialAmounts::new();
        for section in &sections {
            let materials = section_costs
                .get(section)
                .ok_or(BridgeError::UnspecifiedSection(kind, *section))?;
            for material in materials {
                total_mats.add(material.code, material.amount * f64::from(width));
            }
        }

        Ok(BridgeCost {
            sections,
            total_mats,
        })
    }
}

pub fn calc_bridge_cost(kind: BridgeType, length: u32, width: u32) -> Result<BridgeCost, BridgeError> {
    BridgeCatalog::standard().cost(kind, length, width)
}

fn flat_wood_materials() -> BridgeMaterials {
    use ItemCode::*;
    HashMap::from([
        (
            BridgeSection::Abutment,
            vec![
                mat(LargeNails, 4.0),
                mat(SmallNails, 2.0),
                mat(WoodenBeam, 8.0),
                mat(Shaft, 4.0),
                mat(Plank, 24.0),
                mat(IronRibbon, 4.0),
            ],
        ),
        (
            BridgeSection::Support,
            vec![
                mat(LargeNails, 7.0),
                mat(SmallNails, 2.0),
                mat(WoodenBeam, 20.0),
                mat(Shaft, 4.0),
                mat(Plank, 24.0),
                mat(IronRibbon, 10.0),
            ],
        ),
        (
            BridgeSection::Crown,
            vec![
                mat(LargeNails, 3.0),
                mat(SmallNails, 2.0),
                mat(WoodenBeam, 4.0),
                mat(Shaft, 4.0),
                mat(Plank, 24.0),
                mat(IronRibbon, 2.0),
            ],
        ),
    ])
}

/// Shared by every flat masonry style; only the brick differs.
fn flat_stone_materials(brick: ItemCode) -> BridgeMaterials {
    use ItemCode::{Mortar, StoneShard};
    HashMap::from([
        (
            BridgeSection::Support,
            vec![mat(brick, 172.0), mat(Mortar, 150.0), mat(StoneShard, 60.0)],
        ),
        (
            BridgeSection::DoubleAbutment,
            vec![mat(brick, 82.0), mat(Mortar, 60.0), mat(StoneShard, 24.0)],
        ),
        (
            BridgeSection::Abutment,
            vec![mat(brick, 40.0), mat(Mortar, 62.0), mat(StoneShard, 16.0)],
        ),
        (
            BridgeSection::Bracing,
            vec![mat(brick, 47.0), mat(Mortar, 25.0), mat(StoneShard, 8.0)],
        ),
    ])
}

fn flat_rendered_materials() -> BridgeMaterials {
    let clay = [
        (BridgeSection::Support, 18.0),
        (BridgeSection::DoubleAbutment, 9.0),
        (BridgeSection::Abutment, 7.0),
        (BridgeSection::Bracing, 5.0),
    ];
    let mut materials = flat_stone_materials(ItemCode::StoneBrick);
    for (section, amount) in clay {
        if let Some(list) = materials.get_mut(&section) {
            list.push(mat(ItemCode::Clay, amount));
        }
    }
    materials
}

fn flat_wood_layouts() -> Vec<Vec<BridgeSection>> {
    use BridgeSection::{Abutment, Crown, DoubleAbutment};
    vec![
        vec![DoubleAbutment],
        vec![Abutment, Abutment],
        vec![Abutment, Crown, Abutment],
        vec![Abutment, Crown, Crown, Abutment],
        vec![Abutment, Crown, Crown, Crown, Abutment],
    ]
}

fn build_standard_catalog() -> BridgeCatalog {
    let mut catalog = BridgeCatalog::new()
        .with_materials(BridgeType::FlatWood, flat_wood_materials())
        .with_materials(BridgeType::FlatStone, flat_stone_materials(ItemCode::StoneBrick))
        .with_materials(BridgeType::FlatMarble, flat_stone_materials(ItemCode::MarbleBrick))
        .with_materials(BridgeType::FlatSlate, flat_stone_materials(ItemCode::SlateBrick))
        .with_materials(
            BridgeType::FlatRoundedStone,
            flat_stone_materials(ItemCode::RoundedStone),
        )
        .with_materials(BridgeType::FlatPottery, flat_stone_materials(ItemCode::PotteryBrick))
        .with_materials(
            BridgeType::FlatSandstone,
            flat_stone_materials(ItemCode::SandstoneBrick),
        )
        .with_materials(BridgeType::FlatRendered, flat_rendered_materials())
        .with_layouts(BridgeType::FlatWood, flat_wood_layouts());

    // Styles without known costs are still registered, with empty tables.
    for kind in BridgeType::ALL {
        catalog.materials.entry(kind).or_default();
    }
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(cost: &BridgeCost) -> Vec<(ItemCode, f64)> {
        cost.total_mats.iter().collect()
    }

    #[test]
    fn flat_wood_length_two() {
        let cost = calc_bridge_cost(BridgeType::FlatWood, 2, 1).unwrap();
        assert_eq!(
            cost.sections,
            vec![BridgeSection::Abutment, BridgeSection::Abutment]
        );
        assert_eq!(
            totals(&cost),
            vec![
                (ItemCode::LargeNails, 8.0),
                (ItemCode::SmallNails, 4.0),
                (ItemCode::WoodenBeam, 16.0),
                (ItemCode::Shaft, 8.0),
                (ItemCode::Plank, 48.0),
                (ItemCode::IronRibbon, 8.0),
            ]
        );
    }

    #[test]
    fn flat_wood_longer_spans_add_crowns() {
        let cost = calc_bridge_cost(BridgeType::FlatWood, 3, 1).unwrap();
        assert_eq!(
            cost.sections,
            vec![
                BridgeSection::Abutment,
                BridgeSection::Crown,
                BridgeSection::Abutment
            ]
        );
        assert_eq!(
            totals(&cost),
            vec![
                (ItemCode::LargeNails, 11.0),
                (ItemCode::SmallNails, 6.0),
                (ItemCode::WoodenBeam, 20.0),
                (ItemCode::Shaft, 12.0),
                (ItemCode::Plank, 72.0),
                (ItemCode::IronRibbon, 10.0),
            ]
        );

        let cost = calc_bridge_cost(BridgeType::FlatWood, 4, 1).unwrap();
        assert_eq!(cost.sections.len(), 4);
        assert_eq!(
            totals(&cost),
            vec![
                (ItemCode::LargeNails, 14.0),
                (ItemCode::SmallNails, 8.0),
                (ItemCode::WoodenBeam, 24.0),
                (ItemCode::Shaft, 16.0),
                (ItemCode::Plank, 96.0),
                (ItemCode::IronRibbon, 12.0),
            ]
        );

        let cost = calc_bridge_cost(BridgeType::FlatWood, 5, 1).unwrap();
        assert_eq!(
            totals(&cost),
            vec![
                (ItemCode::LargeNails, 17.0),
                (ItemCode::SmallNails, 10.0),
                (ItemCode::WoodenBeam, 28.0),
                (ItemCode::Shaft, 20.0),
                (ItemCode::Plank, 120.0),
                (ItemCode::IronRibbon, 14.0),
            ]
        );
    }

    #[test]
    fn single_tile_uses_double_abutment_missing_from_wood_table() {
        let err = calc_bridge_cost(BridgeType::FlatWood, 1, 1).unwrap_err();
        assert_eq!(
            err,
            BridgeError::UnspecifiedSection(BridgeType::FlatWood, BridgeSection::DoubleAbutment)
        );
    }

    #[test]
    fn width_scales_every_material() {
        let narrow = calc_bridge_cost(BridgeType::FlatWood, 3, 1).unwrap();
        let wide = calc_bridge_cost(BridgeType::FlatWood, 3, 3).unwrap();
        for (code, amount) in narrow.total_mats.iter() {
            assert_eq!(wide.total_mats.get(code), amount * 3.0);
        }
    }

    #[test]
    fn unknown_layouts_cost_nothing() {
        let cost = calc_bridge_cost(BridgeType::FlatStone, 3, 2).unwrap();
        assert!(cost.sections.is_empty());
        assert!(cost.total_mats.is_empty());
        let cost = calc_bridge_cost(BridgeType::FlatWood, 9, 1).unwrap();
        assert!(cost.sections.is_empty());
        let cost = calc_bridge_cost(BridgeType::ArchedBrick, 2, 1).unwrap();
        assert!(cost.sections.is_empty());
        let cost = calc_bridge_cost(BridgeType::FlatWood, 0, 1).unwrap();
        assert!(cost.sections.is_empty());
    }

    #[test]
    fn flat_masonry_shares_template() {
        let catalog = BridgeCatalog::standard();
        let marble = catalog.materials(BridgeType::FlatMarble).unwrap();
        let support = &marble[&BridgeSection::Support];
        assert_eq!(support[0], mat(ItemCode::MarbleBrick, 172.0));
        assert_eq!(support[1], mat(ItemCode::Mortar, 150.0));

        let rendered = catalog.materials(BridgeType::FlatRendered).unwrap();
        let abutment = &rendered[&BridgeSection::Abutment];
        assert_eq!(abutment.len(), 4);
        assert_eq!(abutment[0], mat(ItemCode::StoneBrick, 40.0));
        assert_eq!(abutment[3], mat(ItemCode::Clay, 7.0));
    }

    #[test]
    fn custom_catalog_reports_missing_configuration() {
        let catalog = BridgeCatalog::new();
        assert_eq!(
            catalog.cost(BridgeType::FlatStone, 2, 1).unwrap_err(),
            BridgeError::UnspecifiedType(BridgeType::FlatStone)
        );

        let catalog = BridgeCatalog::new()
            .with_materials(BridgeType::FlatStone, flat_stone_materials(ItemCode::StoneBrick))
            .with_layouts(
                BridgeType::FlatStone,
                vec![
                    vec![BridgeSection::DoubleAbutment],
                    vec![BridgeSection::Abutment, BridgeSection::Abutment],
                ],
            );
        let cost = catalog.cost(BridgeType::FlatStone, 2, 2).unwrap();
        assert_eq!(cost.total_mats.get(ItemCode::StoneBrick), 160.0);
        assert_eq!(cost.total_mats.get(ItemCode::Mortar), 248.0);
        assert_eq!(cost.total_mats.get(ItemCode::StoneShard), 64.0);
    }

    #[test]
    fn labels_read_naturally() {
        assert_eq!(BridgeType::FlatRoundedStone.label(), "Flat rounded stone");
        assert_eq!("flat-wood".parse::<BridgeType>().unwrap(), BridgeType::FlatWood);
    }
}
