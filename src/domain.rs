//! Core value types shared by every calculator.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Planar tile coordinate, serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected a coordinate pair like '120,340', got '{0}'")]
pub struct ParsePointError(String);

impl FromStr for Point {
    type Err = ParsePointError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim().trim_start_matches('(').trim_end_matches(')');
        let (x, y) = trimmed
            .split_once(',')
            .ok_or_else(|| ParsePointError(value.to_string()))?;
        let x = x
            .trim()
            .parse::<f64>()
            .map_err(|_| ParsePointError(value.to_string()))?;
        let y = y
            .trim()
            .parse::<f64>()
            .map_err(|_| ParsePointError(value.to_string()))?;
        Ok(Self { x, y })
    }
}

/// Straight segment between two points, serialized as `[[x, y], [x, y]]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[Point; 2]", into = "[Point; 2]")]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn dx(&self) -> f64 {
        self.end.x - self.start.x
    }

    pub fn dy(&self) -> f64 {
        self.end.y - self.start.y
    }
}

impl From<[Point; 2]> for Line {
    fn from([start, end]: [Point; 2]) -> Self {
        Self { start, end }
    }
}

impl From<Line> for [Point; 2] {
    fn from(line: Line) -> Self {
        [line.start, line.end]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemCode {
    StoneShard,
    StoneBrick,
    MarbleBrick,
    SlateBrick,
    RoundedStone,
    PotteryBrick,
    SandstoneBrick,
    PileOfSand,
    BlindCatseye,
    Catseye,
    Mortar,
    Clay,
    LargeNails,
    SmallNails,
    WoodenBeam,
    Shaft,
    Plank,
    IronRibbon,
}

impl ItemCode {
    pub const ALL: [ItemCode; 18] = [
        ItemCode::StoneShard,
        ItemCode::StoneBrick,
        ItemCode::MarbleBrick,
        ItemCode::SlateBrick,
        ItemCode::RoundedStone,
        ItemCode::PotteryBrick,
        ItemCode::SandstoneBrick,
        ItemCode::PileOfSand,
        ItemCode::BlindCatseye,
        ItemCode::Catseye,
        ItemCode::Mortar,
        ItemCode::Clay,
        ItemCode::LargeNails,
        ItemCode::SmallNails,
        ItemCode::WoodenBeam,
        ItemCode::Shaft,
        ItemCode::Plank,
        ItemCode::IronRibbon,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ItemCode::StoneShard => "Stone shards",
            ItemCode::StoneBrick => "Stone bricks",
            ItemCode::MarbleBrick => "Marble bricks",
            ItemCode::SlateBrick => "Slate bricks",
            ItemCode::RoundedStone => "Rounded stones",
            ItemCode::PotteryBrick => "Pottery bricks",
            ItemCode::SandstoneBrick => "Sandstone bricks",
            ItemCode::PileOfSand => "Piles of sand",
            ItemCode::BlindCatseye => "Blind catseyes",
            ItemCode::Catseye => "Catseyes",
            ItemCode::Mortar => "Mortar",
            ItemCode::Clay => "Clay",
            ItemCode::LargeNails => "Large nails",
            ItemCode::SmallNails => "Small nails",
            ItemCode::WoodenBeam => "Wooden beams",
            ItemCode::Shaft => "Shafts",
            ItemCode::Plank => "Planks",
            ItemCode::IronRibbon => "Iron ribbons",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            ItemCode::StoneShard => "STONE_SHARD",
            ItemCode::StoneBrick => "STONE_BRICK",
            ItemCode::MarbleBrick => "MARBLE_BRICK",
            ItemCode::SlateBrick => "SLATE_BRICK",
            ItemCode::RoundedStone => "ROUNDED_STONE",
            ItemCode::PotteryBrick => "POTTERY_BRICK",
            ItemCode::SandstoneBrick => "SANDSTONE_BRICK",
            ItemCode::PileOfSand => "PILE_OF_SAND",
            ItemCode::BlindCatseye => "BLIND_CATSEYE",
            ItemCode::Catseye => "CATSEYE",
            ItemCode::Mortar => "MORTAR",
            ItemCode::Clay => "CLAY",
            ItemCode::LargeNails => "LARGE_NAILS",
            ItemCode::SmallNails => "SMALL_NAILS",
            ItemCode::WoodenBeam => "WOODEN_BEAM",
            ItemCode::Shaft => "SHAFT",
            ItemCode::Plank => "PLANK",
            ItemCode::IronRibbon => "IRON_RIBBON",
        }
    }
}

impl fmt::Display for ItemCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown item code '{0}'")]
pub struct ParseItemCodeError(String);

impl FromStr for ItemCode {
    type Err = ParseItemCodeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        ItemCode::ALL
            .into_iter()
            .find(|code| code.code() == wanted)
            .ok_or_else(|| ParseItemCodeError(value.to_string()))
    }
}

/// Material totals keyed by item, kept in insertion order for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialAmounts(IndexMap<ItemCode, f64>);

impl MaterialAmounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an amount, keeping the original position of an existing key.
    pub fn set(&mut self, code: ItemCode, amount: f64) {
        self.0.insert(code, amount);
    }

    /// Adds to the running total for `code`.
    pub fn add(&mut self, code: ItemCode, amount: f64) {
        *self.0.entry(code).or_insert(0.0) += amount;
    }

    /// Amount for `code`, zero when absent.
    pub fn get(&self, code: ItemCode) -> f64 {
        self.0.get(&code).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, code: ItemCode) -> bool {
        self.0.contains_key(&code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemCode, f64)> + '_ {
        self.0.iter().map(|(code, amount)| (*code, *amount))
    }

    pub fn codes(&self) -> impl Iterator<Item = ItemCode> + '_ {
        self.0.keys().copied()
    }
}

impl FromIterator<(ItemCode, f64)> for MaterialAmounts {
    fn from_iter<T: IntoIterator<Item = (ItemCode, f64)>>(iter: T) -> Self {
        let mut amounts = MaterialAmounts::new();
        for (code, amount) in iter {
            amounts.add(code, amount);
        }
        amounts
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ingredient {
    pub code: ItemCode,
    pub weight: f64,
}

/// Crafting recipe by weight: `ingredients` produce one `result_weight` item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recipe {
    pub ingredients: &'static [Ingredient],
    pub result: ItemCode,
    pub result_weight: f64,
}

const STONE_BRICK_RECIPE: Recipe = Recipe {
    ingredients: &[Ingredient {
        code: ItemCode::StoneShard,
        weight: 15.0,
    }],
    result: ItemCode::StoneBrick,
    result_weight: 15.0,
};

const BLIND_CATSEYE_RECIPE: Recipe = Recipe {
    ingredients: &[Ingredient {
        code: ItemCode::StoneShard,
        weight: 0.55,
    }],
    result: ItemCode::BlindCatseye,
    result_weight: 0.50,
};

pub fn recipe(code: ItemCode) -> Option<&'static Recipe> {
    match code {
        ItemCode::StoneBrick => Some(&STONE_BRICK_RECIPE),
        ItemCode::BlindCatseye => Some(&BLIND_CATSEYE_RECIPE),
        _ => None,
    }
}

/// Expands craftable items into the raw ingredient weight (kg) they consume.
/// Items without a recipe are left out.
pub fn raw_ingredient_weights(amounts: &MaterialAmounts) -> MaterialAmounts {
    let mut raw = MaterialAmounts::new();
    for (code, amount) in amounts.iter() {
        if let Some(recipe) = recipe(code) {
            for ingredient in recipe.ingredients {
                raw.add(ingredient.code, ingredient.weight * amount);
            }
        }
    }
    raw
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Server {
    #[default]
    Xanadu,
    Celebration,
    Deliverance,
    Exodus,
    Independence,
    Pristine,
    Release,
    Cadence,
    Melody,
    Harmony,
}

/// Background image and size in tiles of a server map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapData {
    pub image_name: &'static str,
    pub map_size: [f64; 2],
}

impl Server {
    pub const ALL: [Server; 10] = [
        Server::Xanadu,
        Server::Celebration,
        Server::Deliverance,
        Server::Exodus,
        Server::Independence,
        Server::Pristine,
        Server::Release,
        Server::Cadence,
        Server::Melody,
        Server::Harmony,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Server::Xanadu => "XANADU",
            Server::Celebration => "CELEBRATION",
            Server::Deliverance => "DELIVERANCE",
            Server::Exodus => "EXODUS",
            Server::Independence => "INDEPENDENCE",
            Server::Pristine => "PRISTINE",
            Server::Release => "RELEASE",
            Server::Cadence => "CADENCE",
            Server::Melody => "MELODY",
            Server::Harmony => "HARMONY",
        }
    }

    /// Capitalized name, e.g. `Xanadu`.
    pub fn label(self) -> String {
        let code = self.code();
        let mut label = code[..1].to_string();
        label.push_str(&code[1..].to_lowercase());
        label
    }

    pub fn map_host(self) -> String {
        format!("https://{}.yaga.host", self.code().to_lowercase())
    }

    pub fn map_data(self) -> MapData {
        let (image_name, size) = match self {
            Server::Xanadu => ("xanadu", 8192.0),
            Server::Independence => ("independence", 4096.0),
            Server::Cadence => ("cadence", 4096.0),
            Server::Harmony => ("harmony", 4096.0),
            Server::Melody => ("melody", 2048.0),
            Server::Celebration => ("celebration", 2048.0),
            Server::Deliverance => ("deliverance", 2048.0),
            Server::Exodus => ("exodus", 2048.0),
            Server::Pristine => ("pristine", 2048.0),
            Server::Release => ("release", 2048.0),
        };
        MapData {
            image_name,
            map_size: [size, size],
        }
    }

    /// Deep link into the community map centred on `point`.
    pub fn map_link(self, point: Point) -> String {
        format!("{}/#{},{}", self.map_host(), point.x, point.y)
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown server '{0}'")]
pub struct ParseServerError(String);

impl FromStr for Server {
    type Err = ParseServerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_uppercase();
        Server::ALL
            .into_iter()
            .find(|server| server.code() == wanted)
            .ok_or_else(|| ParseServerError(value.to_string()))
    }
}
