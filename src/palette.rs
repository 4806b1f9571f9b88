//! DAI カラーパレット
//!
//! DAIは16色のカラーテーブルを持ち、4色モードではそのうち4色を
//! COLORG で選択して使用する

use serde::{Deserialize, Serialize};
use std::fmt;

/// DAIの16色カラーテーブル（0x00RRGGBB）
pub const DAI_COLORS: [u32; 16] = [
    0x000000, // 0: Black
    0x00008B, // 1: Dark Blue
    0xB10095, // 2: Purple Red
    0xFF0000, // 3: Red
    0x752E50, // 4: Purple Brown
    0x00B238, // 5: Emerald Green
    0x986200, // 6: Khaki Brown
    0xAE7A00, // 7: Mustard Brown
    0x898989, // 8: Grey
    0xA16FFF, // 9: Middle Blue
    0xFFA500, // 10: Orange
    0xFF99FF, // 11: Pink
    0x9EF4FF, // 12: Light Blue
    0xB3FFBB, // 13: Light Green
    0xFFFF28, // 14: Light Yellow
    0xFFFFFF, // 15: White
];

/// 色名（ログ表示用）
const COLOR_NAMES: [&str; 16] = [
    "black",
    "dark blue",
    "purple red",
    "red",
    "purple brown",
    "emerald green",
    "khaki brown",
    "mustard brown",
    "grey",
    "middle blue",
    "orange",
    "pink",
    "light blue",
    "light green",
    "light yellow",
    "white",
];

/// カラーテーブルのインデックス (0-15)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ColorIndex(u8);

impl ColorIndex {
    pub const MAX: u8 = 15;

    pub const BLACK: ColorIndex = ColorIndex(0);
    pub const RED: ColorIndex = ColorIndex(3);
    pub const GREEN: ColorIndex = ColorIndex(5);
    pub const ORANGE: ColorIndex = ColorIndex(10);
    pub const WHITE: ColorIndex = ColorIndex(15);

    pub fn new(value: u8) -> Result<Self, InvalidColor> {
        if value > Self::MAX {
            return Err(InvalidColor(value));
        }
        Ok(ColorIndex(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// RGB値 (0x00RRGGBB)
    pub fn rgb(self) -> u32 {
        DAI_COLORS[self.0 as usize]
    }

    pub fn name(self) -> &'static str {
        COLOR_NAMES[self.0 as usize]
    }
}

impl TryFrom<u8> for ColorIndex {
    type Error = InvalidColor;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ColorIndex::new(value)
    }
}

impl From<ColorIndex> for u8 {
    fn from(color: ColorIndex) -> u8 {
        color.0
    }
}

impl fmt::Display for ColorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 範囲外の色番号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidColor(pub u8);

impl fmt::Display for InvalidColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "color {} is out of range 0-{}", self.0, ColorIndex::MAX)
    }
}

impl std::error::Error for InvalidColor {}

/// 4色モードのパレット（COLORG相当）
///
/// 並び順は {背景, バンド1, バンド2, バンド3}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette(pub [ColorIndex; 4]);

impl Default for Palette {
    /// 白背景、緑、オレンジ、赤
    fn default() -> Self {
        Palette([
            ColorIndex::WHITE,
            ColorIndex::GREEN,
            ColorIndex::ORANGE,
            ColorIndex::RED,
        ])
    }
}

impl Palette {
    pub fn from_values(values: [u8; 4]) -> Result<Self, InvalidColor> {
        Ok(Palette([
            ColorIndex::new(values[0])?,
            ColorIndex::new(values[1])?,
            ColorIndex::new(values[2])?,
            ColorIndex::new(values[3])?,
        ]))
    }

    pub fn background(&self) -> ColorIndex {
        self.0[0]
    }

    pub fn band1(&self) -> ColorIndex {
        self.0[1]
    }

    pub fn band2(&self) -> ColorIndex {
        self.0[2]
    }

    pub fn band3(&self) -> ColorIndex {
        self.0[3]
    }

    pub fn contains(&self, color: ColorIndex) -> bool {
        self.0.contains(&color)
    }

    /// パレット内の位置 (0-3)
    pub fn slot_of(&self, color: ColorIndex) -> Option<usize> {
        self.0.iter().position(|&c| c == color)
    }

    pub fn values(&self) -> [u8; 4] {
        [self.0[0].0, self.0[1].0, self.0[2].0, self.0[3].0]
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|c| c.name()).collect();
        write!(f, "{}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_range() {
        assert!(ColorIndex::new(0).is_ok());
        assert!(ColorIndex::new(15).is_ok());
        assert_eq!(ColorIndex::new(16), Err(InvalidColor(16)));
    }

    #[test]
    fn test_default_palette() {
        let palette = Palette::default();
        assert_eq!(palette.values(), [15, 5, 10, 3]);
        assert_eq!(palette.band3().rgb(), 0xFF0000);
        assert_eq!(palette.to_string(), "white, emerald green, orange, red");
    }

    #[test]
    fn test_palette_serde() {
        let palette = Palette::from_values([0, 10, 5, 15]).unwrap();
        let json = serde_json::to_string(&palette).unwrap();
        assert_eq!(json, "[0,10,5,15]");
        let back: Palette = serde_json::from_str(&json).unwrap();
        assert_eq!(back, palette);
        assert!(serde_json::from_str::<Palette>("[0,10,5,16]").is_err());
    }

    #[test]
    fn test_slot_of() {
        let palette = Palette::default();
        assert_eq!(palette.slot_of(ColorIndex::RED), Some(3));
        assert_eq!(palette.slot_of(ColorIndex::BLACK), None);
    }
}
