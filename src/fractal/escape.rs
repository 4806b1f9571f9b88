//! エスケープタイム計算とバンド分類

use super::params::EscapeThresholds;
use crate::palette::{ColorIndex, Palette};

/// 脱出半径2の二乗
pub const ESCAPE_RADIUS_SQ: f64 = 4.0;

/// 反復回数によるバンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    /// すぐに発散（背景）
    Background,
    Band1,
    Band2,
    /// 反復上限まで発散しない（集合内）
    Band3,
}

impl Band {
    pub const ALL: [Band; 4] = [Band::Background, Band::Band1, Band::Band2, Band::Band3];

    /// パレット内の位置
    pub fn slot(self) -> usize {
        match self {
            Band::Background => 0,
            Band::Band1 => 1,
            Band::Band2 => 2,
            Band::Band3 => 3,
        }
    }

    pub fn color(self, palette: &Palette) -> ColorIndex {
        match self {
            Band::Background => palette.background(),
            Band::Band1 => palette.band1(),
            Band::Band2 => palette.band2(),
            Band::Band3 => palette.band3(),
        }
    }
}

/// z <- z^2 + c を |z| >= 2 になるか上限に達するまで反復し、回数を返す
#[inline]
pub fn escape_time(re: f64, im: f64, limit: u32) -> u32 {
    let mut zr = 0.0f64;
    let mut zi = 0.0f64;
    let mut zr2 = 0.0f64;
    let mut zi2 = 0.0f64;
    let mut k = 0u32;
    while k < limit && zr2 + zi2 < ESCAPE_RADIUS_SQ {
        let p = zr2 - zi2 + re;
        zi = 2.0 * zr * zi + im;
        zr = p;
        zr2 = zr * zr;
        zi2 = zi * zi;
        k += 1;
    }
    k
}

/// 反復回数をバンドに分類
///
/// 上限到達は閾値に関係なく常に Band3
#[inline]
pub fn classify(k: u32, limit: u32, thresholds: EscapeThresholds) -> Band {
    if k == limit {
        Band::Band3
    } else if k > thresholds.color1 {
        Band::Band2
    } else if k > thresholds.color2 {
        Band::Band1
    } else {
        Band::Background
    }
}
