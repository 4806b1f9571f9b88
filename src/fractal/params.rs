//! フラクタル描画パラメータと検証

use crate::canvas::GridSpec;
use crate::palette::Palette;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 複素平面上の描画範囲
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneWindow {
    pub re_min: f64,
    pub re_max: f64,
    pub im_min: f64,
    pub im_max: f64,
}

impl Default for PlaneWindow {
    fn default() -> Self {
        PlaneWindow {
            re_min: -1.85,
            re_max: 0.55,
            im_min: -1.2,
            im_max: 1.2,
        }
    }
}

impl PlaneWindow {
    pub fn width(&self) -> f64 {
        self.re_max - self.re_min
    }

    pub fn height(&self) -> f64 {
        self.im_max - self.im_min
    }

    /// 実軸に対して対称か（上下反転描画が使えるか）
    ///
    /// 反転した行が正確な鏡像になるのは `PixelMapping::Inclusive` のときだけ。
    /// `Span` では行 `ymax-y` に `im(y)` の色が入り、本来の値
    /// `-(im(y)+im_step)` とは1ステップずれる。中央の行 (im = 0) も
    /// 一度計算されたあと、ひとつ下の行の鏡像で上書きされる
    pub fn is_symmetric(&self) -> bool {
        let scale = self.im_min.abs().max(self.im_max.abs());
        (self.im_min + self.im_max).abs() <= scale * f64::EPSILON
    }
}

/// バンド境界となる反復回数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscapeThresholds {
    /// これを超えるとバンド2
    pub color1: u32,
    /// これを超えるとバンド1
    pub color2: u32,
}

impl Default for EscapeThresholds {
    fn default() -> Self {
        EscapeThresholds { color1: 12, color2: 7 }
    }
}

/// ピクセル座標から複素平面への写像方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelMapping {
    /// 範囲をピクセル数で割る（最後のピクセルは re_max の1ステップ手前）
    #[default]
    Span,
    /// 範囲を最大座標で割る（最後のピクセルがちょうど re_max / im_max）
    Inclusive,
}

/// 設定ファイルから読み込む生の描画設定
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FractalSettings {
    #[serde(default)]
    pub window: PlaneWindow,
    #[serde(default)]
    pub grid: GridSpec,
    #[serde(default)]
    pub palette: Palette,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default)]
    pub thresholds: EscapeThresholds,
    #[serde(default)]
    pub mapping: PixelMapping,
}

fn default_max_iterations() -> u32 {
    45
}

impl Default for FractalSettings {
    fn default() -> Self {
        FractalSettings {
            window: PlaneWindow::default(),
            grid: GridSpec::default(),
            palette: Palette::default(),
            max_iterations: default_max_iterations(),
            thresholds: EscapeThresholds::default(),
            mapping: PixelMapping::default(),
        }
    }
}

/// パラメータ検証エラー
#[derive(Debug, Clone, PartialEq)]
pub enum ParamError {
    /// 幅または高さが0
    EmptyGrid { width: u16, height: u16 },
    /// 範囲が有限でない
    NonFiniteWindow,
    /// re_max <= re_min
    EmptyRealRange { min: f64, max: f64 },
    /// im_max <= im_min
    EmptyImaginaryRange { min: f64, max: f64 },
    /// 反復回数が0
    ZeroIterations,
    /// color2 < color1 < max_iterations を満たさない
    ThresholdOrder { color1: u32, color2: u32, max_iterations: u32 },
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::EmptyGrid { width, height } => {
                write!(f, "grid {}x{} has no pixels", width, height)
            }
            ParamError::NonFiniteWindow => write!(f, "plane window bounds must be finite"),
            ParamError::EmptyRealRange { min, max } => {
                write!(f, "re_max ({}) must be greater than re_min ({})", max, min)
            }
            ParamError::EmptyImaginaryRange { min, max } => {
                write!(f, "im_max ({}) must be greater than im_min ({})", max, min)
            }
            ParamError::ZeroIterations => write!(f, "iteration limit must be positive"),
            ParamError::ThresholdOrder { color1, color2, max_iterations } => write!(
                f,
                "thresholds must satisfy {} < {} < {}",
                color2, color1, max_iterations
            ),
        }
    }
}

impl std::error::Error for ParamError {}

impl FractalSettings {
    pub fn validate(&self) -> Result<(), ParamError> {
        let grid = self.grid;
        if grid.width == 0 || grid.height == 0 {
            return Err(ParamError::EmptyGrid { width: grid.width, height: grid.height });
        }
        let w = self.window;
        if ![w.re_min, w.re_max, w.im_min, w.im_max].iter().all(|v| v.is_finite()) {
            return Err(ParamError::NonFiniteWindow);
        }
        if w.re_max <= w.re_min {
            return Err(ParamError::EmptyRealRange { min: w.re_min, max: w.re_max });
        }
        if w.im_max <= w.im_min {
            return Err(ParamError::EmptyImaginaryRange { min: w.im_min, max: w.im_max });
        }
        if self.max_iterations == 0 {
            return Err(ParamError::ZeroIterations);
        }
        let t = self.thresholds;
        if !(t.color2 < t.color1 && t.color1 < self.max_iterations) {
            return Err(ParamError::ThresholdOrder {
                color1: t.color1,
                color2: t.color2,
                max_iterations: self.max_iterations,
            });
        }
        Ok(())
    }
}

/// 検証済みの描画パラメータ
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalParams {
    settings: FractalSettings,
}

impl FractalParams {
    pub fn new(settings: FractalSettings) -> Result<Self, ParamError> {
        settings.validate()?;
        Ok(FractalParams { settings })
    }

    /// DAIデモと同じ設定（336x256, 45回, 白/緑/オレンジ/赤）
    pub fn reference() -> Self {
        FractalParams { settings: FractalSettings::default() }
    }

    pub fn window(&self) -> PlaneWindow {
        self.settings.window
    }

    pub fn grid(&self) -> GridSpec {
        self.settings.grid
    }

    pub fn palette(&self) -> Palette {
        self.settings.palette
    }

    pub fn max_iterations(&self) -> u32 {
        self.settings.max_iterations
    }

    pub fn thresholds(&self) -> EscapeThresholds {
        self.settings.thresholds
    }

    pub fn mapping(&self) -> PixelMapping {
        self.settings.mapping
    }
}
