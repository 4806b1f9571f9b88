//! 設定ファイル管理モジュール
//!
//! 描画パラメータと出力設定をJSON形式で永続化

use crate::fractal::{FractalParams, FractalSettings, ParamError};
use crate::screenshot;
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use std::fs;
use std::path::{Path, PathBuf};

/// 設定ファイルのデフォルトファイル名
pub const CONFIG_FILENAME: &str = "daifract_config.json";

/// 実行ファイルのディレクトリを取得
pub fn get_exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// 相対パスを指定されたベースディレクトリからの絶対パスに解決
pub fn resolve_path_with_base(base: &Path, relative: &str) -> PathBuf {
    let path = Path::new(relative);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(relative)
    }
}

/// 設定ファイルのパスを取得
pub fn get_config_path() -> PathBuf {
    get_exe_dir().join(CONFIG_FILENAME)
}

/// アプリケーション設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// フラクタル描画パラメータ
    #[serde(default)]
    pub fractal: FractalSettings,
    /// PNG出力ディレクトリ
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// 表示・出力の拡大率
    #[serde(default = "default_scale")]
    pub scale: usize,
    /// 行単位の並列計算
    #[serde(default)]
    pub parallel: bool,
    /// 並列計算のスレッド数（0=自動）
    #[serde(default)]
    pub threads: usize,
    /// ウィンドウ表示時に1フレームで計算する行数
    #[serde(default = "default_rows_per_frame")]
    pub rows_per_frame: usize,
}

fn default_output_dir() -> String {
    "screenshots".to_string()
}

fn default_scale() -> usize {
    2
}

fn default_rows_per_frame() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Config {
            fractal: FractalSettings::default(),
            output_dir: default_output_dir(),
            scale: default_scale(),
            parallel: false,
            threads: 0,
            rows_per_frame: default_rows_per_frame(),
        }
    }
}

impl Config {
    /// オプション指定で設定ファイルを読み込む
    /// 優先順位:
    /// 1. config_path が指定されている場合はそれを使用
    /// 2. カレントディレクトリの daifract_config.json
    /// 3. 実行ファイルディレクトリの daifract_config.json
    pub fn load_with_options(config_path: Option<&str>) -> Result<(Self, PathBuf), String> {
        let config_file_path = if let Some(path) = config_path {
            PathBuf::from(path)
        } else {
            let local = PathBuf::from(CONFIG_FILENAME);
            if local.exists() {
                local
            } else {
                get_config_path()
            }
        };
        let config = Self::load_from(&config_file_path)?;
        Ok((config, config_file_path))
    }

    /// 指定したパスから設定を読み込む
    ///
    /// ファイルが無い、またはJSONとして読めない場合はデフォルト設定。
    /// JSONとしては正しいが値が不正（範囲外の色番号、型違いなど）な場合はエラー
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return Ok(Config::default()),
        };
        match serde_json::from_str(&content) {
            Ok(config) => {
                log::info!("Loaded config {:?}", path.as_ref());
                Ok(config)
            }
            Err(e) if e.classify() == Category::Data => {
                Err(format!("Invalid value in config {:?}: {}", path.as_ref(), e))
            }
            Err(e) => {
                log::warn!("Failed to parse config {:?}: {}, using defaults", path.as_ref(), e);
                Ok(Config::default())
            }
        }
    }

    /// 指定したパスに設定を保存する
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        fs::write(path, json)
            .map_err(|e| format!("Failed to write config: {}", e))?;
        Ok(())
    }

    /// 描画パラメータを検証
    pub fn fractal_params(&self) -> Result<FractalParams, ParamError> {
        FractalParams::new(self.fractal)
    }

    /// 表示・出力に使う拡大率（1..=16）
    pub fn display_scale(&self) -> usize {
        screenshot::clamp_scale(self.scale)
    }

    /// 出力ディレクトリの絶対パスを取得（相対パスはカレントディレクトリ基準）
    pub fn output_dir_path(&self) -> PathBuf {
        let base = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        resolve_path_with_base(&base, &self.output_dir)
    }

    /// ディレクトリが存在しなければ作成
    pub fn ensure_output_dir(&self) -> std::io::Result<PathBuf> {
        let dir = self.output_dir_path();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fractal::PixelMapping;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("daifract_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("roundtrip");
        let mut config = Config::default();
        config.fractal.max_iterations = 100;
        config.fractal.mapping = PixelMapping::Inclusive;
        config.parallel = true;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.fractal.max_iterations, 100);
        assert_eq!(loaded.fractal.mapping, PixelMapping::Inclusive);
        assert_eq!(loaded.fractal.palette, config.fractal.palette);
        assert_eq!(loaded.fractal.grid, config.fractal.grid);
        assert!((loaded.fractal.window.re_min - config.fractal.window.re_min).abs() < 1e-12);
        assert!(loaded.parallel);
        assert!(loaded.fractal_params().is_ok());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_or_broken_file_uses_defaults() {
        assert_eq!(Config::load_from(temp_path("missing")).unwrap(), Config::default());

        let path = temp_path("broken");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_out_of_range_color_is_an_error() {
        let path = temp_path("bad_color");
        fs::write(
            &path,
            r#"{"scale": 5, "fractal": {"max_iterations": 100, "palette": [16, 5, 10, 3]}}"#,
        )
        .unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.contains("color 16 is out of range"), "{}", err);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_wrong_value_type_is_an_error() {
        let path = temp_path("bad_type");
        fs::write(&path, r#"{"scale": "big"}"#).unwrap();
        assert!(Config::load_from(&path).is_err());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_partial_file() {
        let path = temp_path("partial");
        fs::write(&path, r#"{"scale": 3, "fractal": {"max_iterations": 64}}"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.scale, 3);
        assert_eq!(config.fractal.max_iterations, 64);
        assert_eq!(config.output_dir, "screenshots");
        assert_eq!(config.rows_per_frame, 4);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_display_scale_is_clamped() {
        let mut config = Config::default();
        assert_eq!(config.display_scale(), 2);
        config.scale = 0;
        assert_eq!(config.display_scale(), 1);
        config.scale = 100_000;
        assert_eq!(config.display_scale(), screenshot::MAX_SCALE);
    }

    #[test]
    fn test_invalid_params_are_reported() {
        let mut config = Config::default();
        config.fractal.thresholds.color1 = 50;
        assert!(config.fractal_params().is_err());
    }

    #[test]
    fn test_resolve_path() {
        let base = Path::new("/base");
        assert_eq!(resolve_path_with_base(base, "out"), PathBuf::from("/base/out"));
        assert_eq!(resolve_path_with_base(base, "/abs/out"), PathBuf::from("/abs/out"));
    }
}
