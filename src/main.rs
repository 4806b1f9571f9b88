//! DAIFRACT - DAI Mandelbrot Demo in Rust
//!
//! DAIパーソナルコンピュータのモード6 (336x256, 4色) で
//! マンデルブロ集合を描くデモ。
//!
//! # 使用方法
//! ```text
//! daifract                          # ウィンドウに描画
//! daifract --headless -o out.png    # PNGに出力
//! daifract graphics-test            # グラフィックテスト画面
//! ```

use daifract::canvas::{FrameBuffer, GraphicsMode};
use daifract::config::Config;
use daifract::demo::{draw_graphics_test, GraphicsProbe};
use daifract::fractal::{CancelToken, FractalEngine, PixelMapping, PlaneWindow, RenderReport};
use daifract::palette::Palette;
use daifract::screenshot;
use clap::Parser;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use std::time::Instant;

/// DAIFRACT - DAI Mandelbrot Demo in Rust
#[derive(Parser, Debug)]
#[command(name = "daifract")]
#[command(author = "DAIFRACT Project")]
#[command(version = "0.2.0")]
#[command(about = "DAIFRACT - DAI Mandelbrot Demo in Rust", long_about = None)]
struct Args {
    /// 描画する画面 (mandelbrot, graphics-test)
    #[arg(default_value = "mandelbrot")]
    scene: String,

    /// 設定ファイル（JSON）
    #[arg(short, long)]
    config: Option<String>,

    /// 有効な設定をファイルに保存
    #[arg(long)]
    save_config: Option<String>,

    /// DAIグラフィックモード (0-11)。画面サイズを決める
    #[arg(short, long)]
    mode: Option<u8>,

    /// 反復回数の上限
    #[arg(short, long)]
    iterations: Option<u32>,

    /// 複素平面の範囲 re_min,re_max,im_min,im_max
    #[arg(long, allow_hyphen_values = true)]
    window: Option<String>,

    /// パレット（色番号4つ、例: 15,5,10,3）
    #[arg(long)]
    palette: Option<String>,

    /// バンド境界 color1,color2（例: 12,7）
    #[arg(long)]
    thresholds: Option<String>,

    /// 最後のピクセルが範囲の端に一致する写像を使う
    #[arg(long)]
    inclusive: bool,

    /// 行を並列に計算する（ヘッドレスモード）
    #[arg(long)]
    parallel: bool,

    /// 並列計算のスレッド数（0=自動）
    #[arg(long)]
    threads: Option<usize>,

    /// ヘッドレスモード（ウィンドウなし）
    #[arg(long)]
    headless: bool,

    /// 出力PNGファイル
    #[arg(short, long)]
    output: Option<String>,

    /// 拡大率 (1-16)
    #[arg(long)]
    scale: Option<usize>,

    /// 1フレームで計算する行数（ウィンドウ表示時）
    #[arg(long)]
    rows_per_frame: Option<usize>,
}

/// カンマ区切りの値をパース
fn parse_list<T: FromStr>(s: &str, count: usize) -> Option<Vec<T>> {
    let values: Vec<T> = s
        .split(',')
        .map(|v| v.trim().parse().ok())
        .collect::<Option<Vec<T>>>()?;
    if values.len() == count {
        Some(values)
    } else {
        None
    }
}

/// コマンドライン引数で設定を上書き
fn apply_args(config: &mut Config, args: &Args) -> Result<(), String> {
    if let Some(code) = args.mode {
        let mode = GraphicsMode::from_code(code)
            .ok_or_else(|| format!("Unknown graphics mode: {} (expected 0-11)", code))?;
        config.fractal.grid = mode.grid();
        log::info!("Using {} ({} colors)", mode.name(), mode.colors());
    }
    if let Some(iterations) = args.iterations {
        config.fractal.max_iterations = iterations;
    }
    if let Some(ref window) = args.window {
        let v: Vec<f64> = parse_list(window, 4)
            .ok_or_else(|| format!("Invalid window: {} (expected re_min,re_max,im_min,im_max)", window))?;
        config.fractal.window = PlaneWindow { re_min: v[0], re_max: v[1], im_min: v[2], im_max: v[3] };
    }
    if let Some(ref palette) = args.palette {
        let v: Vec<u8> = parse_list(palette, 4)
            .ok_or_else(|| format!("Invalid palette: {} (expected 4 colors)", palette))?;
        config.fractal.palette = Palette::from_values([v[0], v[1], v[2], v[3]]).map_err(|e| e.to_string())?;
    }
    if let Some(ref thresholds) = args.thresholds {
        let v: Vec<u32> = parse_list(thresholds, 2)
            .ok_or_else(|| format!("Invalid thresholds: {} (expected color1,color2)", thresholds))?;
        config.fractal.thresholds.color1 = v[0];
        config.fractal.thresholds.color2 = v[1];
    }
    if args.inclusive {
        config.fractal.mapping = PixelMapping::Inclusive;
    }
    if args.parallel {
        config.parallel = true;
    }
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    if let Some(scale) = args.scale {
        config.scale = screenshot::clamp_scale(scale);
    }
    if let Some(rows) = args.rows_per_frame {
        config.rows_per_frame = rows.max(1);
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    let (mut config, config_path) = match Config::load_with_options(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };
    log::debug!("Config path: {:?}", config_path);

    if let Err(e) = apply_args(&mut config, &args) {
        eprintln!("Error: {}", e);
        process::exit(2);
    }

    let params = match config.fractal_params() {
        Ok(params) => params,
        Err(e) => {
            eprintln!("Invalid parameters: {}", e);
            process::exit(2);
        }
    };

    if let Some(ref path) = args.save_config {
        match config.save_to(path) {
            Ok(()) => println!("Config saved to {}", path),
            Err(e) => eprintln!("{}", e),
        }
    }

    if config.threads > 0 {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build_global()
        {
            log::warn!("Failed to configure thread pool: {}", e);
        }
    }

    println!("DAIFRACT - DAI Mandelbrot Demo v0.2 ({})", args.scene);

    let engine = FractalEngine::new(params);
    let mut fb = FrameBuffer::new(params.grid());

    match args.scene.to_lowercase().as_str() {
        "mandelbrot" | "mandel" => {
            if args.headless {
                let report = run_headless(&engine, &mut fb, config.parallel);
                print_report(&report);
            } else {
                run_with_window(&engine, &mut fb, &config);
            }
        }
        "graphics-test" | "graphics" => {
            let probe = draw_graphics_test(&mut fb);
            print_probe(&probe);
            if !args.headless {
                show_framebuffer(&fb, &config);
            }
        }
        other => {
            eprintln!("Unknown scene: {} (mandelbrot, graphics-test)", other);
            process::exit(2);
        }
    }

    let output = args.output.map(PathBuf::from).or_else(|| {
        if args.headless {
            config
                .ensure_output_dir()
                .map(|dir| screenshot::timestamped_path(&dir, &args.scene))
                .map_err(|e| eprintln!("Failed to create output directory: {}", e))
                .ok()
        } else {
            None
        }
    });
    if let Some(path) = output {
        match screenshot::save_png(&path, &fb, config.display_scale()) {
            Ok(()) => println!("Image saved to {}", path.display()),
            Err(e) => {
                eprintln!("Failed to save image {}: {}", path.display(), e);
                process::exit(1);
            }
        }
    }
}

fn run_headless(engine: &FractalEngine, fb: &mut FrameBuffer, parallel: bool) -> RenderReport {
    if parallel {
        engine.generate_parallel(fb, &CancelToken::new())
    } else {
        engine.generate(fb)
    }
}

fn print_report(report: &RenderReport) {
    let mpix = report.pixels as f64 / report.elapsed.as_secs_f64().max(1e-9) / 1_000_000.0;
    println!(
        "Rendered {} rows / {} pixels in {:?} ({:.2} Mpixel/s){}",
        report.rows_rendered,
        report.pixels,
        report.elapsed,
        mpix,
        if report.cancelled { " [cancelled]" } else { "" }
    );
    println!(
        "Bands: background {}, band1 {}, band2 {}, band3 {}",
        report.band_counts[0], report.band_counts[1], report.band_counts[2], report.band_counts[3]
    );
}

fn print_probe(probe: &GraphicsProbe) {
    let show = |c: Option<daifract::palette::ColorIndex>| c.map_or("-".to_string(), |c| c.to_string());
    let expected = GraphicsProbe::expected();
    println!("Background 15 color {}", show(probe.background));
    println!("center 5 color {}", show(probe.center));
    println!("rectangle 3 color {}", show(probe.rectangle));
    if *probe != expected {
        eprintln!("Graphics test read-back mismatch");
    }
}

fn open_window(fb: &FrameBuffer, scale: usize, title: &str) -> Option<Window> {
    let grid = fb.grid();
    let width = grid.width as usize * scale;
    let height = grid.height as usize * scale;
    match Window::new(title, width, height, WindowOptions::default()) {
        Ok(mut window) => {
            window.set_target_fps(60);
            Some(window)
        }
        Err(e) => {
            eprintln!("Failed to create window: {}", e);
            None
        }
    }
}

/// F10でスクリーンショット
fn handle_screenshot_key(window: &Window, fb: &FrameBuffer, config: &Config) {
    if window.is_key_pressed(Key::F10, KeyRepeat::No) {
        match config.ensure_output_dir() {
            Ok(dir) => {
                let path = screenshot::timestamped_path(&dir, "screenshot");
                match screenshot::save_png(&path, fb, config.display_scale()) {
                    Ok(()) => println!("Screenshot saved to {}", path.display()),
                    Err(e) => println!("Failed to save screenshot: {}", e),
                }
            }
            Err(e) => println!("Failed to create screenshot directory: {}", e),
        }
    }
}

/// 描画済みのフレームバッファを表示するだけのループ
fn show_framebuffer(fb: &FrameBuffer, config: &Config) {
    let scale = config.display_scale();
    let Some(mut window) = open_window(fb, scale, "DAIFRACT - Graphics Test") else {
        return;
    };
    let grid = fb.grid();
    let buffer = fb.to_argb(scale);
    while window.is_open() && !window.is_key_down(Key::Escape) {
        handle_screenshot_key(&window, fb, config);
        if let Err(e) = window.update_with_buffer(&buffer, grid.width as usize * scale, grid.height as usize * scale) {
            log::warn!("Window update failed: {}", e);
            break;
        }
    }
}

/// 1フレームごとに数行ずつ計算しながら表示する
///
/// Escで描画を中断、もう一度Escでウィンドウを閉じる
fn run_with_window(engine: &FractalEngine, fb: &mut FrameBuffer, config: &Config) {
    let scale = config.display_scale();
    let Some(mut window) = open_window(fb, scale, "DAIFRACT - DAI Mandelbrot") else {
        return;
    };
    let grid = engine.params().grid();
    let (width, height) = (grid.width as usize * scale, grid.height as usize * scale);

    let cancel = CancelToken::new();
    let start = Instant::now();
    engine.prepare(fb);
    let mut rows = engine.row_order();
    let mut report = RenderReport::default();
    let mut finished = false;

    while window.is_open() {
        if window.is_key_pressed(Key::Escape, KeyRepeat::No) {
            if finished {
                break;
            }
            cancel.cancel();
        }

        if !finished {
            for _ in 0..config.rows_per_frame.max(1) {
                if cancel.is_cancelled() {
                    report.cancelled = true;
                    finished = true;
                    break;
                }
                match rows.next() {
                    Some(y) => {
                        let counts = engine.render_row(y, fb);
                        report.rows_rendered += 1;
                        report.pixels += counts.iter().sum::<u64>();
                        for (total, n) in report.band_counts.iter_mut().zip(counts) {
                            *total += n;
                        }
                    }
                    None => {
                        engine.draw_border(fb);
                        finished = true;
                        break;
                    }
                }
            }
            if finished {
                report.elapsed = start.elapsed();
                print_report(&report);
                window.set_title(if report.cancelled {
                    "DAIFRACT - DAI Mandelbrot (cancelled)"
                } else {
                    "DAIFRACT - DAI Mandelbrot (done)"
                });
            }
        }

        handle_screenshot_key(&window, fb, config);

        if let Err(e) = window.update_with_buffer(&fb.to_argb(scale), width, height) {
            log::warn!("Window update failed: {}", e);
            break;
        }
    }

    if !finished {
        log::info!("Window closed after {} rows", report.rows_rendered);
    }
}
