//! バンドマップをテキストで表示
//!
//! 使用方法: cargo run --bin band_map [幅] [高さ] [反復回数]

use daifract::canvas::{Canvas, FrameBuffer, GridSpec};
use daifract::fractal::{FractalEngine, FractalParams, FractalSettings};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let width = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(84);
    let height = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(32);
    let iterations = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(45);

    let settings = FractalSettings {
        grid: GridSpec::new(width, height),
        max_iterations: iterations,
        ..FractalSettings::default()
    };
    let params = match FractalParams::new(settings) {
        Ok(params) => params,
        Err(e) => {
            eprintln!("Invalid parameters: {}", e);
            std::process::exit(2);
        }
    };

    let engine = FractalEngine::new(params);
    let mut fb = FrameBuffer::new(params.grid());
    let report = engine.generate(&mut fb);

    // バンド順に ' ', '.', '+', '#'
    let glyphs = [' ', '.', '+', '#'];
    let palette = params.palette();
    for y in (0..height).rev() {
        let line: String = (0..width)
            .map(|x| {
                fb.pixel_color(x, y)
                    .and_then(|c| palette.slot_of(c))
                    .map_or('?', |slot| glyphs[slot])
            })
            .collect();
        println!("{}", line);
    }
    println!(
        "{}x{}, {} iterations: bands {:?} in {:?}",
        width, height, iterations, report.band_counts, report.elapsed
    );
}
