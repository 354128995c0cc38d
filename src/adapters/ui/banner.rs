//! Leafy ASCII banner with gradient (LEAFLOG).

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Forest green (#2f9e44).
const FOREST_GREEN: (u8, u8, u8) = (0x2f, 0x9e, 0x44);
/// Fresh lime (#a9e34b).
const FRESH_LIME: (u8, u8, u8) = (0xa9, 0xe3, 0x4b);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// Prints the welcome banner: "LEAFLOG" in figlet ASCII with a gradient from
/// forest green to fresh lime, then the version line.
pub fn print_welcome() {
    let mut out = stdout();
    let Some(font) = FIGfont::standard().ok() else {
        let _ = out.execute(Print("LEAFLOG\r\n"));
        return;
    };
    let Some(figure) = font.convert("LEAFLOG") else {
        let _ = out.execute(Print("LEAFLOG\r\n"));
        return;
    };
    let art = figure.to_string();
    let lines: Vec<&str> = art.lines().collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(FOREST_GREEN, FRESH_LIME, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: FRESH_LIME.0,
        g: FRESH_LIME.1,
        b: FRESH_LIME.2,
    }));
    let _ = out.execute(Print(format!(
        "v{version} — your plant-care companion\r\n"
    )));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}
