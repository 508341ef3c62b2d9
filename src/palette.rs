// Colors and palettes shared by the shapes, the gradients and the panel
//
// Colors are stored as plain `[u8; 4]` RGBA arrays so they serialize without
// any wrapper type and convert directly into `image::Rgba`.

/// An RGBA color (0-255 per channel)
pub type Color = [u8; 4];

/// Fully opaque color from red, green and blue
pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
    [r, g, b, 255]
}

/// Color with an explicit alpha, alpha first
pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Color {
    [r, g, b, a]
}

/// Complementary gradient pairs the random factory picks from
pub const COLOR_PAIRS: [(Color, Color); 6] = [
    (rgb(255, 99, 71), rgb(255, 165, 0)),   // red-orange
    (rgb(0, 191, 255), rgb(30, 144, 255)),  // light blue
    (rgb(50, 205, 50), rgb(34, 139, 34)),   // green
    (rgb(255, 20, 147), rgb(199, 21, 133)), // pink
    (rgb(138, 43, 226), rgb(75, 0, 130)),   // violet
    (rgb(255, 215, 0), rgb(255, 140, 0)),   // gold
];

/// Default stops for a multi-color gradient
pub const RAINBOW: [Color; 6] = [
    rgb(255, 0, 0),
    rgb(255, 165, 0),
    rgb(255, 255, 0),
    rgb(0, 128, 0),
    rgb(0, 0, 255),
    rgb(128, 0, 128),
];

/// Soft pastel colors
pub const PASTEL: [Color; 6] = [
    rgb(255, 179, 186), // pink
    rgb(255, 223, 186), // peach
    rgb(255, 255, 186), // light yellow
    rgb(186, 255, 201), // mint
    rgb(186, 225, 255), // light blue
    rgb(219, 186, 255), // lavender
];

/// Saturated accent colors
pub const VIBRANT: [Color; 6] = [
    rgb(255, 87, 51),   // orange
    rgb(255, 189, 51),  // gold
    rgb(51, 255, 87),   // neon green
    rgb(51, 181, 255),  // blue
    rgb(189, 51, 255),  // violet
    rgb(255, 51, 161),  // magenta
];

/// Dark slate behind the animation panel
pub const PANEL_BACKGROUND: Color = rgb(30, 30, 40);

/// Translucent white used for the specular spot on circles
pub const HIGHLIGHT: Color = argb(100, 255, 255, 255);

/// Translucent black outline drawn around squares
pub const SQUARE_BORDER: Color = argb(100, 0, 0, 0);

/// Linear interpolation between two colors, `t` in [0, 1]
pub fn lerp(from: Color, to: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let mut out = [0u8; 4];
    for (channel, (a, b)) in out.iter_mut().zip(from.iter().zip(to.iter())) {
        *channel = (*a as f32 + (*b as f32 - *a as f32) * t).round() as u8;
    }
    out
}

/// Move a color towards white by `amount` (0.0-1.0), keeping its alpha
pub fn lighten(color: Color, amount: f32) -> Color {
    let mut out = lerp(color, [255, 255, 255, color[3]], amount);
    out[3] = color[3];
    out
}

/// Move a color towards black by `amount` (0.0-1.0), keeping its alpha
pub fn darken(color: Color, amount: f32) -> Color {
    let mut out = lerp(color, [0, 0, 0, color[3]], amount);
    out[3] = color[3];
    out
}
