use plotters::style::RGBColor;

pub const FONT: &str = "sans-serif";
pub const WIDTH: u32 = 1400;
pub const HEIGHT: u32 = 700;
pub const TALL_HEIGHT: u32 = 1000;

pub const BACKGROUND: RGBColor = RGBColor(255, 255, 255);
pub const TEXT_MUTED: RGBColor = RGBColor(110, 118, 129);

pub const U3: RGBColor = RGBColor(31, 111, 235);
pub const U6: RGBColor = RGBColor(218, 54, 51);
pub const YOUTH: RGBColor = RGBColor(219, 109, 40);
pub const DEGREE: RGBColor = RGBColor(46, 160, 67);
pub const SPREAD: RGBColor = RGBColor(137, 87, 229);
pub const REDDIT: RGBColor = RGBColor(255, 69, 0);
pub const ACCENT: RGBColor = RGBColor(191, 135, 0);

pub const COVID: RGBColor = RGBColor(255, 123, 114);
pub const TECH_LAYOFFS: RGBColor = RGBColor(255, 166, 87);

/// YlOrRd
pub const HEAT: [RGBColor; 3] = [
    RGBColor(255, 255, 204),
    RGBColor(253, 141, 60),
    RGBColor(189, 0, 38),
];

/// Early months cyan, late months magenta.
pub const TIME: [RGBColor; 2] = [RGBColor(0, 200, 255), RGBColor(230, 0, 230)];

/// Green for calm months through red for mostly negative ones.
pub const NEGATIVITY: [RGBColor; 3] = [
    RGBColor(26, 152, 80),
    RGBColor(254, 224, 139),
    RGBColor(215, 48, 39),
];
