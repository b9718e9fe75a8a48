use std::str::FromStr;

use image::Rgb;

use ::errors::{Error, ErrorKind};

pub type Color = Rgb<u8>;

/// What a piece of geometry is, as far as picking a color goes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ColorClass {
    Background,
    Wall,
    TwoSidedWall,
    FloorChangeWall,
    CeilingChangeWall,
    ActionWall,
    Thing,
}

/// A palette for drawing levels, one color per `ColorClass`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColorScheme {
    pub background: Color,
    pub wall: Color,
    pub two_sided_wall: Color,
    pub floor_change_wall: Color,
    pub ceiling_change_wall: Color,
    pub action_wall: Color,
    pub thing: Color,
}

impl ColorScheme {
    /// Dark lines on white paper.
    pub const WORLD: ColorScheme = ColorScheme {
        background: Rgb([255, 255, 255]),
        wall: Rgb([0, 0, 0]),
        two_sided_wall: Rgb([144, 144, 144]),
        floor_change_wall: Rgb([136, 92, 56]),
        ceiling_change_wall: Rgb([200, 168, 40]),
        action_wall: Rgb([220, 130, 50]),
        thing: Rgb([40, 120, 40]),
    };

    /// The in-game automap: red walls, brown steps, yellow ceilings and green things, all on black.
    pub const CLASSIC: ColorScheme = ColorScheme {
        background: Rgb([0, 0, 0]),
        wall: Rgb([252, 0, 0]),
        two_sided_wall: Rgb([108, 108, 108]),
        floor_change_wall: Rgb([188, 120, 72]),
        ceiling_change_wall: Rgb([252, 252, 0]),
        action_wall: Rgb([252, 148, 0]),
        thing: Rgb([116, 252, 108]),
    };

    pub fn by_name(name: &str) -> Option<ColorScheme> {
        match name.to_ascii_lowercase().as_str() {
            "world" => Some(ColorScheme::WORLD),
            "classic" => Some(ColorScheme::CLASSIC),
            _ => None,
        }
    }

    pub fn color(&self, class: ColorClass) -> Color {
        match class {
            ColorClass::Background => self.background,
            ColorClass::Wall => self.wall,
            ColorClass::TwoSidedWall => self.two_sided_wall,
            ColorClass::FloorChangeWall => self.floor_change_wall,
            ColorClass::CeilingChangeWall => self.ceiling_change_wall,
            ColorClass::ActionWall => self.action_wall,
            ColorClass::Thing => self.thing,
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme::WORLD
    }
}

impl FromStr for ColorScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorScheme::by_name(s)
            .ok_or_else(|| ErrorKind::Msg(format!("unknown color scheme '{}'", s)).into())
    }
}

/// Vertices no line uses, in vertices mode.
pub const UNUSED_VERTEX_COLOR: Color = Rgb([255, 0, 255]);
/// Segs the node builder split off their line, in nodes mode.
pub const SEG_COLOR: Color = Rgb([0, 160, 255]);
pub const AXIS_COLOR: Color = Rgb([0, 128, 255]);
pub const LEGEND_COLOR: Color = Rgb([255, 0, 0]);

/// Fill colors for sectors.  Neighboring sector numbers get visibly different colors.
pub const SECTOR_PALETTE: [Color; 16] = [
    Rgb([230, 25, 75]),
    Rgb([60, 180, 75]),
    Rgb([255, 225, 25]),
    Rgb([0, 130, 200]),
    Rgb([245, 130, 48]),
    Rgb([145, 30, 180]),
    Rgb([70, 240, 240]),
    Rgb([240, 50, 230]),
    Rgb([210, 245, 60]),
    Rgb([250, 190, 190]),
    Rgb([0, 128, 128]),
    Rgb([230, 190, 255]),
    Rgb([170, 110, 40]),
    Rgb([255, 250, 200]),
    Rgb([128, 0, 0]),
    Rgb([170, 255, 195]),
];

pub fn sector_color(sector_index: usize) -> Color {
    SECTOR_PALETTE[sector_index % SECTOR_PALETTE.len()]
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schemes_by_name() {
        assert_eq!(ColorScheme::by_name("world"), Some(ColorScheme::WORLD));
        assert_eq!("CLASSIC".parse::<ColorScheme>().unwrap(), ColorScheme::CLASSIC);
        assert!("sepia".parse::<ColorScheme>().is_err());
    }

    #[test]
    fn lookup_covers_every_class() {
        let scheme = ColorScheme::CLASSIC;
        assert_eq!(scheme.color(ColorClass::Background), Rgb([0, 0, 0]));
        assert_eq!(scheme.color(ColorClass::Wall), scheme.wall);
        assert_eq!(scheme.color(ColorClass::ActionWall), scheme.action_wall);
        assert_eq!(scheme.color(ColorClass::Thing), scheme.thing);
        assert_ne!(scheme.color(ColorClass::FloorChangeWall), scheme.color(ColorClass::CeilingChangeWall));
    }

    #[test]
    fn palette_wraps() {
        for i in 0..40 {
            assert_eq!(sector_color(i), SECTOR_PALETTE[i % 16]);
        }
        assert_eq!(sector_color(SECTOR_PALETTE.len()), sector_color(0));
        assert_ne!(sector_color(1), sector_color(0));
    }
}
