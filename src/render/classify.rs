use std::fmt;
use std::str::FromStr;

use ::errors::{Error, ErrorKind};
use ::map::{Handle, Line, Map, Sector};
use super::color::ColorClass;

/// How lines get sorted into color classes.  The two reference rules disagree about lines that
/// are both special and two-sided with a height change, so the choice is left to the caller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClassifyRule {
    /// Walls, floor steps, ceiling steps, and plain two-sided lines, by comparing the sectors on
    /// either side.  Specials are ignored.
    Heights,
    /// Solid walls and two-sided lines by flag, with any special overriding both.
    Action,
    /// The height rule, with specials overriding it.
    Combined,
}

impl fmt::Display for ClassifyRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            ClassifyRule::Heights => "heights",
            ClassifyRule::Action => "action",
            ClassifyRule::Combined => "combined",
        })
    }
}

impl FromStr for ClassifyRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "heights" => Ok(ClassifyRule::Heights),
            "action" => Ok(ClassifyRule::Action),
            "combined" => Ok(ClassifyRule::Combined),
            _ => Err(ErrorKind::Msg(format!("unknown classification rule '{}'", s)).into()),
        }
    }
}

/// A line's color class, plus whether it counts as one-sided for draw ordering.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LineClass {
    pub class: ColorClass,
    pub one_sided: bool,
}

/// Classifies by height.  First match wins: no back side, floor differs, ceiling differs,
/// otherwise an ordinary two-sided line.
pub fn classify_heights(front: Option<&Sector>, back: Option<&Sector>) -> ColorClass {
    match (front, back) {
        (Some(front), Some(back)) => {
            if back.floor_height != front.floor_height {
                ColorClass::FloorChangeWall
            }
            else if back.ceiling_height != front.ceiling_height {
                ColorClass::CeilingChangeWall
            }
            else {
                ColorClass::TwoSidedWall
            }
        }
        // Lines missing a front side are broken, but they can't be seen through either
        _ => ColorClass::Wall,
    }
}

pub fn classify_action(line: &Line) -> ColorClass {
    if line.has_special() {
        ColorClass::ActionWall
    }
    else if line.is_two_sided() {
        ColorClass::TwoSidedWall
    }
    else {
        ColorClass::Wall
    }
}

/// Classifies one line.  The sectors are whatever the line's front and back sides point at.
pub fn classify(rule: ClassifyRule, line: &Line, front: Option<&Sector>, back: Option<&Sector>) -> LineClass {
    match rule {
        ClassifyRule::Heights => LineClass {
            class: classify_heights(front, back),
            one_sided: back.is_none(),
        },
        ClassifyRule::Action => LineClass {
            class: classify_action(line),
            one_sided: !line.is_two_sided(),
        },
        ClassifyRule::Combined => LineClass {
            class: if line.has_special() { ColorClass::ActionWall } else { classify_heights(front, back) },
            one_sided: back.is_none(),
        },
    }
}

/// Every line in the map with its class, in drawing order: two-sided lines first and one-sided
/// lines last, each group keeping map order.
pub fn classify_lines(map: &Map, rule: ClassifyRule) -> Vec<(Handle<Line>, LineClass)> {
    let mut classified: Vec<_> = map.enumerate_lines()
        .map(|(handle, line)| {
            let (front, back) = map.line_sectors(line);
            (handle, classify(rule, line, front, back))
        })
        .collect();
    classified.sort_by_key(|&(_, class)| class.one_sided);
    classified
}
