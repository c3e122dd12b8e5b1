use std::fmt;

/// Striatal structure sampled on both hemispheres
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Structure {
    Caudate,
    Putamen,
}

impl Structure {
    pub const ALL: [Structure; 2] = [Structure::Caudate, Structure::Putamen];

    pub fn name(self) -> &'static str {
        match self {
            Structure::Caudate => "Caudate",
            Structure::Putamen => "Putamen",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    pub fn name(self) -> &'static str {
        match self {
            Side::Left => "Left",
            Side::Right => "Right",
        }
    }

    /// Suffix used in region names (`Caudate_L`)
    pub fn suffix(self) -> &'static str {
        match self {
            Side::Left => "L",
            Side::Right => "R",
        }
    }
}

/// Outcome of the left/right comparison of one structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Asymmetry {
    LeftDominant,
    RightDominant,
    #[default]
    Symmetric,
}

impl fmt::Display for Asymmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Asymmetry::LeftDominant => "Left-dominant",
            Asymmetry::RightDominant => "Right-dominant",
            Asymmetry::Symmetric => "Symmetric",
        };
        f.write_str(label)
    }
}

/// Counter-clockwise quarter turns applied to an atlas slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    None,
    #[default]
    Quarter,
    Half,
    ThreeQuarter,
}

/// Atlas a region label is looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtlasKind {
    Cortical,
    Subcortical,
}
