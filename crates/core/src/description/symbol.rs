use crate::{
    animation::{Vec4iAnimation, Vector4Animation},
    util::range::NumRange,
};
use strum::{Display, EnumString, IntoStaticStr};

/// How an outline is drawn relative to the glyph's edge
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum OutlineMode {
    /// Entirely outside the glyph
    Outer,
    /// Straddling the glyph's edge
    Centered,
}

/// The glyph at the core of a symbol: a codepoint in some font, and its color
#[derive(Clone, Debug, PartialEq)]
pub struct InitialSymbolGlyph {
    pub font: String,
    pub codepoint: u32,
    pub color: Vec4iAnimation,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InitialSymbolOutline {
    pub mode: OutlineMode,
    pub color: Vec4iAnimation,
}

/// Extrusion of a symbol, which gives it visible sides
#[derive(Clone, Debug, PartialEq)]
pub struct InitialSymbolSides {
    /// Extrusion depth, as a percentage of the symbol's size
    pub depth_percent: i32,
    pub color: Vec4iAnimation,
}

/// Full visual description of a symbol. A symbol with no outline has
/// `outline: None`, which is distinct from an outline that happens to be
/// black.
#[derive(Clone, Debug, PartialEq)]
pub struct InitialSymbol {
    pub glyph: InitialSymbolGlyph,
    pub outline: Option<InitialSymbolOutline>,
    pub sides: Option<InitialSymbolSides>,
    /// Rotation as a percentage of a full turn
    pub rotation_percent: i32,
    /// Size as a percentage of the space the symbol is placed in
    pub size_percent: i32,
}

/// Presenter-facing version of an [InitialSymbol], with colors on the 0-1
/// scale and percentages converted to ratios
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolDescription {
    pub font: String,
    pub codepoint: u32,
    pub color: Vector4Animation,
    pub outline: Option<(OutlineMode, Vector4Animation)>,
    /// Extrusion depth ratio and side color
    pub sides: Option<(f32, Vector4Animation)>,
    /// Rotation in radians
    pub rotation_radians: f32,
    pub size_ratio: f32,
}

/// Convert a percentage to a ratio. Values outside [0, 100] map
/// proportionally.
pub(crate) fn percent_to_ratio(percent: i32) -> f32 {
    let range: NumRange<f32> = NumRange::new(0.0, 100.0);
    range.normalize(percent as f32)
}

impl InitialSymbol {
    /// A plain glyph with no outline or sides, at full size
    pub fn plain(
        font: impl Into<String>,
        codepoint: u32,
        color: Vec4iAnimation,
    ) -> Self {
        Self {
            glyph: InitialSymbolGlyph {
                font: font.into(),
                codepoint,
                color,
            },
            outline: None,
            sides: None,
            rotation_percent: 0,
            size_percent: 100,
        }
    }

    pub fn describe(&self) -> SymbolDescription {
        SymbolDescription {
            font: self.glyph.font.clone(),
            codepoint: self.glyph.codepoint,
            color: self.glyph.color.to_unit_float(),
            outline: self
                .outline
                .as_ref()
                .map(|outline| (outline.mode, outline.color.to_unit_float())),
            sides: self.sides.as_ref().map(|sides| {
                (
                    percent_to_ratio(sides.depth_percent),
                    sides.color.to_unit_float(),
                )
            }),
            rotation_radians: percent_to_ratio(self.rotation_percent)
                * std::f32::consts::TAU,
            size_ratio: percent_to_ratio(self.size_percent),
        }
    }
}
