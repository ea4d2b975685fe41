//! Operator categories.

/// The category of a content stream operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    /// Text objects, positioning and showing (`BT`, `Td`, `Tj`, ...).
    Text,
    /// Text state (`Tf`, `Tc`, `Tr`, ...).
    TextState,
    /// General graphics state (`q`, `cm`, `gs`, ...).
    GraphicsState,
    /// Path construction (`m`, `l`, `re`, ...).
    PathConstruction,
    /// Path painting (`S`, `f`, `n`, ...).
    PathPainting,
    /// Clipping paths (`W`, `W*`).
    Clipping,
    /// Colour (`rg`, `CS`, `scn`, ...).
    Color,
    /// Marked content (`BMC`, `BDC`, `EMC`, ...).
    MarkedContent,
    /// External objects (`Do`).
    XObject,
    /// Inline images (`BI`, `ID`, `EI`).
    InlineImage,
    /// Shading (`sh`).
    Shading,
    /// Type 3 glyph metrics (`d0`, `d1`).
    Type3,
    /// Compatibility sections (`BX`, `EX`).
    Compatibility,
    /// An operator not defined by PDF.
    Unknown,
}

impl OperatorKind {
    /// Determine the category of the operator with the given name.
    pub fn of(name: &[u8]) -> Self {
        match name {
            b"BT" | b"ET" | b"Td" | b"TD" | b"Tm" | b"T*" | b"Tj" | b"TJ" | b"'" | b"\"" => {
                Self::Text
            }
            b"Tc" | b"Tw" | b"Tz" | b"TL" | b"Tf" | b"Tr" | b"Ts" => Self::TextState,
            b"q" | b"Q" | b"cm" | b"w" | b"J" | b"j" | b"M" | b"d" | b"ri" | b"i" | b"gs" => {
                Self::GraphicsState
            }
            b"m" | b"l" | b"c" | b"v" | b"y" | b"h" | b"re" => Self::PathConstruction,
            b"S" | b"s" | b"f" | b"F" | b"f*" | b"B" | b"B*" | b"b" | b"b*" | b"n" => {
                Self::PathPainting
            }
            b"W" | b"W*" => Self::Clipping,
            b"CS" | b"cs" | b"SC" | b"SCN" | b"sc" | b"scn" | b"G" | b"g" | b"RG" | b"rg"
            | b"K" | b"k" => Self::Color,
            b"MP" | b"DP" | b"BMC" | b"BDC" | b"EMC" => Self::MarkedContent,
            b"Do" => Self::XObject,
            b"BI" | b"ID" | b"EI" => Self::InlineImage,
            b"sh" => Self::Shading,
            b"d0" | b"d1" => Self::Type3,
            b"BX" | b"EX" => Self::Compatibility,
            _ => Self::Unknown,
        }
    }

    /// A short human-readable description of the category.
    pub fn description(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::TextState => "text state",
            Self::GraphicsState => "graphics state",
            Self::PathConstruction => "path construction",
            Self::PathPainting => "path painting",
            Self::Clipping => "clipping path",
            Self::Color => "colour",
            Self::MarkedContent => "marked content",
            Self::XObject => "external object",
            Self::InlineImage => "inline image",
            Self::Shading => "shading",
            Self::Type3 => "Type 3 font",
            Self::Compatibility => "compatibility",
            Self::Unknown => "unknown operator",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(OperatorKind::of(b"Tj"), OperatorKind::Text);
        assert_eq!(OperatorKind::of(b"'"), OperatorKind::Text);
        assert_eq!(OperatorKind::of(b"Tf"), OperatorKind::TextState);
        assert_eq!(OperatorKind::of(b"re"), OperatorKind::PathConstruction);
        assert_eq!(OperatorKind::of(b"f*"), OperatorKind::PathPainting);
        assert_eq!(OperatorKind::of(b"W*"), OperatorKind::Clipping);
        assert_eq!(OperatorKind::of(b"scn"), OperatorKind::Color);
        assert_eq!(OperatorKind::of(b"BDC"), OperatorKind::MarkedContent);
        assert_eq!(OperatorKind::of(b"EX"), OperatorKind::Compatibility);
        assert_eq!(OperatorKind::of(b"foo"), OperatorKind::Unknown);
    }
}
