//! Indentation of nested operator groups.

/// Tracks how deeply the current operator is nested in text objects, saved
/// graphics states, marked content, compatibility sections and paths.
///
/// The level only affects how a content stream is shown, it is never written
/// back.
#[derive(Debug, Default, Clone)]
pub struct IndentTracker {
    level: usize,
    in_path: bool,
}

impl IndentTracker {
    /// Create a new tracker at level zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current indentation level.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Whether a path is currently being constructed.
    pub fn in_path(&self) -> bool {
        self.in_path
    }

    /// Increase the level if the operator opens a nested group.
    ///
    /// Call this after the operator has been shown.
    pub fn indent_if_necessary(&mut self, operator: &[u8]) {
        match operator {
            b"BT" | b"q" | b"BMC" | b"BDC" | b"BX" => self.level += 1,
            b"m" | b"re" => {
                if !self.in_path {
                    self.level += 1;
                }

                self.in_path = true;
            }
            _ => {}
        }
    }

    /// Decrease the level if the operator closes a nested group.
    ///
    /// Call this before the operator is shown.
    pub fn unindent_if_necessary(&mut self, operator: &[u8]) {
        let paints_path = is_path_painting(operator);

        if self.level > 0 && (paints_path || matches!(operator, b"ET" | b"Q" | b"EMC" | b"EX")) {
            self.level -= 1;

            if paints_path {
                self.in_path = false;
            }
        }
    }

    /// Go back to level zero.
    pub fn reset(&mut self) {
        self.level = 0;
        self.in_path = false;
    }
}

fn is_path_painting(operator: &[u8]) -> bool {
    matches!(
        operator,
        b"b" | b"B" | b"f" | b"f*" | b"F" | b"B*" | b"b*" | b"n" | b"s" | b"S"
    )
}
