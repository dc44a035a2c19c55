//! Rendering options and configuration.

/// Options for rendering export rows.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Prefix the output with a UTF-8 byte-order mark
    pub byte_order_mark: bool,

    /// Emit the column header row
    pub include_header: bool,

    /// Line ending written after each row
    pub line_terminator: LineTerminator,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the byte-order mark.
    pub fn with_bom(mut self, bom: bool) -> Self {
        self.byte_order_mark = bom;
        self
    }

    /// Enable or disable the header row.
    pub fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Set the line terminator.
    pub fn with_line_terminator(mut self, terminator: LineTerminator) -> Self {
        self.line_terminator = terminator;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            byte_order_mark: true,
            include_header: true,
            line_terminator: LineTerminator::CrLf,
        }
    }
}

/// Row terminator for delimited output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineTerminator {
    /// `\r\n`, what spreadsheet tools expect
    #[default]
    CrLf,
    /// `\n`
    Lf,
}

impl LineTerminator {
    /// The terminator characters.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineTerminator::CrLf => "\r\n",
            LineTerminator::Lf => "\n",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .with_bom(false)
            .with_header(false)
            .with_line_terminator(LineTerminator::Lf);

        assert!(!options.byte_order_mark);
        assert!(!options.include_header);
        assert_eq!(options.line_terminator.as_str(), "\n");
    }

    #[test]
    fn test_render_options_defaults() {
        let options = RenderOptions::default();
        assert!(options.byte_order_mark);
        assert!(options.include_header);
        assert_eq!(options.line_terminator, LineTerminator::CrLf);
    }
}
