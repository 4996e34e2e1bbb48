//! Presentational template for rendered documents.

use std::fmt::{Display, Formatter, Result as FmtResult};

const FONT_STACK: &str = "'Segoe UI', Tahoma, Geneva, Verdana, sans-serif";

/// Page geometry handed to the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSetup {
    pub size: &'static str,
    pub width_mm: u32,
    pub height_mm: u32,
    pub margin_mm: u32,
    pub print_background: bool,
}

impl PageSetup {
    pub fn a4() -> Self {
        Self {
            size: "A4",
            width_mm: 210,
            height_mm: 297,
            margin_mm: 20,
            print_background: true,
        }
    }
}

impl Default for PageSetup {
    fn default() -> Self {
        Self::a4()
    }
}

impl Display for PageSetup {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} margin {}mm", self.size, self.margin_mm)
    }
}

/// Wrap an HTML fragment in the fixed document template.
pub fn wrap_document(body: &str, setup: &PageSetup) -> String {
    let color_adjust = if setup.print_background {
        "-webkit-print-color-adjust: exact; print-color-adjust: exact;"
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
  @page {{ size: {size}; margin: {margin}mm; }}
  html {{ {color_adjust} }}
  body {{
    font-family: {font};
    line-height: 1.6;
    padding: 50px;
    color: #333;
  }}
  img {{ max-width: 100%; height: auto; }}
  table {{ border-collapse: collapse; width: 100%; margin: 20px 0; }}
  th, td {{ border: 1px solid #ddd; padding: 12px; text-align: left; }}
  h1, h2, h3 {{ color: #1a1a1a; }}
</style>
</head>
<body>
{body}
</body>
</html>
"#,
        size = setup.size,
        margin = setup.margin_mm,
        color_adjust = color_adjust,
        font = FONT_STACK,
        body = body,
    )
}
