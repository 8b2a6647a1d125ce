use colored::Colorize;
use rbjs_common::Diagnostic;

pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter { color }
    }

    pub fn render(&self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for (index, diagnostic) in diagnostics.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&self.format_diagnostic(diagnostic));
        }
        out
    }

    pub fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let mut output = String::new();
        match &diagnostic.location {
            Some(location) => output.push_str(&self.paint_location(&location.to_string())),
            None => output.push_str("<input>"),
        }
        output.push_str(" - ");
        output.push_str(&self.paint_category(diagnostic.category.name()));
        output.push(' ');
        output.push_str(&self.paint_code(diagnostic.code));
        output.push_str(": ");
        output.push_str(&diagnostic.message_text);

        if let Some(node) = &diagnostic.node {
            output.push_str("\n  in ");
            output.push_str(&self.paint_node(node));
        }
        output
    }

    /// JSON array of the diagnostic records.
    pub fn render_json(diagnostics: &[Diagnostic]) -> serde_json::Result<String> {
        serde_json::to_string_pretty(diagnostics)
    }

    fn paint_location(&self, location: &str) -> String {
        if self.color {
            location.cyan().to_string()
        } else {
            location.to_string()
        }
    }

    fn paint_category(&self, category: &str) -> String {
        if self.color {
            category.red().bold().to_string()
        } else {
            category.to_string()
        }
    }

    fn paint_code(&self, code: u32) -> String {
        let code = format!("RB{code}");
        if self.color { code.bright_black().to_string() } else { code }
    }

    fn paint_node(&self, node: &str) -> String {
        if self.color { node.dimmed().to_string() } else { node.to_string() }
    }
}
