use console::style;

/// Styled terminal messages for command summaries
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    /// Aligned `key: value` line
    pub fn kv(&self, key: &str, value: &str) {
        println!("  {:<10} {}", style(format!("{}:", key)).dim(), value);
    }

    pub fn item(&self, message: &str) {
        println!("    {} {}", style("-").dim(), message);
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
