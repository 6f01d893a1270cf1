use colored::Colorize;
use plmxml::Diagnostic;

/// Print non-fatal diagnostics to stderr, after the command output
pub fn report(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{} {}", "warning:".yellow().bold(), diagnostic);
    }
}
