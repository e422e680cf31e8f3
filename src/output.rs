//! Terminal output for recognition and translation results.

use owo_colors::OwoColorize;

/// Clear the current terminal line.
pub fn clear_line() {
    eprint!("\r\x1b[2K");
}

/// Show a recognized utterance.
pub fn print_recognized(text: &str) {
    println!("{}{}", "Recognized: ".green(), text);
}

/// Show a translated utterance.
pub fn print_translated(text: &str) {
    println!("{}{}\n", "Translated: ".green(), text);
}

/// Indicate a contiguous run of discarded silence/noise recognitions.
///
/// Printed once per run; the segmenter tracks run boundaries.
pub fn print_silence() {
    println!("* silence *\n");
}

/// Startup banner once all engines are ready.
pub fn print_banner() {
    let bar = "#".repeat(80);
    println!("{bar}");
    println!("Press Ctrl+C to stop");
    println!("{bar}");
}

/// Goodbye message on clean exit.
pub fn print_done() {
    println!("{}", "Done!".green());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_helpers_do_not_panic() {
        // Rendering goes to stdout/stderr; just ensure the formatting code runs.
        print_recognized("hello world");
        print_translated("hallo welt");
        print_silence();
        print_banner();
        print_done();
        clear_line();
    }
}
