use regex::Regex;
use std::sync::OnceLock;

pub mod config;

#[macro_export]
macro_rules! println_pad {
    ($($arg:tt)*) => {{
        let __s = format!($($arg)*);
        for __line in __s.lines() {
            println!("    {}", __line);
        }
    }};
}

/// Length of `s` as shown on a terminal, ignoring ANSI color codes.
pub fn visible_len(s: &str) -> usize {
    static ANSI: OnceLock<Regex> = OnceLock::new();
    let ansi = ANSI.get_or_init(|| Regex::new("\x1b\\[[0-9;]*m").expect("valid ANSI regex"));
    ansi.replace_all(s, "").chars().count()
}

/// Prints the provided lines inside an ASCII box
pub fn print_ansi_boxed_lines(lines: &[String]) {
    let width = lines
        .iter()
        .map(|s| visible_len(s.as_str()))
        .max()
        .unwrap_or(0);

    let border = "-".repeat(width + 4);
    println_pad!("{}", border);
    for line in lines {
        let pad = width - visible_len(line.as_str());
        println_pad!("| {}{} |", line, " ".repeat(pad));
    }
    println_pad!("{}", border);
}
