//! The boxed retro banner shown above every screen.

use console::{measure_text_width, Color, Style};

use super::{clear_screen, magenta, CONSOLE_WIDTH};

const ART: &str = r"
 __      __               ___________              __
/  \    /  \______  _  __ \_   _____/____    _____/  |_  ___________
\   \/\/   /  _ \ \/ \/ /  |    __) \__  \ _/ ___\   __\/  _ \_  __ \
 \        (  <_> )     /   |     \   / __ \\  \___|  | (  <_> )  | \/
  \__/\  / \____/ \/\_/    \___  /  (____  /\___  >__|  \____/|__|
       \/                      \/        \/     \/
";

const GRADIENT: [(Color, bool); 10] = [
    (Color::Magenta, false),
    (Color::Magenta, true),
    (Color::Cyan, false),
    (Color::Cyan, true),
    (Color::Green, false),
    (Color::Green, true),
    (Color::Yellow, false),
    (Color::Yellow, true),
    (Color::Red, false),
    (Color::Red, true),
];

fn gradient_style(index: usize) -> Style {
    let (color, bright) = GRADIENT[index % GRADIENT.len()];
    let style = Style::new().fg(color).bold();
    if bright {
        style.bright()
    } else {
        style
    }
}

/// Colour each visible character, shifting the gradient by `offset`.
pub fn gradient(text: &str, offset: usize) -> String {
    text.chars()
        .enumerate()
        .map(|(i, c)| {
            if c.is_whitespace() {
                c.to_string()
            } else {
                gradient_style(i + offset).apply_to(c).to_string()
            }
        })
        .collect()
}

/// One bordered row; `content` may carry colour codes.
fn boxed(content: &str) -> String {
    let inner = CONSOLE_WIDTH - 2;
    let width = measure_text_width(content);
    let left = inner.saturating_sub(width) / 2;
    let right = inner.saturating_sub(width + left);
    let border = magenta();
    format!(
        "{}{}{}{}{}",
        border.apply_to("║"),
        " ".repeat(left),
        content,
        " ".repeat(right),
        border.apply_to("║")
    )
}

pub fn header_lines(title: &str) -> Vec<String> {
    let border = magenta();
    let rule = "═".repeat(CONSOLE_WIDTH - 2);
    let art: Vec<&str> = ART.trim_matches('\n').lines().collect();
    let art_width = art.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    let mut lines = vec![
        border.apply_to(format!("╔{}╗", rule)).to_string(),
        boxed(""),
    ];
    for (row, line) in art.iter().enumerate() {
        let padded = format!("{:<width$}", line, width = art_width);
        lines.push(boxed(&gradient(&padded, row)));
    }
    lines.push(boxed(""));
    lines.push(boxed(&gradient(title, 0)));
    lines.push(border.apply_to(format!("╚{}╝", rule)).to_string());
    lines
}

/// Clear the screen and print the banner with `title` underneath the art.
pub fn print_header(title: &str) {
    clear_screen();
    for line in header_lines(title) {
        println!("{}", line);
    }
}
