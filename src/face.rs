//! Terminal rendering of the pet's face in its mood colours.

use crate::pet::PetState;
use nu_ansi_term::{Color, Style};

const WIDTH: usize = 26;

/// Draw the face and the last thing the pet said
pub fn render(state: &PetState) -> String {
    let theme = state.mood.theme();
    let (br, bg, bb) = theme.background;
    let (ir, ig, ib) = theme.ink;
    let (gr, gg, gb) = theme.glow;
    let screen = Style::new()
        .fg(Color::Rgb(ir, ig, ib))
        .on(Color::Rgb(br, bg, bb))
        .bold();
    let frame = Style::new().fg(Color::Rgb(gr, gg, gb));

    let eye = |closed: bool| if closed { '━' } else { '●' };
    let eyes = format!(
        "{}{}{}",
        eye(state.left_eye_closed),
        " ".repeat(10),
        eye(state.right_eye_closed)
    );
    let mouth = if state.mouth_open { "\\___/" } else { "‿‿‿" };

    let rows = ["", eyes.as_str(), "", mouth, ""];
    let mut out = String::new();
    out.push_str(&frame.paint(format!("╭{}╮", "─".repeat(WIDTH))).to_string());
    out.push('\n');
    for row in rows {
        out.push_str(&frame.paint("│").to_string());
        out.push_str(&screen.paint(center(row, WIDTH)).to_string());
        out.push_str(&frame.paint("│").to_string());
        out.push('\n');
    }
    out.push_str(&frame.paint(format!("╰{}╯", "─".repeat(WIDTH))).to_string());
    out.push('\n');

    let status = if state.speaking {
        "a falar"
    } else if state.busy {
        "a pensar..."
    } else {
        ""
    };
    out.push_str(&format!(" [{}] {}\n", state.mood, status));
    for line in textwrap::wrap(&state.text, WIDTH) {
        out.push(' ');
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let left = (width - len) / 2;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(width - len - left))
}
