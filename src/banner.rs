use crate::style::{Palette, Tint};

const WELCOME: [&str; 5] = [
    r"__        _______ _     ____ ___  __  __ _____   _____ ___ ",
    r"\ \      / / ____| |   / ___/ _ \|  \/  | ____| |_   _/ _ \ ",
    r" \ \ /\ / /|  _| | |  | |  | | | | |\/| |  _|     | || | | |",
    r"  \ V  V / | |___| |__| |__| |_| | |  | | |___    | || |_| |",
    r"   \_/\_/  |_____|_____\____\___/|_|  |_|_____|   |_| \___/ ",
];

const TITLE: [&str; 5] = [
    r" ___ ___ _   _ ___   ____    _    ____  _   _ ",
    r"|_ _|_ _| | | |_ _| | __ )  / \  / ___|| | | |",
    r" | | | || | | || |  |  _ \ / _ \ \___ \| |_| |",
    r" | | | || |_| || |  | |_) / ___ \ ___) |  _  |",
    r"|___|___|\___/|___| |____/_/   \_\____/|_| |_|",
];

const FALLBACK_WIDTH: usize = 80;

fn terminal_width() -> usize {
    termion::terminal_size()
        .map(|(cols, _)| cols as usize)
        .unwrap_or(FALLBACK_WIDTH)
}

fn center(line: &str, width: usize) -> String {
    let pad = width.saturating_sub(line.chars().count()) / 2;
    format!("{}{}", " ".repeat(pad), line)
}

/// Both art blocks, centered, each followed by a blank line.
pub fn render(palette: &Palette) -> String {
    render_at(palette, terminal_width())
}

fn render_at(palette: &Palette, width: usize) -> String {
    let mut out = String::new();

    for block in [WELCOME, TITLE] {
        for line in block {
            out.push_str(&palette.paint(center(line, width), Tint::Cyan));
            out.push('\n');
        }
        out.push('\n');
    }

    out
}
