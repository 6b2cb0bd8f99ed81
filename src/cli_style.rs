use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;

fn bold(color: AnsiColor) -> Style {
    Style::new().bold().fg_color(Some(Color::Ansi(color)))
}

/// Help and error colors shared by the relay server and the device REPL.
pub fn get_styles() -> Styles {
    Styles::styled()
        .usage(bold(AnsiColor::Cyan).underline())
        .header(bold(AnsiColor::Cyan).underline())
        .literal(bold(AnsiColor::Green))
        .valid(bold(AnsiColor::Green))
        .invalid(bold(AnsiColor::Red))
        .error(bold(AnsiColor::Red))
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}
