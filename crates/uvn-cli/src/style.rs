use std::env;

use color_eyre::owo_colors::OwoColorize;
use uvn_core::CommandStatus;

pub struct Style {
    enabled: bool,
}

impl Style {
    pub fn new(force_no_color: bool, is_tty: bool) -> Self {
        let env_no_color = env::var_os("NO_COLOR").is_some();
        Self {
            enabled: !(force_no_color || env_no_color) && is_tty,
        }
    }

    pub fn status(&self, status: CommandStatus, text: &str) -> String {
        let (symbol, tone) = match status {
            CommandStatus::Ok => ("✔", Tone::Green),
            CommandStatus::UserError => ("✗", Tone::Yellow),
            CommandStatus::Failure => ("✖", Tone::Red),
        };
        if !self.enabled {
            return text.to_string();
        }
        let line = format!("{symbol} {}", self.echo(text));
        self.paint(&line, tone, true)
    }

    /// Italic message with backticked names picked out in yellow.
    pub fn echo(&self, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        text.split('`')
            .enumerate()
            .map(|(idx, part)| {
                if idx % 2 == 1 {
                    part.yellow().italic().to_string()
                } else {
                    part.italic().to_string()
                }
            })
            .collect()
    }

    pub fn info(&self, text: &str) -> String {
        self.paint(text, Tone::Blue, false)
    }

    pub fn table_header(&self, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        text.magenta().bold().to_string()
    }

    pub fn column(&self, text: &str, tone: Tone) -> String {
        self.paint(text, tone, false)
    }

    fn paint(&self, text: &str, tone: Tone, bold: bool) -> String {
        if !self.enabled {
            return text.to_string();
        }
        let painted = match tone {
            Tone::Green => text.green().to_string(),
            Tone::Yellow => text.yellow().to_string(),
            Tone::Red => text.red().to_string(),
            Tone::Blue => text.cyan().to_string(),
            Tone::Plain => text.to_string(),
        };
        if bold {
            painted.bold().to_string()
        } else {
            painted
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Tone {
    Green,
    Yellow,
    Red,
    Blue,
    Plain,
}
