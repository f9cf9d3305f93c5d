use atty::Stream;
use color_eyre::Result;
use serde_json::Value;
use uvn_core::{to_json_response, CommandStatus, ExecutionOutcome};

use crate::cli::CommandCli;
use crate::style::{Style, Tone};

#[derive(Clone, Copy, Debug)]
pub struct OutputOptions {
    pub json: bool,
    pub no_color: bool,
    /// Suppress human output on success and for user errors.
    pub quiet: bool,
}

pub fn emit_output(
    opts: &OutputOptions,
    command: &CommandCli,
    outcome: &ExecutionOutcome,
) -> Result<i32> {
    let code = outcome.status.exit_code();

    if opts.json {
        let payload = to_json_response(command.name(), outcome);
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(code);
    }

    if outcome.status != CommandStatus::Ok {
        if !opts.quiet || outcome.status == CommandStatus::Failure {
            let style = Style::new(opts.no_color, atty::is(Stream::Stderr));
            eprintln!("{}", style.status(outcome.status, &outcome.message));
            if let Some(stderr) = detail(&outcome.details, "stderr") {
                eprintln!("{stderr}");
            }
            if let Some(hint) = detail(&outcome.details, "hint") {
                eprintln!("{}", style.info(hint));
            }
        }
        return Ok(code);
    }

    let style = Style::new(opts.no_color, atty::is(Stream::Stdout));
    match command {
        CommandCli::List(_) => {
            if let Some(table) = render_env_table(&style, &outcome.details) {
                println!("{table}");
            }
            println!("{}", style.echo(&outcome.message));
        }
        CommandCli::Export(_) if detail(&outcome.details, "content").is_some() => {
            let content = detail(&outcome.details, "content").unwrap_or_default();
            if content.ends_with('\n') {
                print!("{content}");
            } else {
                println!("{content}");
            }
        }
        CommandCli::Activate(_) | CommandCli::Version => println!("{}", outcome.message),
        _ if opts.quiet => {}
        _ => println!("{}", style.echo(&outcome.message)),
    }
    Ok(code)
}

fn detail<'a>(details: &'a Value, key: &str) -> Option<&'a str> {
    details
        .as_object()
        .and_then(|map| map.get(key))
        .and_then(Value::as_str)
}

struct Column {
    header: &'static str,
    tone: Tone,
    right_align: bool,
    cells: Vec<String>,
}

impl Column {
    fn new(header: &'static str, tone: Tone) -> Self {
        Self {
            header,
            tone,
            right_align: false,
            cells: Vec::new(),
        }
    }

    fn width(&self) -> usize {
        self.cells
            .iter()
            .map(|cell| cell.chars().count())
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or_default()
    }

    fn pad(&self, text: &str, width: usize) -> String {
        if self.right_align {
            format!("{text:>width$}")
        } else {
            format!("{text:<width$}")
        }
    }
}

fn render_env_table(style: &Style, details: &Value) -> Option<String> {
    let envs = details.get("environments")?.as_array()?;
    if envs.is_empty() {
        return None;
    }
    let show_size = details.get("size").and_then(Value::as_bool).unwrap_or(false);

    let mut columns = vec![
        Column::new("Name", Tone::Yellow),
        Column::new("Version", Tone::Green),
    ];
    if show_size {
        let mut size = Column::new("Size", Tone::Plain);
        size.right_align = true;
        columns.push(size);
    }
    columns.push(Column::new("Path", Tone::Blue));

    for env in envs {
        let obj = env.as_object()?;
        let mut cells = vec![
            obj.get("name")?.as_str()?.to_string(),
            obj.get("version")?.as_str()?.to_string(),
        ];
        if show_size {
            cells.push(obj.get("size")?.as_str()?.to_string());
        }
        cells.push(obj.get("path")?.as_str()?.to_string());
        for (column, cell) in columns.iter_mut().zip(cells) {
            column.cells.push(cell);
        }
    }

    let widths = columns.iter().map(Column::width).collect::<Vec<_>>();
    let mut lines = Vec::new();
    let header = columns
        .iter()
        .zip(&widths)
        .map(|(column, width)| column.pad(column.header, *width))
        .collect::<Vec<_>>()
        .join("  ");
    lines.push(style.table_header(header.trim_end()));
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in 0..envs.len() {
        let line = columns
            .iter()
            .zip(&widths)
            .map(|(column, width)| style.column(&column.pad(&column.cells[row], *width), column.tone))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(line.trim_end().to_string());
    }
    Some(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn table_aligns_columns() {
        let style = Style::new(true, false);
        let details = json!({
            "size": true,
            "environments": [
                { "name": "data", "version": "3.12.1", "size": "1.5 MB", "path": "/envs/data" },
                { "name": "ml", "version": "3.11.9", "size": "900 B", "path": "/envs/ml" },
            ],
        });
        let table = render_env_table(&style, &details).expect("table");
        let lines = table.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "Name  Version    Size  Path");
        assert_eq!(lines[1], "----  -------  ------  ----------");
        assert_eq!(lines[2], "data  3.12.1   1.5 MB  /envs/data");
        assert_eq!(lines[3], "ml    3.11.9    900 B  /envs/ml");
    }

    #[test]
    fn empty_listing_has_no_table() {
        let style = Style::new(true, false);
        assert!(render_env_table(&style, &json!({ "environments": [] })).is_none());
    }
}
