use anyhow::{anyhow, bail, Context, Result};
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCommand {
    Tree,
    Eval,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolArgs {
    pub command: ToolCommand,
    pub input: Option<String>,
    pub indent: Option<usize>,
    pub ticks: usize,
    pub json: bool,
    pub config: Option<String>,
}

impl Default for ToolArgs {
    fn default() -> Self {
        Self { command: ToolCommand::Help, input: None, indent: None, ticks: 1, json: false, config: None }
    }
}

impl ToolArgs {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = ToolArgs::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        let Some(command) = iter.next() else {
            return Ok(parsed);
        };
        parsed.command = match command.as_ref() {
            "tree" => ToolCommand::Tree,
            "eval" => ToolCommand::Eval,
            "help" | "--help" | "-h" => return Ok(parsed),
            other => bail!("Unknown command '{other}'. Use tree, eval or help."),
        };
        while let Some(raw) = iter.next() {
            let arg = raw.as_ref();
            if !arg.starts_with("--") {
                if parsed.input.is_some() {
                    bail!("Unexpected argument '{arg}'. Only one input file is accepted.");
                }
                parsed.input = Some(arg.to_string());
                continue;
            }
            let key = &arg[2..];
            if key == "json" {
                parsed.json = true;
                continue;
            }
            let value = iter.next().ok_or_else(|| anyhow!("Expected a value after '{arg}'"))?.as_ref().to_string();
            match key {
                "indent" => {
                    parsed.indent =
                        Some(value.parse::<usize>().with_context(|| format!("Invalid indent '{value}'"))?);
                }
                "ticks" => {
                    parsed.ticks = value.parse::<usize>().with_context(|| format!("Invalid ticks '{value}'"))?;
                }
                "config" => parsed.config = Some(value),
                _ => bail!("Unknown flag '{arg}'. Supported flags: --indent, --ticks, --config, --json."),
            }
        }
        if parsed.input.is_none() {
            bail!("Missing input file for '{}'", command.as_ref());
        }
        Ok(parsed)
    }
}
