//! The conversion command.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use rst_config::{CliSettings, Config};
use rst_renderer::convert;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for a conversion.
#[derive(Args, Debug)]
pub(crate) struct ConvertArgs {
    /// RST input file (default: read standard input; `-` also reads it).
    input: Option<PathBuf>,

    /// Write the HTML fragment to this file instead of standard output.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover rst2html.toml).
    #[arg(short, long, env = "RST2HTML_CONFIG")]
    config: Option<PathBuf>,

    /// Heading level of top-level sections (overrides config).
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=6))]
    initial_header_level: Option<u8>,

    /// Keep a lone top-level section as a section instead of promoting its
    /// title to the document title.
    #[arg(long)]
    no_doctitle: bool,

    /// Link section titles back to their table of contents entry.
    #[arg(long)]
    heading_backlinks: bool,

    /// Enable verbose output (debug logging).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ConvertArgs {
    /// Run the conversion.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, reading, converting or writing
    /// fails. Nothing is written when conversion fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = self.cli_settings();
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let settings = config.settings();

        let input = read_input(self.input.as_deref())?;
        tracing::debug!(bytes = input.len(), "read input");
        let html = convert(&input, &settings)?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, html.as_bytes())?;
                if self.verbose {
                    Output::new().wrote(path, html.len());
                }
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(html.as_bytes())?;
                stdout.flush()?;
            }
        }
        Ok(())
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            initial_header_level: self.initial_header_level.map(usize::from),
            doctitle_xform: self.no_doctitle.then_some(false),
            heading_backlinks: self.heading_backlinks.then_some(true),
        }
    }
}

/// Read all input bytes from `path`, or standard input for `None` / `-`.
fn read_input(path: Option<&Path>) -> Result<Vec<u8>, CliError> {
    match path {
        Some(path) if path != Path::new("-") => Ok(std::fs::read(path)?),
        _ => {
            let mut buf = Vec::new();
            std::io::stdin().lock().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cli;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> ConvertArgs {
        Cli::try_parse_from(std::iter::once("rst2html").chain(args.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn test_cli_settings_defaults_leave_config_alone() {
        let settings = parse(&[]).cli_settings();
        assert_eq!(settings.initial_header_level, None);
        assert_eq!(settings.doctitle_xform, None);
        assert_eq!(settings.heading_backlinks, None);
    }

    #[test]
    fn test_cli_settings_flags() {
        let settings = parse(&[
            "--initial-header-level",
            "2",
            "--no-doctitle",
            "--heading-backlinks",
        ])
        .cli_settings();
        assert_eq!(settings.initial_header_level, Some(2));
        assert_eq!(settings.doctitle_xform, Some(false));
        assert_eq!(settings.heading_backlinks, Some(true));
    }

    #[test]
    fn test_header_level_range_checked() {
        let result = Cli::try_parse_from(["rst2html", "--initial-header-level", "7"]);
        assert!(result.is_err());
    }

    fn write_config(dir: &Path) -> PathBuf {
        let path = dir.join("rst2html.toml");
        std::fs::write(&path, "[render]\n").unwrap();
        path
    }

    #[test]
    fn test_execute_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(dir.path());
        let input = dir.path().join("doc.rst");
        let output = dir.path().join("doc.html");
        std::fs::write(&input, "Title\n=====\n\nHello *world*.\n").unwrap();

        parse(&[
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "-c",
            config.to_str().unwrap(),
        ])
        .execute()
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "<h1>Title</h1>\n<p>Hello <em>world</em>.</p>"
        );
    }

    #[test]
    fn test_execute_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(dir.path());
        let input = dir.path().join("bad.rst");
        let output = dir.path().join("bad.html");
        std::fs::write(&input, ".. sourcecode::\n").unwrap();

        let err = parse(&[
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "-c",
            config.to_str().unwrap(),
        ])
        .execute()
        .unwrap_err();

        assert!(matches!(err, CliError::Convert(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_execute_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(dir.path());
        let input = dir.path().join("latin1.rst");
        std::fs::write(&input, b"caf\xe9\n").unwrap();

        let err = parse(&[input.to_str().unwrap(), "-c", config.to_str().unwrap()])
            .execute()
            .unwrap_err();
        assert!(err.to_string().starts_with("input is not valid UTF-8"));
    }

    #[test]
    fn test_execute_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(dir.path());
        let input = dir.path().join("missing.rst");

        let err = parse(&[input.to_str().unwrap(), "-c", config.to_str().unwrap()])
            .execute()
            .unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }

    #[test]
    fn test_execute_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("nope.toml");

        let err = parse(&["-c", config.to_str().unwrap()])
            .execute()
            .unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
