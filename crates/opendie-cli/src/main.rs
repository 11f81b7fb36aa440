//! `opendie-erc` - run electrical rule checks on a logic model file.

mod output;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use opendie_erc::{Blacklist, ErcConfig, RuleChecker};
use opendie_model::LogicModel;

use crate::output::{write_report, Format};

#[derive(Debug, Parser)]
#[command(name = "opendie-erc", version, about = "Electrical rule checks for OpenDie logic models")]
struct Cli {
    /// Logic model in JSON form.
    model: PathBuf,

    /// Rule-check configuration (severity overrides, disabled checks).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Blacklist of reviewed violations to suppress.
    #[arg(short, long)]
    blacklist: Option<PathBuf>,

    /// Add every reported violation to the blacklist file and save it.
    #[arg(long, requires = "blacklist")]
    accept_all: bool,

    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

fn load_model(path: &Path) -> Result<LogicModel> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read logic model {}", path.display()))?;
    LogicModel::from_json(&json)
        .with_context(|| format!("Failed to parse logic model {}", path.display()))
}

/// A missing blacklist file is an empty blacklist.
fn load_blacklist(path: &Path) -> Result<Blacklist> {
    if !path.exists() {
        log::info!("No blacklist at {}, starting empty", path.display());
        return Ok(Blacklist::new());
    }
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read blacklist {}", path.display()))?;
    Blacklist::from_json(&json)
        .with_context(|| format!("Failed to parse blacklist {}", path.display()))
}

fn run(cli: &Cli) -> Result<bool> {
    let model = load_model(&cli.model)?;

    let config = match &cli.config {
        Some(path) => ErcConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ErcConfig::default(),
    };
    let blacklist = match &cli.blacklist {
        Some(path) => load_blacklist(path)?,
        None => Blacklist::new(),
    };

    let mut checker = RuleChecker::new()
        .with_config(config)
        .with_blacklist(blacklist);
    let report = checker.run(&model).context("Rule check aborted")?;

    let stdout = io::stdout();
    write_report(&mut stdout.lock(), &model, &report, cli.format)?;

    if cli.accept_all {
        if let Some(path) = &cli.blacklist {
            for v in report.violations() {
                checker.blacklist_mut().add(v);
            }
            fs::write(path, checker.blacklist().to_json()?)
                .with_context(|| format!("Failed to write blacklist {}", path.display()))?;
            log::info!(
                "Blacklist {} now holds {} entries",
                path.display(),
                checker.blacklist().len()
            );
            return Ok(true);
        }
    }

    Ok(!report.has_errors())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opendie_model::PortDirection;

    fn write_model(dir: &Path) -> PathBuf {
        let mut model = LogicModel::new("cli");
        let buf = model.add_template("BUF").unwrap();
        model.add_template_port(buf, "Y", PortDirection::Out).unwrap();
        let net = model.add_net().unwrap();
        for name in ["U1", "U2"] {
            let gate = model.add_gate(name, buf).unwrap();
            let y = model.gate_port(gate, "Y").unwrap();
            model.connect(net, y).unwrap();
        }
        let path = dir.join("model.json");
        fs::write(&path, model.to_json().unwrap()).unwrap();
        path
    }

    fn cli(model: PathBuf, blacklist: Option<PathBuf>, accept_all: bool) -> Cli {
        Cli {
            model,
            config: None,
            blacklist,
            accept_all,
            format: Format::Json,
        }
    }

    #[test]
    fn test_errors_fail_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let model = write_model(dir.path());
        assert!(!run(&cli(model, None, false)).unwrap());
    }

    #[test]
    fn test_accept_all_then_clean() {
        let dir = tempfile::tempdir().unwrap();
        let model = write_model(dir.path());
        let bl = dir.path().join("blacklist.json");

        assert!(run(&cli(model.clone(), Some(bl.clone()), true)).unwrap());
        assert_eq!(load_blacklist(&bl).unwrap().len(), 2);
        assert!(run(&cli(model, Some(bl), false)).unwrap());
    }

    #[test]
    fn test_missing_model_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&cli(dir.path().join("nope.json"), None, false)).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read logic model"));
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["opendie-erc", "m.json", "--format", "json", "-b", "bl.json", "--accept-all"])
            .unwrap();
        assert_eq!(cli.format, Format::Json);
        assert!(cli.accept_all);
        assert!(Cli::try_parse_from(["opendie-erc", "m.json", "--accept-all"]).is_err());
    }
}
