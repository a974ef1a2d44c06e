mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use hewn::{Compiler, Syntax};

use crate::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut compiler = match cli.delimiters.as_deref() {
        Some([begin, end]) => {
            if begin.is_empty() || end.is_empty() || begin == end {
                bail!("invalid delimiters `{begin}` and `{end}`");
            }
            Compiler::with_syntax(Syntax::builder().directive(begin, end).build())
        }
        _ => Compiler::new(),
    };
    compiler.set_extensions(cli.extensions);

    let dest = cli.dest.as_ref().unwrap_or(&cli.source);
    let report = compiler
        .generate(&cli.source, dest, &cli.pkgname)
        .with_context(|| format!("failed to generate templates in {}", cli.source.display()))?;

    if !report.is_success() {
        bail!(
            "{} of {} templates failed",
            report.failed.len(),
            report.failed.len() + report.generated.len()
        );
    }
    Ok(())
}
