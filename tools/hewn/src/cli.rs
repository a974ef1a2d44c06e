//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "hewn")]
#[command(version, about = "Compile HTML templates into Rust source", long_about = None)]
pub struct Cli {
    /// Directory to search for templates
    #[arg(short, long, default_value = ".")]
    pub source: PathBuf,

    /// Directory to write generated files to, defaults to the source directory
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// Package name written to the generated file headers
    #[arg(short, long, default_value = "templates")]
    pub pkgname: String,

    /// File name extensions of templates
    #[arg(short, long, value_delimiter = ',', default_value = ".html")]
    pub extensions: Vec<String>,

    /// Begin and end delimiters of directives, e.g. `--delimiters '{%' '%}'`
    #[arg(long, num_args = 2, value_names = ["BEGIN", "END"])]
    pub delimiters: Option<Vec<String>>,

    /// Log every generated file
    #[arg(short, long)]
    pub verbose: bool,
}
