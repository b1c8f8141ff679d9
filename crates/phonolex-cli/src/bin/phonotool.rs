use std::path::PathBuf;

use clap::{Parser, Subcommand};

use phonolex_cli::commands::convert_ops::{ConvertOptions, FixSpec};
use phonolex_cli::commands::{config_ops, convert_ops, dict_ops};
use phonolex_cli::trace_init::init_tracing;
use phonolex_core::token::PhraseToken;

#[derive(Parser)]
#[command(name = "phonotool", about = "Phonetic lookup data and conversion tool")]
struct Cli {
    /// Custom settings TOML (defaults are built in)
    #[arg(long, global = true)]
    settings: Option<String>,
    /// Directory for the JSON trace log (only with the `trace` feature)
    #[arg(long, global = true)]
    trace_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a text lexicon (spelling, text, token, frequency) to binary
    CompileLexicon {
        /// Input text file
        input: String,
        /// Output binary file
        output_file: String,
    },
    /// Compile text bigram counts (prev, next, frequency) to binary
    CompileBigram {
        /// Input text file
        input: String,
        /// Output binary file
        output_file: String,
    },
    /// Show lexicon or bigram file info (auto-detected by magic bytes)
    Info {
        /// Lexicon or bigram file
        file: String,
    },
    /// Find the best phrase sequences for a spelling such as "ni'hao"
    Convert {
        /// Lexicon file (text or binary)
        lexicon: String,
        /// Syllables separated by ' ; fuzzy alternatives separated by |
        spelling: String,
        /// System bigram file (optional)
        #[arg(long)]
        bigram: Option<String>,
        /// User bigram file (optional)
        #[arg(long)]
        user_bigram: Option<String>,
        /// Committed context token (repeatable)
        #[arg(long = "prefix")]
        prefixes: Vec<u32>,
        /// Fixed selection START:END:TOKEN (repeatable)
        #[arg(long = "fix")]
        fixes: Vec<FixSpec>,
        /// Number of results (default: candidates.max_results)
        #[arg(short, long)]
        n: Option<usize>,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Some(ref dir) = cli.trace_dir {
        init_tracing(dir);
    }
    if let Some(ref file) = cli.settings {
        config_ops::load_settings(file);
    }

    match cli.command {
        Command::CompileLexicon { input, output_file } => {
            dict_ops::compile_lexicon(&input, &output_file)
        }
        Command::CompileBigram { input, output_file } => {
            dict_ops::compile_bigram(&input, &output_file)
        }
        Command::Info { file } => dict_ops::info(&file),
        Command::Convert {
            lexicon,
            spelling,
            bigram,
            user_bigram,
            prefixes,
            fixes,
            n,
            json,
        } => {
            let prefixes: Vec<PhraseToken> = prefixes.into_iter().map(PhraseToken).collect();
            convert_ops::convert_cmd(&ConvertOptions {
                lexicon: &lexicon,
                spelling: &spelling,
                bigram: bigram.as_deref(),
                user_bigram: user_bigram.as_deref(),
                prefixes: &prefixes,
                fixes: &fixes,
                n,
                json,
            });
        }
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
    }
}
