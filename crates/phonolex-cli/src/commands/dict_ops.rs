use std::fs;
use std::path::Path;
use std::process;

use phonolex_core::dict::{detect, Bigram, FileKind, Lexicon, PhraseIndex};

pub fn compile_lexicon(input: &str, output_file: &str) {
    let lexicon = die!(Lexicon::load(Path::new(input)), "Error reading {input}: {}");
    let (phrases, entries) = lexicon.stats();
    eprintln!("Parsed {phrases} phrases ({entries} entries)");

    die!(
        lexicon.save(Path::new(output_file)),
        "Error writing {output_file}: {}"
    );
    report_size(output_file);
}

pub fn compile_bigram(input: &str, output_file: &str) {
    let bigram = die!(Bigram::load(Path::new(input)), "Error reading {input}: {}");
    eprintln!("Parsed {} bigram pairs", bigram.len());

    die!(
        bigram.save(Path::new(output_file)),
        "Error writing {output_file}: {}"
    );
    report_size(output_file);
}

fn report_size(output_file: &str) {
    let file_size = fs::metadata(output_file).map(|m| m.len()).unwrap_or(0);
    eprintln!("Wrote {output_file} ({:.1} KB)", file_size as f64 / 1024.0);
}

pub fn info(file: &str) {
    let bytes = die!(fs::read(file), "Error reading {file}: {}");

    match detect(&bytes) {
        Some(FileKind::Lexicon) => {
            let lexicon = die!(Lexicon::from_bytes(&bytes), "Error opening lexicon: {}");
            let (phrases, entries) = lexicon.stats();
            println!("Lexicon: {file}");
            println!("  Phrases: {phrases}");
            println!("  Entries: {entries}");
            println!("  Total frequency: {}", lexicon.total_frequency());
        }
        Some(FileKind::Bigram) => {
            let bigram = die!(Bigram::from_bytes(&bytes), "Error opening bigram: {}");
            println!("Bigram: {file}");
            println!("  Pairs: {}", bigram.len());
        }
        None => {
            let head = &bytes[..bytes.len().min(4)];
            eprintln!(
                "Unknown file format (magic: {:?}); compile text files first",
                String::from_utf8_lossy(head)
            );
            process::exit(1);
        }
    }
}

