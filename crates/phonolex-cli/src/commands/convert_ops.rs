use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use phonolex_core::dict::{Bigram, Lexicon};
use phonolex_core::lookup::{MatchResult, PhoneticLookup};
use phonolex_core::matrix::PhoneticKeyMatrix;
use phonolex_core::session::LookupSession;
use phonolex_core::settings::settings;
use phonolex_core::token::PhraseToken;

/// Beam width of the command-line lookup; also the most results it can show.
pub const BEAM: usize = 10;

/// A `START:END:TOKEN` selection from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixSpec {
    pub start: usize,
    pub end: usize,
    pub token: PhraseToken,
}

#[derive(Debug, thiserror::Error)]
pub enum FixSpecError {
    #[error("expected START:END:TOKEN, got '{0}'")]
    Shape(String),
    #[error("invalid {field} in '{spec}': {source}")]
    Number {
        field: &'static str,
        spec: String,
        source: std::num::ParseIntError,
    },
}

impl FromStr for FixSpec {
    type Err = FixSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let [start, end, token] = parts.as_slice() else {
            return Err(FixSpecError::Shape(s.to_string()));
        };
        let number = |field: &'static str, value: &str| {
            value.trim().parse::<u32>().map_err(|source| FixSpecError::Number {
                field,
                spec: s.to_string(),
                source,
            })
        };
        Ok(FixSpec {
            start: number("start", *start)? as usize,
            end: number("end", *end)? as usize,
            token: PhraseToken(number("token", *token)?),
        })
    }
}

pub struct ConvertOptions<'a> {
    pub lexicon: &'a str,
    pub spelling: &'a str,
    pub bigram: Option<&'a str>,
    pub user_bigram: Option<&'a str>,
    pub prefixes: &'a [PhraseToken],
    pub fixes: &'a [FixSpec],
    /// Defaults to `candidates.max_results`.
    pub n: Option<usize>,
    pub json: bool,
}

#[derive(Serialize)]
struct RenderedResult<'a> {
    text: String,
    #[serde(flatten)]
    result: &'a MatchResult,
}

/// Rendered text of a result; tokens the lexicon cannot render show as `<id>`.
pub fn render(lexicon: &Lexicon, result: &MatchResult) -> Vec<String> {
    result
        .spans
        .iter()
        .map(|span| {
            lexicon
                .text(span.token)
                .map(str::to_string)
                .unwrap_or_else(|| format!("<{}>", span.token))
        })
        .collect()
}

pub fn convert_cmd(opts: &ConvertOptions<'_>) {
    let lexicon = die!(
        Lexicon::load(Path::new(opts.lexicon)),
        "Error opening lexicon: {}"
    );
    let system = opts
        .bigram
        .map(|path| die!(Bigram::load(Path::new(path)), "Error opening bigram: {}"));
    let user = opts.user_bigram.map(|path| {
        die!(
            Bigram::load(Path::new(path)),
            "Error opening user bigram: {}"
        )
    });

    let mut lookup = PhoneticLookup::<BEAM>::new(&lexicon, &lexicon);
    if let Some(ref b) = system {
        lookup = lookup.with_system_bigram(b);
    }
    if let Some(ref b) = user {
        lookup = lookup.with_user_bigram(b);
    }

    let matrix = PhoneticKeyMatrix::from_spelling(opts.spelling);
    let mut session = LookupSession::new(lookup, matrix);
    session.set_prefixes(opts.prefixes.to_vec());
    for fix in opts.fixes {
        if session.fix(fix.start, fix.end, fix.token) == 0 {
            eprintln!(
                "Warning: ignored fix {}:{}:{} (out of range or duplicate)",
                fix.start, fix.end, fix.token
            );
        }
    }
    if session.validate() {
        eprintln!("Warning: dropped fixes that cannot be read from '{}'", opts.spelling);
    }

    let n = opts.n.unwrap_or(settings().candidates.max_results).min(BEAM);
    let results: Vec<MatchResult> = session.guess().iter().take(n).cloned().collect();

    if opts.json {
        let rendered: Vec<RenderedResult<'_>> = results
            .iter()
            .map(|result| RenderedResult {
                text: render(&lexicon, result).concat(),
                result,
            })
            .collect();
        println!(
            "{}",
            die!(serde_json::to_string_pretty(&rendered), "Error encoding JSON: {}")
        );
        return;
    }

    if results.is_empty() {
        println!("(no results)");
        return;
    }
    for (i, result) in results.iter().enumerate() {
        println!(
            "#{:>2}: {}  (score {:.3}, length {})",
            i + 1,
            render(&lexicon, result).join(" | "),
            result.score,
            result.sentence_length
        );
    }
}
