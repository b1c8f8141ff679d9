use proptest::prelude::*;

use crate::dict::{Bigram, Lexicon, PhoneticTable, PhraseIndex, SpanMatch};
use crate::lookup::score::{Interpolation, TransitionModel};
use crate::lookup::{
    Constraint, Constraints, ForwardTrellis, Lambdas, MatchResult, PhoneticLookup, TrellisValue,
};
use crate::matrix::PhoneticKeyMatrix;
use crate::token::PhraseToken;

const K: usize = 4;

const AB_LEXICON: &str = "\
a\t阿\t30\t5
b\t比\t31\t3
a'b\t阿比\t32\t4
b'a\t比阿\t33\t2
a'a\t阿阿\t34\t1
b\t必\t35\t1
";

fn ab_lexicon() -> Lexicon {
    Lexicon::from_text(AB_LEXICON).unwrap()
}

fn ab_bigram() -> Bigram {
    let mut b = Bigram::new();
    b.insert(PhraseToken(30), PhraseToken(31), 3);
    b.insert(PhraseToken(31), PhraseToken(34), 2);
    b.insert(PhraseToken(32), PhraseToken(35), 1);
    b.insert(PhraseToken::SENTENCE_START, PhraseToken(33), 4);
    b
}

fn spelling(syllables: &[bool]) -> String {
    syllables
        .iter()
        .map(|&a| if a { "a" } else { "b" })
        .collect::<Vec<_>>()
        .join("'")
}

/// Best score over every segmentation, by exhaustive enumeration.
fn exhaustive_best(
    table: &dyn PhoneticTable,
    model: &Interpolation<'_>,
    matrix: &PhoneticKeyMatrix,
    position: usize,
    prev: PhraseToken,
) -> Option<f32> {
    let last = matrix.size() - 1;
    if position == last {
        return Some(0.0);
    }
    let mut best: Option<f32> = None;
    for end in position + 1..=last {
        let mut found: Vec<SpanMatch> = Vec::new();
        table.search(matrix, position, end, &mut found);
        for m in found {
            let Some(info) = model.phrase(m.token) else {
                continue;
            };
            let Some(step) = model.transition(prev, m.token, Some(info), m.pronunciation) else {
                continue;
            };
            if let Some(rest) = exhaustive_best(table, model, matrix, end, m.token) {
                let total = step + rest;
                if best.map_or(true, |b| total > b) {
                    best = Some(total);
                }
            }
        }
    }
    best
}

/// Walk predecessors from `record` at `position` back to a seed at 0,
/// returning `(position, token)` for every non-seed record in order.
fn chain<const N: usize>(
    trellis: &ForwardTrellis<N>,
    mut position: usize,
    mut record: TrellisValue,
) -> Option<Vec<(usize, PhraseToken)>> {
    let mut steps = Vec::new();
    while let Some(pred) = record.predecessor() {
        if pred.step() >= position {
            return None;
        }
        steps.push((position, record.token()));
        record = trellis.resolve(pred.step(), record.secondary(), pred.slot())?;
        position = pred.step();
    }
    if position != 0 {
        return None;
    }
    steps.reverse();
    Some(steps)
}

fn assert_covers(result: &MatchResult, length: usize) {
    assert!(!result.spans.is_empty());
    assert_eq!(result.spans[0].start, 0);
    assert_eq!(result.spans.last().map(|s| s.end), Some(length));
    for pair in result.spans.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
    for span in &result.spans {
        assert!(span.start < span.end);
    }
}

proptest! {
    #[test]
    fn search_invariants(
        syllables in prop::collection::vec(any::<bool>(), 1..7),
        fixed in prop::option::of((0usize..6, 1usize..3, prop::sample::select(vec![30u32, 31, 32, 33, 34, 35]))),
        prefixes in prop::collection::vec(prop::sample::select(vec![0u32, 1, 30, 31, 33]), 0..3),
    ) {
        let lex = ab_lexicon();
        let bigram = ab_bigram();
        let matrix = PhoneticKeyMatrix::from_spelling(&spelling(&syllables));
        let length = matrix.size() - 1;

        let mut constraints = Constraints::new();
        constraints.validate(&matrix, &lex);
        if let Some((start, span, token)) = fixed {
            constraints.add(start, start + span, PhraseToken(token));
            constraints.validate(&matrix, &lex);
        }

        let prefixes: Vec<PhraseToken> = prefixes.into_iter().map(PhraseToken).collect();
        let mut lookup = PhoneticLookup::<K>::new(&lex, &lex).with_system_bigram(&bigram);
        let results = lookup.get_best_match(&prefixes, &matrix, &constraints);
        let trellis = lookup.forward_trellis();

        prop_assert!(results.len() <= K);
        for pair in results.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
        for (i, result) in results.iter().enumerate() {
            prop_assert!(results[..i].iter().all(|earlier| earlier.spans != result.spans));
        }

        // Seeds: one record per distinct non-null prefix, none with a predecessor.
        let mut distinct: Vec<PhraseToken> = prefixes.iter().copied().filter(|t| !t.is_null()).collect();
        distinct.sort_unstable();
        distinct.dedup();
        let expected_seeds = distinct.len().max(1);
        prop_assert_eq!(trellis.records_at(0), expected_seeds);
        prop_assert!(trellis.candidates_at(0).iter().all(|v| v.predecessor().is_none()));

        for position in 0..=length {
            let records = trellis.candidates_at(position);
            prop_assert!(records.len() <= K * trellis.tokens_at(position).len());
            for record in &records {
                if position > 0 {
                    let pred = record.predecessor();
                    prop_assert!(pred.is_some_and(|p| p.step() < position));
                }
            }
        }

        for result in &results {
            assert_covers(result, length);
            let expected: Vec<(usize, PhraseToken)> =
                result.spans.iter().map(|s| (s.end, s.token)).collect();
            let last = expected[expected.len() - 1].1;
            let walked = trellis
                .candidates_at(length)
                .into_iter()
                .filter(|record| record.token() == last && record.score == result.score)
                .any(|record| chain(trellis, length, record).as_deref() == Some(expected.as_slice()));
            prop_assert!(walked, "no predecessor chain reads {:?}", expected);
            for (start, constraint) in constraints.iter() {
                if let Constraint::OneStep { token, end } = constraint {
                    prop_assert!(result
                        .spans
                        .iter()
                        .any(|s| s.start == start && s.end == end && s.token == token));
                    prop_assert!(!result.spans.iter().any(|s| s.start > start && s.start < end));
                }
            }
        }
    }

    #[test]
    fn best_path_is_optimal(syllables in prop::collection::vec(any::<bool>(), 1..6)) {
        let lex = ab_lexicon();
        let bigram = ab_bigram();
        let matrix = PhoneticKeyMatrix::from_spelling(&spelling(&syllables));
        let constraints = Constraints::with_len(matrix.size());

        let mut lookup = PhoneticLookup::<K>::new(&lex, &lex).with_system_bigram(&bigram);
        let results = lookup.get_best_match(&[], &matrix, &constraints);

        let model = Interpolation::new(&lex, Some(&bigram), None, Lambdas::from_settings());
        let expected = exhaustive_best(&lex, &model, &matrix, 0, PhraseToken::SENTENCE_START);
        match expected {
            None => prop_assert!(results.is_empty()),
            Some(best) => {
                prop_assert!(!results.is_empty());
                prop_assert!((results[0].score - best).abs() < 1e-4);
            }
        }
    }
}

#[test]
fn test_total_frequency_fixture() {
    assert_eq!(ab_lexicon().total_frequency(), 16);
}
