use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use phonolex_core::dict::{Bigram, Lexicon};
use phonolex_core::lookup::{Constraints, PhoneticLookup};
use phonolex_core::matrix::PhoneticKeyMatrix;
use phonolex_core::token::PhraseToken;

const LEXICON: &str = "\
wo\t我\t100\t900
wo\t窝\t101\t20
men\t们\t102\t400
wo'men\t我们\t103\t600
jin\t今\t104\t150
jin\t进\t105\t300
tian\t天\t106\t500
tian\t田\t107\t60
jin'tian\t今天\t108\t700
qu\t去\t109\t450
gong\t公\t110\t200
gong\t工\t111\t250
yuan\t园\t112\t120
yuan\t元\t113\t180
gong'yuan\t公园\t114\t300
wan\t玩\t115\t220
wan\t晚\t116\t190
ba\t吧\t117\t350
ba\t八\t118\t90
zai\t在\t119\t800
jia\t家\t120\t400
zai'jia\t在家\t121\t90
shi\t是\t122\t1000
shi\t事\t123\t300
shi\t时\t124\t280
hou\t后\t125\t200
shi'hou\t时候\t126\t260
";

fn bench_lexicon() -> Lexicon {
    Lexicon::from_text(LEXICON).expect("bench lexicon")
}

fn bench_bigram() -> Bigram {
    let mut bigram = Bigram::new();
    for (prev, next, freq) in [
        (103, 108, 40),
        (108, 109, 35),
        (109, 114, 30),
        (114, 115, 25),
        (115, 117, 20),
        (100, 119, 15),
        (119, 120, 12),
    ] {
        bigram.insert(PhraseToken(prev), PhraseToken(next), freq);
    }
    bigram
}

static INPUTS: &[(&str, &str)] = &[
    ("short", "wo'men"),
    ("medium", "wo'men'jin'tian'qu"),
    ("long", "wo'men'jin'tian'qu'gong'yuan'wan'ba"),
    ("fuzzy", "wo'men'jin|jing'tian'qu'gong'yuan|yan'wan'ba"),
];

fn bench_unigram(c: &mut Criterion) {
    let lex = bench_lexicon();
    let mut group = c.benchmark_group("lookup/unigram");
    for &(label, spelling) in INPUTS {
        let matrix = PhoneticKeyMatrix::from_spelling(spelling);
        let constraints = Constraints::with_len(matrix.size());
        let mut lookup = PhoneticLookup::<10>::new(&lex, &lex);
        group.bench_with_input(BenchmarkId::new(label, matrix.size()), &matrix, |b, matrix| {
            b.iter(|| lookup.get_best_match(&[], matrix, &constraints));
        });
    }
    group.finish();
}

fn bench_bigram_k(c: &mut Criterion) {
    let lex = bench_lexicon();
    let bigram = bench_bigram();
    let matrix = PhoneticKeyMatrix::from_spelling(INPUTS[2].1);
    let constraints = Constraints::with_len(matrix.size());
    let mut group = c.benchmark_group("lookup/bigram");

    let mut k1 = PhoneticLookup::<1>::new(&lex, &lex).with_system_bigram(&bigram);
    group.bench_function("k1", |b| b.iter(|| k1.get_best_match(&[], &matrix, &constraints)));

    let mut k10 = PhoneticLookup::<10>::new(&lex, &lex).with_system_bigram(&bigram);
    group.bench_function("k10", |b| b.iter(|| k10.get_best_match(&[], &matrix, &constraints)));

    let mut k32 = PhoneticLookup::<32>::new(&lex, &lex).with_system_bigram(&bigram);
    group.bench_function("k32", |b| b.iter(|| k32.get_best_match(&[], &matrix, &constraints)));

    group.finish();
}

criterion_group!(benches, bench_unigram, bench_bigram_k);
criterion_main!(benches);
