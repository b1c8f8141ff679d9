use crate::dict::{Bigram, Lexicon};
use crate::matrix::PhoneticKeyMatrix;
use crate::token::PhraseToken;

pub const NI: PhraseToken = PhraseToken(10);
pub const NI_MUD: PhraseToken = PhraseToken(11);
pub const HAO: PhraseToken = PhraseToken(12);
pub const HAO_NUMBER: PhraseToken = PhraseToken(13);
pub const NIHAO: PhraseToken = PhraseToken(14);
pub const MA: PhraseToken = PhraseToken(15);
pub const MA_MOTHER: PhraseToken = PhraseToken(16);

const LEXICON: &str = "\
ni\t你\t10\t100
ni\t泥\t11\t1
hao\t好\t12\t80
hao\t号\t13\t20
ni'hao\t你好\t14\t50
ma\t吗\t15\t40
ma\t妈\t16\t10
";

/// Small pinyin lexicon shared by the lookup tests.
pub fn test_lexicon() -> Lexicon {
    Lexicon::from_text(LEXICON).unwrap()
}

pub fn bigram(pairs: &[(PhraseToken, PhraseToken, u32)]) -> Bigram {
    let mut b = Bigram::new();
    for &(prev, next, freq) in pairs {
        b.insert(prev, next, freq);
    }
    b
}

pub fn matrix(spelling: &str) -> PhoneticKeyMatrix {
    PhoneticKeyMatrix::from_spelling(spelling)
}
