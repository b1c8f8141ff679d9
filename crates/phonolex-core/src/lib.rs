//! Phonetic lattice decoding for input methods.
//!
//! Given a matrix of ambiguous phonetic keys, [`lookup::PhoneticLookup`]
//! finds the N most probable phrase-token sequences under an interpolated
//! unigram/bigram model, honoring the user's fixed selections.

pub mod dict;
pub mod lookup;
pub mod matrix;
pub mod session;
pub mod settings;
pub mod token;
