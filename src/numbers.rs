/// A mailbox value, either data or an instruction depending on when it is fetched.
pub type Word = i16;

/// Bytes per word in an image file.
pub const WORD_BYTES: usize = size_of::<Word>();

/// Opcodes are multiples of this, the operand is the remainder.
pub const OPCODE_UNIT: Word = 100;

/// Reinterprets native-endian image bytes as words.
///
/// Callers have to make sure `bytes.len()` is a multiple of [`WORD_BYTES`],
/// a trailing partial word is ignored.
pub fn words_from_ne_bytes(bytes: &[u8]) -> Vec<Word> {
    bytes
        .chunks_exact(WORD_BYTES)
        .map(|c| Word::from_ne_bytes([c[0], c[1]]))
        .collect()
}

pub fn words_to_ne_bytes(words: &[Word]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_ne_bytes()).collect()
}

/// Splits a word into `(opcode, operand)` with `operand = word % 100` and
/// `opcode = word - operand`.
///
/// The remainder keeps the sign of the word, so negative words yield a
/// negative operand which never passes address validation.
pub const fn split_word(word: Word) -> (Word, Word) {
    let operand = word % OPCODE_UNIT;
    (word - operand, operand)
}
