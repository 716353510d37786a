/// Maximum number of symbols an LTR file can declare.
pub const MAX_LETTERS: usize = 28;

/// The fixed LTR alphabet: `a`..`z`, apostrophe, hyphen.
pub const ALPHABET: [char; MAX_LETTERS] = [
	'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm',
	'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
	'\'', '-',
];

/// Returns the character for a symbol index, if the index is in the alphabet.
pub fn symbol(index: usize) -> Option<char> {
	ALPHABET.get(index).copied()
}

/// Returns the symbol index of a character (case-insensitive).
pub fn index_of(c: char) -> Option<usize> {
	let c = c.to_ascii_lowercase();
	ALPHABET.iter().position(|&s| s == c)
}

/// Turns a sequence of symbol indices into a name.
///
/// The first character is uppercased when it is a letter; a leading
/// apostrophe or hyphen is kept as is.
pub fn render_name(symbols: &[usize]) -> String {
	let mut name = String::with_capacity(symbols.len());
	for (pos, &index) in symbols.iter().enumerate() {
		let Some(c) = symbol(index) else { continue };
		if pos == 0 {
			name.push(c.to_ascii_uppercase());
		} else {
			name.push(c);
		}
	}
	name
}
