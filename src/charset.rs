use std::fmt;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()_+";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterClass {
    Lowercase,
    Uppercase,
    Digit,
    Symbol,
}

impl CharacterClass {
    /// Every class, in the order their alphabets are concatenated.
    pub const ALL: [CharacterClass; 4] = [
        CharacterClass::Lowercase,
        CharacterClass::Uppercase,
        CharacterClass::Digit,
        CharacterClass::Symbol,
    ];

    pub fn alphabet(self) -> &'static [u8] {
        match self {
            CharacterClass::Lowercase => LOWERCASE,
            CharacterClass::Uppercase => UPPERCASE,
            CharacterClass::Digit => DIGITS,
            CharacterClass::Symbol => SYMBOLS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CharacterClass::Lowercase => "Lowercase",
            CharacterClass::Uppercase => "Uppercase",
            CharacterClass::Digit => "Numbers",
            CharacterClass::Symbol => "Symbols",
        }
    }

    fn bit(self) -> u8 {
        match self {
            CharacterClass::Lowercase => 1 << 0,
            CharacterClass::Uppercase => 1 << 1,
            CharacterClass::Digit => 1 << 2,
            CharacterClass::Symbol => 1 << 3,
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Set of enabled character classes.
///
/// Iteration and alphabet assembly always follow [`CharacterClass::ALL`],
/// no matter in which order classes were inserted.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassSet(u8);

impl ClassSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        CharacterClass::ALL.into_iter().collect()
    }

    pub fn with(mut self, class: CharacterClass) -> Self {
        self.insert(class);
        self
    }

    pub fn contains(&self, class: CharacterClass) -> bool {
        self.0 & class.bit() != 0
    }

    pub fn insert(&mut self, class: CharacterClass) {
        self.0 |= class.bit();
    }

    pub fn remove(&mut self, class: CharacterClass) {
        self.0 &= !class.bit();
    }

    /// Flips `class` and returns whether it is now enabled.
    pub fn toggle(&mut self, class: CharacterClass) -> bool {
        self.0 ^= class.bit();
        self.contains(class)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = CharacterClass> + '_ {
        CharacterClass::ALL
            .into_iter()
            .filter(move |class| self.contains(*class))
    }

    pub fn alphabet(&self) -> Vec<u8> {
        let mut alphabet = Vec::with_capacity(self.alphabet_size());
        for class in self.iter() {
            alphabet.extend_from_slice(class.alphabet());
        }
        alphabet
    }

    pub fn alphabet_size(&self) -> usize {
        self.iter().map(|class| class.alphabet().len()).sum()
    }
}

impl Default for ClassSet {
    fn default() -> Self {
        Self::empty().with(CharacterClass::Lowercase)
    }
}

impl FromIterator<CharacterClass> for ClassSet {
    fn from_iter<I: IntoIterator<Item = CharacterClass>>(iter: I) -> Self {
        let mut set = Self::empty();
        for class in iter {
            set.insert(class);
        }
        set
    }
}

impl fmt::Debug for ClassSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
