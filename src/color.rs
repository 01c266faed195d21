use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

impl Color {
    pub const ALL: [Color; 5] = [
        Color::White,
        Color::Blue,
        Color::Black,
        Color::Red,
        Color::Green,
    ];

    /// The single-letter mana symbol used in color identity lists.
    pub const fn symbol(self) -> char {
        match self {
            Color::White => 'W',
            Color::Blue => 'U',
            Color::Black => 'B',
            Color::Red => 'R',
            Color::Green => 'G',
        }
    }

    /// Parses a mana symbol (`"W"`, `"u"`, ...) into a color.
    pub fn from_symbol(symbol: &str) -> Result<Self, ParseError> {
        match symbol.trim().to_ascii_uppercase().as_str() {
            "W" => Ok(Color::White),
            "U" => Ok(Color::Blue),
            "B" => Ok(Color::Black),
            "R" => Ok(Color::Red),
            "G" => Ok(Color::Green),
            _ => Err(ParseError::ColorSymbol(symbol.to_string())),
        }
    }

    /// The basic land that produces this color.
    pub const fn basic_land_name(self) -> &'static str {
        match self {
            Color::White => "Plains",
            Color::Blue => "Island",
            Color::Black => "Swamp",
            Color::Red => "Mountain",
            Color::Green => "Forest",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A color identity represented as bitflags.
///
/// The empty set is a colorless identity. Serializes as a list of mana
/// symbols in WUBRG order, which is also the shape reference payloads use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorSet(u8);

impl ColorSet {
    pub const COLORLESS: Self = Self(0);
    pub const WHITE: Self = Self(1 << 0);
    pub const BLUE: Self = Self(1 << 1);
    pub const BLACK: Self = Self(1 << 2);
    pub const RED: Self = Self(1 << 3);
    pub const GREEN: Self = Self(1 << 4);

    pub const fn from_color(color: Color) -> Self {
        match color {
            Color::White => Self::WHITE,
            Color::Blue => Self::BLUE,
            Color::Black => Self::BLACK,
            Color::Red => Self::RED,
            Color::Green => Self::GREEN,
        }
    }

    /// Parses a list of mana symbols such as `["W", "U"]`.
    pub fn from_symbols<I, S>(symbols: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        symbols
            .into_iter()
            .try_fold(Self::COLORLESS, |set, symbol| {
                Ok(set.with(Color::from_symbol(symbol.as_ref())?))
            })
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, color: Color) -> bool {
        self.0 & Self::from_color(color).0 != 0
    }

    /// Returns true if this set contains all colors in the other set.
    pub const fn contains_all(self, other: ColorSet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if every color of this set is also in `other`.
    pub const fn is_subset_of(self, other: ColorSet) -> bool {
        other.contains_all(self)
    }

    pub const fn union(self, other: ColorSet) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn with(self, color: Color) -> Self {
        self.union(Self::from_color(color))
    }

    /// Colors in this set, in WUBRG order.
    pub fn iter(self) -> impl Iterator<Item = Color> {
        Color::ALL.into_iter().filter(move |color| self.contains(*color))
    }
}

/// Commander-format legality: a card may be played only if its color
/// identity fits inside the commander's (partner included).
pub fn is_legal(candidate: ColorSet, commander: ColorSet) -> bool {
    candidate.is_subset_of(commander)
}

impl From<Color> for ColorSet {
    fn from(color: Color) -> Self {
        Self::from_color(color)
    }
}

impl FromIterator<Color> for ColorSet {
    fn from_iter<T: IntoIterator<Item = Color>>(iter: T) -> Self {
        iter.into_iter()
            .fold(ColorSet::COLORLESS, |set, color| set.with(color))
    }
}

impl fmt::Display for ColorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("C");
        }
        for color in self.iter() {
            write!(f, "{}", color)?;
        }
        Ok(())
    }
}

impl Serialize for ColorSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter().map(|color| color.symbol().to_string()))
    }
}

struct ColorSetVisitor;

impl<'de> Visitor<'de> for ColorSetVisitor {
    type Value = ColorSet;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a list of mana symbols")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut set = ColorSet::COLORLESS;
        while let Some(symbol) = seq.next_element::<String>()? {
            let color = Color::from_symbol(&symbol).map_err(de::Error::custom)?;
            set = set.with(color);
        }
        Ok(set)
    }

    // Some exports flatten the identity into a single string ("WU").
    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        ColorSet::from_symbols(v.chars().filter(|c| !c.is_whitespace()).map(String::from))
            .map_err(E::custom)
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(ColorSet::COLORLESS)
    }
}

impl<'de> Deserialize<'de> for ColorSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ColorSetVisitor)
    }
}
