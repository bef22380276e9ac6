//! Ranked tables of participants.
//!
//! A [`Standings`] table has a list of column keys and one [`Entry`] per participant, ordered
//! from the best to the worst rank. Every entry has exactly one value per key.
use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::iter::FusedIterator;

use crate::ParticipantId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Standings {
    keys: Vec<Cow<'static, str>>,
    entries: Vec<Entry>,
}

impl Standings {
    #[inline]
    pub fn builder() -> Builder {
        Builder::new()
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self,
            next: 0,
        }
    }

    #[inline]
    pub fn keys(&self) -> Keys<'_> {
        Keys {
            inner: self,
            next: 0,
        }
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the 0-based rank of the participant with the given `id`.
    pub fn position<Q>(&self, id: &Q) -> Option<usize>
    where
        Q: AsRef<str> + ?Sized,
    {
        let id = id.as_ref();
        self.entries.iter().position(|e| e.participant_id == id)
    }

    /// Returns the value of the column `key` for the participant with the given `id`.
    pub fn value<Q>(&self, id: &Q, key: &str) -> Option<&EntryValue>
    where
        Q: AsRef<str> + ?Sized,
    {
        let column = self.keys.iter().position(|k| k == key)?;
        let entry = &self.entries[self.position(id)?];
        entry.values.get(column)
    }
}

impl<'a> IntoIterator for &'a Standings {
    type Item = &'a Entry;
    type IntoIter = Iter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Builder {
    keys: Vec<Cow<'static, str>>,
    entries: Vec<Entry>,
}

impl Builder {
    #[inline]
    pub const fn new() -> Self {
        Self {
            keys: Vec::new(),
            entries: Vec::new(),
        }
    }

    #[inline]
    pub fn key<K>(&mut self, key: K) -> &mut Self
    where
        K: Into<Cow<'static, str>>,
    {
        self.keys.push(key.into());
        self
    }

    /// Appends an entry for the participant `id` below all previous entries.
    pub fn entry<F>(&mut self, id: ParticipantId, f: F) -> &mut Self
    where
        F: FnOnce(&mut EntryBuilder),
    {
        let mut builder = EntryBuilder::new(id);
        f(&mut builder);

        debug_assert_eq!(builder.values.len(), self.keys.len());

        self.entries.push(builder.build());
        self
    }

    #[inline]
    pub fn build(self) -> Standings {
        Standings {
            keys: self.keys,
            entries: self.entries,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EntryBuilder {
    participant_id: ParticipantId,
    values: Vec<EntryValue>,
}

impl EntryBuilder {
    #[inline]
    const fn new(participant_id: ParticipantId) -> Self {
        Self {
            participant_id,
            values: Vec::new(),
        }
    }

    #[inline]
    pub fn value<V>(&mut self, value: V) -> &mut Self
    where
        V: Into<EntryValue>,
    {
        self.values.push(value.into());
        self
    }

    #[inline]
    fn build(self) -> Entry {
        Entry {
            participant_id: self.participant_id,
            values: self.values,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Iter<'a> {
    inner: &'a Standings,
    next: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Entry;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.entries.get(self.next)?;
        self.next += 1;
        Some(entry)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len(), Some(self.len()))
    }
}

impl<'a> ExactSizeIterator for Iter<'a> {
    #[inline]
    fn len(&self) -> usize {
        self.inner.entries.len() - self.next
    }
}

impl<'a> FusedIterator for Iter<'a> {}

#[derive(Clone, Debug)]
pub struct Keys<'a> {
    inner: &'a Standings,
    next: usize,
}

impl<'a> Iterator for Keys<'a> {
    type Item = &'a str;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let key = self.inner.keys.get(self.next)?;
        self.next += 1;
        Some(key)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len(), Some(self.len()))
    }
}

impl<'a> ExactSizeIterator for Keys<'a> {
    #[inline]
    fn len(&self) -> usize {
        self.inner.keys.len() - self.next
    }
}

impl<'a> FusedIterator for Keys<'a> {}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Entry {
    pub participant_id: ParticipantId,
    pub values: Vec<EntryValue>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum EntryValue {
    U64(u64),
    Str(Cow<'static, str>),
}

impl Display for EntryValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::U64(val) => Display::fmt(val, f),
            Self::Str(val) => Display::fmt(val, f),
        }
    }
}

impl From<u64> for EntryValue {
    #[inline]
    fn from(value: u64) -> Self {
        Self::U64(value)
    }
}

impl From<u32> for EntryValue {
    #[inline]
    fn from(value: u32) -> Self {
        Self::U64(value.into())
    }
}

impl From<&'static str> for EntryValue {
    #[inline]
    fn from(value: &'static str) -> Self {
        Self::Str(Cow::Borrowed(value))
    }
}

impl From<String> for EntryValue {
    #[inline]
    fn from(value: String) -> Self {
        Self::Str(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::{EntryValue, Standings};
    use crate::ParticipantId;

    #[test]
    fn test_standings_builder() {
        let mut builder = Standings::builder();
        builder.key("Wins").key("Team");
        builder.entry(ParticipantId::from("b"), |entry| {
            entry.value(3_u64).value("Blue");
        });
        builder.entry(ParticipantId::from("a"), |entry| {
            entry.value(1_u64).value(String::from("Red"));
        });

        let standings = builder.build();

        assert_eq!(standings.keys().collect::<Vec<_>>(), ["Wins", "Team"]);
        assert_eq!(standings.len(), 2);
        assert_eq!(standings.iter().len(), 2);
        assert_eq!(standings.position("b"), Some(0));
        assert_eq!(standings.position("a"), Some(1));
        assert_eq!(standings.position("c"), None);
        assert_eq!(standings.value("a", "Wins"), Some(&EntryValue::U64(1)));
        assert_eq!(
            standings.value("b", "Team").map(ToString::to_string),
            Some("Blue".to_owned())
        );
        assert_eq!(standings.value("b", "Losses"), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_entry_value_serde() {
        use serde_test::{assert_ser_tokens, Token};

        assert_ser_tokens(&EntryValue::U64(4), &[Token::U64(4)]);
        assert_ser_tokens(&EntryValue::from("Blue"), &[Token::Str("Blue")]);
    }
}
