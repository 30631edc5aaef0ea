//! Header storage for HTTP messages.
//!
//! [`HeaderTable`] keeps header fields in arrival order inside a fixed-capacity
//! vector. Names are matched case-sensitively. Inserting a name that is
//! already present does not overwrite: the new value is appended to the old
//! one with a `,` separator, which is how RFC 2616 §4.2 says repeated fields
//! combine (`Set-Cookie: a` + `Set-Cookie: b` is stored as `a,b`).

use heapless::{String, Vec};

/// Maximum number of distinct header names in a table.
pub const MAX_HEADERS: usize = 16;
/// Maximum length of a header name in bytes.
pub const MAX_HEADER_NAME_LEN: usize = 64;
/// Maximum length of a header value in bytes, merged values included.
pub const MAX_HEADER_VALUE_LEN: usize = 256;

/// A single header field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Field name as received.
    pub name: String<MAX_HEADER_NAME_LEN>,
    /// Field value, leading and trailing whitespace removed.
    pub value: String<MAX_HEADER_VALUE_LEN>,
}

/// Errors returned by [`HeaderTable`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderError {
    /// The header name is empty.
    EmptyName,
    /// The header name exceeds [`MAX_HEADER_NAME_LEN`].
    NameTooLong,
    /// The value (after merging) exceeds [`MAX_HEADER_VALUE_LEN`].
    ValueTooLong,
    /// The table already holds [`MAX_HEADERS`] names.
    TableFull,
    /// No header with this name exists.
    NotFound,
}

impl core::fmt::Display for HeaderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HeaderError::EmptyName => f.write_str("header name is empty"),
            HeaderError::NameTooLong => f.write_str("header name too long"),
            HeaderError::ValueTooLong => f.write_str("header value too long"),
            HeaderError::TableFull => f.write_str("header table full"),
            HeaderError::NotFound => f.write_str("header not found"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HeaderError {}

#[cfg(feature = "defmt")]
impl defmt::Format for HeaderError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            HeaderError::EmptyName => defmt::write!(f, "EmptyName"),
            HeaderError::NameTooLong => defmt::write!(f, "NameTooLong"),
            HeaderError::ValueTooLong => defmt::write!(f, "ValueTooLong"),
            HeaderError::TableFull => defmt::write!(f, "TableFull"),
            HeaderError::NotFound => defmt::write!(f, "NotFound"),
        }
    }
}

/// Case-sensitive, insertion-ordered header map with duplicate merging.
///
/// # Examples
///
/// ```rust
/// use uphttp::network::application::http::HeaderTable;
///
/// let mut headers = HeaderTable::new();
/// headers.insert("Set-Cookie", "a").unwrap();
/// headers.insert("Set-Cookie", "b").unwrap();
///
/// assert_eq!(headers.get("Set-Cookie"), Some("a,b"));
/// assert_eq!(headers.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderTable {
    entries: Vec<Header, MAX_HEADERS>,
}

impl HeaderTable {
    /// Creates an empty table.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table holds no headers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds a header, merging with an existing value of the same name.
    ///
    /// On error the table is left unchanged.
    pub fn insert(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        check_name(name)?;

        if let Some(header) = self.entries.iter_mut().find(|h| h.name.as_str() == name) {
            if header.value.len() + 1 + value.len() > MAX_HEADER_VALUE_LEN {
                return Err(HeaderError::ValueTooLong);
            }
            header
                .value
                .push(',')
                .map_err(|_| HeaderError::ValueTooLong)?;
            return header
                .value
                .push_str(value)
                .map_err(|_| HeaderError::ValueTooLong);
        }

        self.push(name, value)
    }

    /// Sets a header, replacing any existing value of the same name.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        check_name(name)?;

        if let Some(header) = self.entries.iter_mut().find(|h| h.name.as_str() == name) {
            header.value = String::try_from(value).map_err(|_| HeaderError::ValueTooLong)?;
            return Ok(());
        }

        self.push(name, value)
    }

    /// Returns the value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|h| h.name.as_str() == name)
            .map(|h| h.value.as_str())
    }

    /// Returns the first value whose name matches `name` ignoring ASCII case.
    pub fn get_ignore_ascii_case(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Returns `true` if a header named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes the header named `name`.
    pub fn remove(&mut self, name: &str) -> Result<(), HeaderError> {
        let index = self
            .entries
            .iter()
            .position(|h| h.name.as_str() == name)
            .ok_or(HeaderError::NotFound)?;
        self.entries.remove(index);
        Ok(())
    }

    /// Removes every header.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|h| (h.name.as_str(), h.value.as_str()))
    }

    /// Iterates over header names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|h| h.name.as_str())
    }

    /// Iterates over header values.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|h| h.value.as_str())
    }

    fn push(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        if self.entries.is_full() {
            return Err(HeaderError::TableFull);
        }
        let header = Header {
            name: String::try_from(name).map_err(|_| HeaderError::NameTooLong)?,
            value: String::try_from(value).map_err(|_| HeaderError::ValueTooLong)?,
        };
        self.entries
            .push(header)
            .map_err(|_| HeaderError::TableFull)
    }
}

impl<'a> IntoIterator for &'a HeaderTable {
    type Item = &'a Header;
    type IntoIter = core::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn check_name(name: &str) -> Result<(), HeaderError> {
    if name.is_empty() {
        return Err(HeaderError::EmptyName);
    }
    if name.len() > MAX_HEADER_NAME_LEN {
        return Err(HeaderError::NameTooLong);
    }
    Ok(())
}
