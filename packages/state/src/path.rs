//! Path type: an ordered sequence of string keys into the state tree.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A path into the state tree.
///
/// A component is any string the tree can hold as a map key, including the
/// empty string and strings containing `/`. The `/` separator only exists in
/// [`Path::parse`] and `Display`; build paths from components when keys may
/// contain it. The empty path addresses the root.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Path {
    pub components: Vec<String>,
}

impl Path {
    /// The root path (no components).
    pub fn root() -> Self {
        Path {
            components: Vec::new(),
        }
    }

    /// Parse a slash-separated path string.
    ///
    /// Empty segments are ignored, so `//` and leading or trailing slashes
    /// normalize away.
    ///
    /// ```rust
    /// use factor_state::Path;
    ///
    /// let path = Path::parse("world/items/i1");
    /// assert_eq!(path.len(), 3);
    /// assert_eq!(Path::parse("/world/items/"), Path::parse("world/items"));
    /// ```
    pub fn parse(s: &str) -> Self {
        Path {
            components: s
                .split('/')
                .filter(|c| !c.is_empty())
                .map(|c| c.to_string())
                .collect(),
        }
    }

    /// Create a path from components, taken verbatim.
    ///
    /// ```rust
    /// use factor_state::Path;
    ///
    /// let path = Path::from_components(["world", "items", "ore/plate"]);
    /// assert_eq!(path.len(), 3);
    /// ```
    pub fn from_components<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Path {
            components: components.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if this path is empty (root path).
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Get the number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Iterate over components.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &String> {
        self.components.iter()
    }

    /// Extend this path by one key.
    #[must_use]
    pub fn child(&self, key: impl Into<String>) -> Path {
        let mut components = self.components.clone();
        components.push(key.into());
        Path { components }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.components.join("/"))
    }
}

// The string form is lossy for keys that are empty or contain `/`.
impl Serialize for Path {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D>(deserializer: D) -> Result<Path, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        Ok(Path::parse(&s))
    }
}

/// Macro for building paths.
///
/// Accepts either a single slash-separated literal or a list of key
/// expressions, each converted with `ToString` and used verbatim.
///
/// # Example
///
/// ```rust
/// use factor_state::path;
///
/// let id = "3f2c";
/// assert_eq!(path!("world/items/3f2c"), path!("world", "items", id));
/// assert!(path!().is_empty());
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::root()
    };
    ($s:literal) => {
        $crate::Path::parse($s)
    };
    ($($key:expr),+ $(,)?) => {
        $crate::Path::from_components([$(::std::string::ToString::to_string(&$key)),+])
    };
}
