use std::fmt;

/// Labels the detection service's model emits, indexed by class id.
pub const DEFAULT_CLASS_NAMES: [&str; 22] = [
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
];

/// Result of resolving a class index against a [`ClassNameTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassLabel<'a> {
    Named(&'a str),
    /// Index outside the table; rendered as `class-<index>`.
    Unlisted(i64),
}

impl fmt::Display for ClassLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassLabel::Named(name) => f.write_str(name),
            ClassLabel::Unlisted(index) => write!(f, "class-{index}"),
        }
    }
}

/// Fixed, ordered class labels. Built from constants or configuration, never
/// inferred from detection data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNameTable {
    names: Vec<String>,
}

impl Default for ClassNameTable {
    fn default() -> Self {
        Self::from_names(DEFAULT_CLASS_NAMES.iter().map(|s| s.to_string()).collect())
    }
}

impl ClassNameTable {
    pub fn from_names(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn resolve(&self, index: i64) -> ClassLabel<'_> {
        match usize::try_from(index).ok().and_then(|i| self.names.get(i)) {
            Some(name) if !name.is_empty() => ClassLabel::Named(name),
            _ => ClassLabel::Unlisted(index),
        }
    }
}
