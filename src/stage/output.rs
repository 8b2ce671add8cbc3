//! Stage output type.

use smallvec::SmallVec;

/// Inline capacity for multi-item output before spilling to the heap.
const INLINE_OUTPUT: usize = 4;

/// Output of a stage hook.
///
/// Represents the zero or more items produced from one input:
/// - `None`: No output (item was consumed or filtered)
/// - `Single`: One output item
/// - `Multiple`: Several output items, delivered in order
///
/// # Examples
///
/// ```rust
/// use sluice::stage::Output;
///
/// // No output (filter)
/// let out: Output<u32> = Output::none();
/// assert!(out.is_empty());
///
/// // Single output (most common)
/// let out = Output::single(7u32);
/// assert_eq!(out.len(), 1);
///
/// // Multiple outputs (e.g., splitting a line)
/// let out: Output<&str> = "a,b,c".split(',').collect();
/// assert_eq!(out.into_vec(), vec!["a", "b", "c"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Output<T> {
    /// No output.
    None,
    /// Single output item.
    Single(T),
    /// Multiple output items.
    Multiple(SmallVec<[T; INLINE_OUTPUT]>),
}

impl<T> Output<T> {
    /// Create a single item output.
    #[inline]
    pub fn single(item: T) -> Self {
        Self::Single(item)
    }

    /// Create an empty output.
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    /// Get the number of output items.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Single(_) => 1,
            Self::Multiple(v) => v.len(),
        }
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert to a Vec of items.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::None => vec![],
            Self::Single(item) => vec![item],
            Self::Multiple(v) => v.into_vec(),
        }
    }
}

impl<T> Default for Output<T> {
    fn default() -> Self {
        Self::None
    }
}

impl<T> From<Option<T>> for Output<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(item) => Self::Single(item),
            None => Self::None,
        }
    }
}

impl<T> From<Vec<T>> for Output<T> {
    fn from(v: Vec<T>) -> Self {
        v.into_iter().collect()
    }
}

impl<T> FromIterator<T> for Output<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut items: SmallVec<[T; INLINE_OUTPUT]> = iter.into_iter().collect();
        match items.len() {
            0 => Self::None,
            1 => items.pop().map_or(Self::None, Self::Single),
            _ => Self::Multiple(items),
        }
    }
}

impl<T> IntoIterator for Output<T> {
    type Item = T;
    type IntoIter = OutputIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        OutputIter(match self {
            Output::None => OutputIterInner::None,
            Output::Single(item) => OutputIterInner::Single(Some(item)),
            Output::Multiple(v) => OutputIterInner::Multiple(v.into_iter()),
        })
    }
}

/// Iterator over output items.
pub struct OutputIter<T>(OutputIterInner<T>);

enum OutputIterInner<T> {
    None,
    Single(Option<T>),
    Multiple(smallvec::IntoIter<[T; INLINE_OUTPUT]>),
}

impl<T> Iterator for OutputIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.0 {
            OutputIterInner::None => None,
            OutputIterInner::Single(opt) => opt.take(),
            OutputIterInner::Multiple(iter) => iter.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.0 {
            OutputIterInner::None => (0, Some(0)),
            OutputIterInner::Single(opt) => {
                let n = usize::from(opt.is_some());
                (n, Some(n))
            }
            OutputIterInner::Multiple(iter) => iter.size_hint(),
        }
    }
}

impl<T> ExactSizeIterator for OutputIter<T> {}
