/// An ordered, duplicate-free list of argument vectors to try in turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateList(Vec<Vec<String>>);

impl CandidateList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate unless an identical one is already present.
    /// Returns whether it was added.
    pub fn push<I, S>(&mut self, args: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        if self.contains(&args) {
            return false;
        }
        self.0.push(args);
        true
    }

    pub fn contains(&self, args: &[String]) -> bool {
        self.0.iter().any(|c| c == args)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&[String]> {
        self.0.first().map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[String]> {
        self.0.iter().map(Vec::as_slice)
    }

    pub fn into_inner(self) -> Vec<Vec<String>> {
        self.0
    }
}

impl<V, S> FromIterator<V> for CandidateList
where
    V: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = V>>(iter: T) -> Self {
        let mut list = Self::new();
        for args in iter {
            list.push(args);
        }
        list
    }
}

impl From<Vec<Vec<String>>> for CandidateList {
    fn from(candidates: Vec<Vec<String>>) -> Self {
        candidates.into_iter().collect()
    }
}
