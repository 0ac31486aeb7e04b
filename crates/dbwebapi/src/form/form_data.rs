/// Text fields of a multipart form.
///
/// Keys compare case-insensitively and keep first-insertion order. Each key
/// holds zero or more values; a key added only with absent values reports
/// `None` from [`FormData::values`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, Vec<String>)>,
}

impl FormData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under `name`. An absent value registers the key only.
    pub fn add(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        let index = match self.position(&name) {
            Some(index) => index,
            None => {
                self.entries.push((name, Vec::new()));
                self.entries.len() - 1
            }
        };
        if let Some(value) = value {
            self.entries[index].1.push(value);
        }
    }

    /// Values stored under `name`
    #[must_use]
    pub fn values(&self, name: &str) -> Option<&[String]> {
        self.position(name)
            .and_then(|index| non_empty(&self.entries[index].1))
    }

    /// Keys with their values, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&[String]>)> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), non_empty(values)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))
    }
}

fn non_empty(values: &[String]) -> Option<&[String]> {
    (!values.is_empty()).then_some(values)
}
