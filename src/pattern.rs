use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("wildcard pattern '{0}' contains a path separator")]
    PathSeparator(String),
    #[error("wildcard pattern '{0}' contains a NUL byte")]
    NulByte(String),
}

/// Case-insensitive, whole-name filename matcher.
///
/// `*` matches any run of characters (including none). Every other character,
/// `?` and `[` included, matches only itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardPattern {
    /// Lowercased literal pieces between the stars. One piece means no star.
    segments: Vec<String>,
}

impl WildcardPattern {
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        if pattern.contains('/') {
            return Err(PatternError::PathSeparator(pattern.to_string()));
        }
        if pattern.contains('\0') {
            return Err(PatternError::NulByte(pattern.to_string()));
        }

        let segments = fold_case(pattern).split('*').map(str::to_string).collect();
        Ok(Self { segments })
    }

    pub fn matches(&self, filename: &str) -> bool {
        let name = fold_case(filename);
        let (first, rest) = match self.segments.split_first() {
            Some(split) => split,
            None => return name.is_empty(),
        };
        let Some((last, middle)) = rest.split_last() else {
            return name == *first;
        };

        if name.len() < first.len() + last.len()
            || !name.starts_with(first.as_str())
            || !name.ends_with(last.as_str())
        {
            return false;
        }

        // Leftmost placement of each middle piece leaves the most room for the rest.
        let mut window = &name[first.len()..name.len() - last.len()];
        for piece in middle {
            match window.find(piece.as_str()) {
                Some(at) => window = &window[at + piece.len()..],
                None => return false,
            }
        }
        true
    }
}

fn fold_case(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}
