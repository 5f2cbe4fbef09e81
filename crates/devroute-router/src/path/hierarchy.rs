/// Lazy iterator over a path and its ancestors
///
/// For `/a/b/c` it yields `/a/b/c` → `/a/b` → `/a` → `/`.
/// Only borrows from the input; no allocations.
///
/// # Examples
///
/// ```
/// use devroute_router::path::PathHierarchy;
///
/// let paths: Vec<&str> = PathHierarchy::new("/devices/r1").collect();
/// assert_eq!(paths, vec!["/devices/r1", "/devices", "/"]);
/// ```
#[derive(Debug, Clone)]
pub struct PathHierarchy<'a> {
    current: Option<&'a str>,
}

impl<'a> PathHierarchy<'a> {
    pub fn new(path: &'a str) -> Self {
        Self {
            current: Some(path),
        }
    }
}

impl<'a> Iterator for PathHierarchy<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;

        self.current = if current == "/" {
            None
        } else {
            match current.rfind('/') {
                Some(0) => Some("/"),
                Some(slash_pos) => Some(&current[..slash_pos]),
                None => None,
            }
        };

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_hierarchy() {
        let paths: Vec<&str> = PathHierarchy::new("/a/b/c").collect();
        assert_eq!(paths, vec!["/a/b/c", "/a/b", "/a", "/"]);

        let paths: Vec<&str> = PathHierarchy::new("/").collect();
        assert_eq!(paths, vec!["/"]);
    }

    #[test]
    fn test_path_hierarchy_short_circuit() {
        let mut iter = PathHierarchy::new("/devices/r1/stats");
        assert_eq!(iter.find(|&p| p == "/devices"), Some("/devices"));
        assert_eq!(iter.next(), Some("/"));
        assert_eq!(iter.next(), None);
    }
}
