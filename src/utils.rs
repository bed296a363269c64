//! Common utility functions shared across the codebase.

/// Turns a machine handle into a human-readable label.
///
/// Replaces `_`, `-` and `/` with spaces and uppercases the first letter
/// of each word. Consecutive separators are preserved as spaces, and the
/// rest of each word is left untouched.
///
/// # Examples
///
/// ```
/// use potx::utils::humanize;
///
/// assert_eq!(humanize("hi_there"), "Hi There");
/// assert_eq!(humanize("sidebar-list"), "Sidebar List");
/// assert_eq!(humanize("view"), "View");
/// ```
pub fn humanize(handle: &str) -> String {
    let mut result = String::with_capacity(handle.len());
    let mut at_word_start = true;
    for c in handle.chars() {
        match c {
            '_' | '-' | '/' | ' ' => {
                result.push(' ');
                at_word_start = true;
            }
            _ if at_word_start => {
                result.extend(c.to_uppercase());
                at_word_start = false;
            }
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use crate::utils::*;

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("view"), "View");
        assert_eq!(humanize("hi_there"), "Hi There");
        assert_eq!(humanize("a-b/c"), "A B C");
        assert_eq!(humanize("myTemplate"), "MyTemplate");
        assert_eq!(humanize(""), "");

        // Consecutive separators are not collapsed.
        assert_eq!(humanize("foo__bar"), "Foo  Bar");
    }
}
