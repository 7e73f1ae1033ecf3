//! Archive-internal path resolution

/// Resolve `relative` against the directory of `base`.
///
/// `.` segments are skipped and `..` pops one directory; popping past the
/// archive root is a no-op. Paths are otherwise used exactly as written.
pub fn resolve(base: &str, relative: &str) -> String {
    let mut stack: Vec<&str> = base.split('/').collect();
    stack.pop();

    for part in relative.split('/') {
        match part {
            "." => continue,
            ".." => {
                stack.pop();
            }
            _ => stack.push(part),
        }
    }

    stack.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_sibling_directory() {
        assert_eq!(
            resolve("OEBPS/content.opf", "text/chapter1.html"),
            "OEBPS/text/chapter1.html"
        );
    }

    #[test]
    fn test_resolve_parent_traversal() {
        assert_eq!(
            resolve("OEBPS/content.opf", "../images/cover.png"),
            "images/cover.png"
        );
    }

    #[test]
    fn test_resolve_root_package() {
        assert_eq!(resolve("content.opf", "chapter.xhtml"), "chapter.xhtml");
    }

    #[test]
    fn test_resolve_current_dir_segments() {
        assert_eq!(
            resolve("OPS/package.opf", "./xhtml/./c1.xhtml"),
            "OPS/xhtml/c1.xhtml"
        );
    }

    #[test]
    fn test_resolve_parent_past_root_is_noop() {
        assert_eq!(resolve("content.opf", "../../a.html"), "a.html");
    }

    #[test]
    fn test_resolve_keeps_encoding_and_case() {
        assert_eq!(
            resolve("OEBPS/content.opf", "Text/Chapter%201.xhtml"),
            "OEBPS/Text/Chapter%201.xhtml"
        );
    }
}
