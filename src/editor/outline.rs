//! Document outline
//!
//! Builds a heading tree from the `#` markers at the start of lines. A
//! heading nests under the nearest preceding heading one level up; when
//! there is none it becomes a root of its own.

// ─────────────────────────────────────────────────────────────────────────────
// OutlineNode
// ─────────────────────────────────────────────────────────────────────────────

/// A heading in the document outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineNode {
    /// Heading text after the marker and its separating space
    pub title: String,
    /// Line number in the source document (1-indexed)
    pub line: usize,
    /// Number of `#` characters in the marker
    pub level: usize,
    /// Headings nested under this one, in document order
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    fn new(level: usize, title: String, line: usize) -> Self {
        Self {
            title,
            line,
            level,
            children: Vec::new(),
        }
    }

    /// Text shown in the outline panel.
    pub fn label(&self) -> &str {
        if self.title.trim().is_empty() {
            "(untitled)"
        } else {
            &self.title
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DocumentOutline
// ─────────────────────────────────────────────────────────────────────────────

/// The heading forest of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentOutline {
    /// Top-level headings in document order
    pub roots: Vec<OutlineNode>,
}

impl DocumentOutline {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// All headings, depth first in document order.
    pub fn iter(&self) -> impl Iterator<Item = &OutlineNode> {
        let mut stack: Vec<&OutlineNode> = self.roots.iter().rev().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    pub fn heading_count(&self) -> usize {
        self.iter().count()
    }

    /// Line of the heading whose section contains `line`.
    ///
    /// Returns None if the line is before any heading.
    pub fn find_current_section(&self, line: usize) -> Option<usize> {
        self.iter()
            .map(|node| node.line)
            .take_while(|&heading_line| heading_line <= line)
            .last()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Outline Extraction
// ─────────────────────────────────────────────────────────────────────────────

/// Headings deeper than this are left out of the outline.
const MAX_OUTLINE_LEVEL: usize = 3;

/// Extract the heading tree from document text.
pub fn extract_outline(text: &str) -> DocumentOutline {
    // Headings in document order, each with the index of its parent.
    let mut flat: Vec<(Option<usize>, OutlineNode)> = Vec::new();
    // Most recent heading at each level; deeper entries are cleared when a
    // shallower heading appears.
    let mut last_at_level: Vec<Option<usize>> = Vec::new();

    for (line_idx, line) in text.split('\n').enumerate() {
        let Some((level, title)) = parse_heading(line) else {
            continue;
        };
        if level > MAX_OUTLINE_LEVEL {
            continue;
        }

        let parent = last_at_level.get(level - 1).copied().flatten();
        let index = flat.len();
        flat.push((parent, OutlineNode::new(level, title.to_string(), line_idx + 1)));

        if last_at_level.len() <= level {
            last_at_level.resize(level + 1, None);
        }
        last_at_level[level] = Some(index);
        for slot in &mut last_at_level[level + 1..] {
            *slot = None;
        }
    }

    // Children always come after their parent, so assembling from the back
    // finishes every subtree before its parent is moved.
    let mut roots = Vec::new();
    while let Some((parent, mut node)) = flat.pop() {
        node.children.reverse();
        match parent {
            Some(p) => flat[p].1.children.push(node),
            None => roots.push(node),
        }
    }
    roots.reverse();

    DocumentOutline { roots }
}

/// Parse a heading line into `(level, title)`.
///
/// The line must start with `#` and the marker must be followed by a space
/// or end the line.
fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let level = line.chars().take_while(|&c| c == '#').count();
    if level == 0 {
        return None;
    }

    // '#' is one byte, so `level` is also the byte length of the marker.
    let rest = &line[level..];
    if rest.is_empty() {
        return Some((level, ""));
    }
    rest.strip_prefix(' ').map(|title| (level, title))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(nodes: &[OutlineNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.title.as_str()).collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Basic Heading Extraction Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_empty_document() {
        let outline = extract_outline("");
        assert!(outline.is_empty());
        assert_eq!(outline.heading_count(), 0);
    }

    #[test]
    fn test_single_heading_in_text() {
        let outline = extract_outline("plain text\n# Title\nmore text");
        assert_eq!(outline.roots.len(), 1);
        assert_eq!(outline.roots[0].title, "Title");
        assert_eq!(outline.roots[0].line, 2);
        assert_eq!(outline.roots[0].level, 1);
        assert!(outline.roots[0].children.is_empty());
    }

    #[test]
    fn test_three_level_tree() {
        let outline = extract_outline("# A\n## B\n### C\n# D");

        assert_eq!(titles(&outline.roots), vec!["A", "D"]);
        let a = &outline.roots[0];
        assert_eq!((a.line, a.level), (1, 1));
        let b = &a.children[0];
        assert_eq!((b.title.as_str(), b.line, b.level), ("B", 2, 2));
        let c = &b.children[0];
        assert_eq!((c.title.as_str(), c.line, c.level), ("C", 3, 3));
        let d = &outline.roots[1];
        assert_eq!((d.line, d.level), (4, 1));
        assert!(d.children.is_empty());
    }

    #[test]
    fn test_siblings_keep_document_order() {
        let text = "# Title\n\n## Section 1\n\nSome text\n\n## Section 2\n\n### Subsection";
        let outline = extract_outline(text);

        assert_eq!(outline.roots.len(), 1);
        let sections = &outline.roots[0].children;
        assert_eq!(titles(sections), vec!["Section 1", "Section 2"]);
        assert_eq!(titles(&sections[1].children), vec!["Subsection"]);
        assert_eq!(outline.heading_count(), 4);
    }

    #[test]
    fn test_new_level_one_resets_parents() {
        let outline = extract_outline("# A\n## B\n# C\n### D");
        // D has no level-2 heading since C, so it is an orphan root.
        assert_eq!(titles(&outline.roots), vec!["A", "C", "D"]);
        assert!(outline.roots[1].children.is_empty());
    }

    #[test]
    fn test_orphan_headings_become_roots() {
        let outline = extract_outline("## Intro\n### Detail\n# Main");
        assert_eq!(titles(&outline.roots), vec!["Intro", "Main"]);
        assert_eq!(titles(&outline.roots[0].children), vec!["Detail"]);
    }

    #[test]
    fn test_levels_beyond_three_are_skipped() {
        let outline = extract_outline("# A\n## B\n### C\n#### D\n##### E\n### F");
        assert_eq!(outline.heading_count(), 4);
        let b = &outline.roots[0].children[0];
        assert_eq!(titles(&b.children), vec!["C", "F"]);
        assert!(b.children[0].children.is_empty());
    }

    #[test]
    fn test_deep_heading_without_parents_is_skipped() {
        let outline = extract_outline("#\n# A\n#### Deep");
        assert_eq!(titles(&outline.roots), vec!["", "A"]);
        assert!(outline.roots.iter().all(|root| root.children.is_empty()));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Marker Edge Cases
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_not_a_heading_no_space() {
        assert!(extract_outline("#NotAHeading").is_empty());
        assert!(extract_outline("##\tTabbed").is_empty());
    }

    #[test]
    fn test_indented_marker_is_not_a_heading() {
        assert!(extract_outline("  # Indented").is_empty());
    }

    #[test]
    fn test_empty_titles_allowed() {
        let outline = extract_outline("# \n##");
        assert_eq!(outline.roots[0].title, "");
        assert_eq!(outline.roots[0].children[0].title, "");
        assert_eq!(outline.roots[0].label(), "(untitled)");
    }

    #[test]
    fn test_title_is_rest_after_single_space() {
        let outline = extract_outline("#  Two spaces ##");
        assert_eq!(outline.roots[0].title, " Two spaces ##");
    }

    #[test]
    fn test_crlf_line_endings() {
        let outline = extract_outline("# One\r\n## Two\r\n");
        assert_eq!(outline.roots[0].title, "One");
        assert_eq!(outline.roots[0].children[0].title, "Two");
        assert_eq!(outline.roots[0].children[0].line, 2);
    }

    #[test]
    fn test_unicode_titles() {
        let outline = extract_outline("# Grüße\n## 你好");
        assert_eq!(outline.roots[0].title, "Grüße");
        assert_eq!(outline.roots[0].children[0].title, "你好");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Outline Helper Method Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_iter_is_depth_first() {
        let outline = extract_outline("# A\n## B\n### C\n## E\n# F");
        let order: Vec<&str> = outline.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C", "E", "F"]);
    }

    #[test]
    fn test_find_current_section() {
        let text = "intro\n# Title\n\nText\n\n## Section\n\nMore text";
        let outline = extract_outline(text);

        assert_eq!(outline.find_current_section(1), None);
        assert_eq!(outline.find_current_section(2), Some(2));
        assert_eq!(outline.find_current_section(4), Some(2));
        assert_eq!(outline.find_current_section(6), Some(6));
        assert_eq!(outline.find_current_section(8), Some(6));
    }

    #[test]
    fn test_rebuild_is_stateless() {
        let text = "# A\n## B";
        assert_eq!(extract_outline(text), extract_outline(text));
    }
}
