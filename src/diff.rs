//! Character-level diff rendering with readability cleanups.
//!
//! The raw diff comes from `similar`. It is then normalized, run through an
//! efficiency cleanup (small equalities sandwiched between edits are folded
//! into the edits), and finally a semantic cleanup that coalesces fragments and
//! slides edits onto word and line boundaries.
use colored::Colorize;
use similar::{Algorithm, ChangeTag, TextDiff};
use std::time::Duration;

const DIFF_TIMEOUT: Duration = Duration::from_secs(1);

/// Cost of an empty edit in characters, used by the efficiency cleanup.
const EDIT_COST: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Equal,
    Delete,
    Insert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub op: Op,
    pub text: String,
}

impl Fragment {
    fn new(op: Op, text: impl Into<String>) -> Self {
        Self {
            op,
            text: text.into(),
        }
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffStyle {
    /// Green insertions and red deletions.
    Ansi,
    /// `{+inserted+}` and `[-deleted-]` markers.
    #[default]
    Plain,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DiffRenderer {
    style: DiffStyle,
}

impl DiffRenderer {
    pub fn new(style: DiffStyle) -> Self {
        Self { style }
    }

    /// Computes the cleaned fragment list for `original` -> `replaced`.
    pub fn diff(&self, original: &str, replaced: &str) -> Vec<Fragment> {
        let mut fragments = raw_diff(original, replaced);
        cleanup_merge(&mut fragments);
        cleanup_efficiency(&mut fragments);
        cleanup_semantic(&mut fragments);
        fragments
    }

    /// Renders the diff as text; identical inputs render as an empty string.
    pub fn render(&self, original: &str, replaced: &str) -> String {
        let fragments = self.diff(original, replaced);
        if fragments.iter().all(|f| f.op == Op::Equal) {
            return String::new();
        }

        let mut out = String::with_capacity(original.len().max(replaced.len()));
        for fragment in &fragments {
            match (fragment.op, self.style) {
                (Op::Equal, _) => out.push_str(&fragment.text),
                (Op::Insert, DiffStyle::Ansi) => {
                    out.push_str(&fragment.text.as_str().green().to_string())
                }
                (Op::Delete, DiffStyle::Ansi) => {
                    out.push_str(&fragment.text.as_str().red().to_string())
                }
                (Op::Insert, DiffStyle::Plain) => {
                    out.push_str("{+");
                    out.push_str(&fragment.text);
                    out.push_str("+}");
                }
                (Op::Delete, DiffStyle::Plain) => {
                    out.push_str("[-");
                    out.push_str(&fragment.text);
                    out.push_str("-]");
                }
            }
        }
        out
    }
}

fn raw_diff(original: &str, replaced: &str) -> Vec<Fragment> {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .timeout(DIFF_TIMEOUT)
        .diff_chars(original, replaced);

    let mut fragments: Vec<Fragment> = Vec::new();
    for change in diff.iter_all_changes() {
        let op = match change.tag() {
            ChangeTag::Equal => Op::Equal,
            ChangeTag::Delete => Op::Delete,
            ChangeTag::Insert => Op::Insert,
        };
        match fragments.last_mut() {
            Some(last) if last.op == op => last.text.push_str(change.value()),
            _ => fragments.push(Fragment::new(op, change.value())),
        }
    }
    fragments
}

fn common_prefix(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map_or_else(|| a.len().min(b.len()), |((i, _), _)| i)
}

fn common_suffix(a: &str, b: &str) -> usize {
    let mut len = 0;
    for (ca, cb) in a.chars().rev().zip(b.chars().rev()) {
        if ca != cb {
            break;
        }
        len += ca.len_utf8();
    }
    len
}

/// Appends text to a trailing equality or starts a new one.
fn push_equal(fragments: &mut Vec<Fragment>, text: &str) {
    if text.is_empty() {
        return;
    }
    match fragments.last_mut() {
        Some(last) if last.op == Op::Equal => last.text.push_str(text),
        _ => fragments.push(Fragment::new(Op::Equal, text)),
    }
}

/// Emits a pending edit run as one deletion followed by one insertion, moving
/// any shared prefix into the preceding equality and any shared suffix into
/// `following`.
fn flush_edits(
    merged: &mut Vec<Fragment>,
    delete: &mut String,
    insert: &mut String,
    following: &mut String,
) {
    if !delete.is_empty() && !insert.is_empty() {
        let prefix = common_prefix(insert, delete);
        if prefix > 0 {
            push_equal(merged, &insert[..prefix]);
            insert.replace_range(..prefix, "");
            delete.replace_range(..prefix, "");
        }
        let suffix = common_suffix(insert, delete);
        if suffix > 0 {
            following.insert_str(0, &insert[insert.len() - suffix..]);
            insert.truncate(insert.len() - suffix);
            delete.truncate(delete.len() - suffix);
        }
    }
    if !delete.is_empty() {
        merged.push(Fragment::new(Op::Delete, std::mem::take(delete)));
    }
    if !insert.is_empty() {
        merged.push(Fragment::new(Op::Insert, std::mem::take(insert)));
    }
    delete.clear();
    insert.clear();
}

/// Normalizes a fragment list: adjacent equalities are merged, every edit run
/// becomes a single deletion then insertion, and single edits are slid over
/// their neighbours when that removes an equality.
pub(crate) fn cleanup_merge(fragments: &mut Vec<Fragment>) {
    loop {
        let mut merged = Vec::with_capacity(fragments.len());
        let mut delete = String::new();
        let mut insert = String::new();

        for fragment in fragments.drain(..) {
            match fragment.op {
                Op::Delete => delete.push_str(&fragment.text),
                Op::Insert => insert.push_str(&fragment.text),
                Op::Equal => {
                    let mut text = fragment.text;
                    flush_edits(&mut merged, &mut delete, &mut insert, &mut text);
                    push_equal(&mut merged, &text);
                }
            }
        }
        let mut tail = String::new();
        flush_edits(&mut merged, &mut delete, &mut insert, &mut tail);
        push_equal(&mut merged, &tail);

        *fragments = merged;
        if !shift_single_edits(fragments) {
            break;
        }
    }
}

/// `A<ins>BA</ins>C` -> `<ins>AB</ins>AC` and `A<ins>BC</ins>B` -> `AB<ins>CB</ins>`.
fn shift_single_edits(fragments: &mut Vec<Fragment>) -> bool {
    let mut changed = false;
    let mut i = 1;
    while i + 1 < fragments.len() {
        if fragments[i - 1].op == Op::Equal && fragments[i + 1].op == Op::Equal {
            let prev = fragments[i - 1].text.clone();
            let next = fragments[i + 1].text.clone();
            let edit = &fragments[i].text;

            if edit.ends_with(prev.as_str()) {
                let shifted = format!("{prev}{}", &edit[..edit.len() - prev.len()]);
                fragments[i].text = shifted;
                fragments[i + 1].text = format!("{prev}{next}");
                fragments.remove(i - 1);
                changed = true;
            } else if edit.starts_with(next.as_str()) {
                let shifted = format!("{}{next}", &edit[next.len()..]);
                fragments[i - 1].text.push_str(&next);
                fragments[i].text = shifted;
                fragments.remove(i + 1);
                changed = true;
            }
        }
        i += 1;
    }
    changed
}

/// Folds short equalities that sit between edits into those edits when
/// keeping them separate would cost more than it helps.
pub(crate) fn cleanup_efficiency(fragments: &mut Vec<Fragment>) {
    let mut changed = false;
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<String> = None;
    // Edits seen before / after the candidate equality.
    let (mut pre_ins, mut pre_del) = (false, false);
    let (mut post_ins, mut post_del) = (false, false);

    let mut i = 0;
    while i < fragments.len() {
        if fragments[i].op == Op::Equal {
            if fragments[i].char_len() < EDIT_COST && (post_ins || post_del) {
                equalities.push(i);
                pre_ins = post_ins;
                pre_del = post_del;
                last_equality = Some(fragments[i].text.clone());
            } else {
                equalities.clear();
                last_equality = None;
            }
            post_ins = false;
            post_del = false;
        } else {
            if fragments[i].op == Op::Delete {
                post_del = true;
            } else {
                post_ins = true;
            }

            let sides = [pre_ins, pre_del, post_ins, post_del]
                .iter()
                .filter(|&&b| b)
                .count();
            let fold = last_equality.as_ref().is_some_and(|eq| {
                sides == 4 || (eq.chars().count() < EDIT_COST / 2 && sides == 3)
            });

            if fold {
                if let (Some(idx), Some(eq)) = (equalities.pop(), last_equality.take()) {
                    fragments.insert(idx, Fragment::new(Op::Delete, eq));
                    fragments[idx + 1].op = Op::Insert;
                    changed = true;

                    if pre_ins && pre_del {
                        post_ins = true;
                        post_del = true;
                        equalities.clear();
                    } else {
                        equalities.pop();
                        post_ins = false;
                        post_del = false;
                        i = equalities.last().map_or(0, |&e| e + 1);
                        continue;
                    }
                }
            }
        }
        i += 1;
    }

    if changed {
        cleanup_merge(fragments);
    }
}

/// Removes equalities no longer than the edits on both sides of them, then
/// aligns the remaining edits to natural boundaries and extracts overlaps
/// between adjacent deletions and insertions.
pub(crate) fn cleanup_semantic(fragments: &mut Vec<Fragment>) {
    let mut changed = false;
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<String> = None;
    let (mut ins_before, mut del_before) = (0usize, 0usize);
    let (mut ins_after, mut del_after) = (0usize, 0usize);

    let mut i = 0;
    while i < fragments.len() {
        if fragments[i].op == Op::Equal {
            equalities.push(i);
            ins_before = ins_after;
            del_before = del_after;
            ins_after = 0;
            del_after = 0;
            last_equality = Some(fragments[i].text.clone());
        } else {
            if fragments[i].op == Op::Insert {
                ins_after += fragments[i].char_len();
            } else {
                del_after += fragments[i].char_len();
            }

            let dominated = last_equality.as_ref().is_some_and(|eq| {
                let len = eq.chars().count();
                len <= ins_before.max(del_before) && len <= ins_after.max(del_after)
            });

            if dominated {
                if let (Some(idx), Some(eq)) = (equalities.pop(), last_equality.take()) {
                    fragments.insert(idx, Fragment::new(Op::Delete, eq));
                    fragments[idx + 1].op = Op::Insert;
                    // The previous equality needs re-evaluation as well.
                    equalities.pop();
                    ins_before = 0;
                    del_before = 0;
                    ins_after = 0;
                    del_after = 0;
                    changed = true;
                    i = equalities.last().map_or(0, |&e| e + 1);
                    continue;
                }
            }
        }
        i += 1;
    }

    if changed {
        cleanup_merge(fragments);
    }
    cleanup_semantic_lossless(fragments);
    extract_overlaps(fragments);
}

/// Scores how natural it is to split between `one` and `two`, 6 being best.
fn boundary_score(one: &[char], two: &[char]) -> u8 {
    let (Some(&c1), Some(&c2)) = (one.last(), two.first()) else {
        return 6;
    };

    let non_alnum1 = !c1.is_alphanumeric();
    let non_alnum2 = !c2.is_alphanumeric();
    let space1 = non_alnum1 && c1.is_whitespace();
    let space2 = non_alnum2 && c2.is_whitespace();
    let break1 = space1 && (c1 == '\n' || c1 == '\r');
    let break2 = space2 && (c2 == '\n' || c2 == '\r');
    let blank1 = break1 && (one.ends_with(&['\n', '\n']) || one.ends_with(&['\n', '\r', '\n']));
    let blank2 = break2
        && (two.starts_with(&['\n', '\n'])
            || two.starts_with(&['\r', '\n', '\n'])
            || two.starts_with(&['\n', '\r', '\n'])
            || two.starts_with(&['\r', '\n', '\r', '\n']));

    if blank1 || blank2 {
        5
    } else if break1 || break2 {
        4
    } else if non_alnum1 && !space1 && space2 {
        3
    } else if space1 || space2 {
        2
    } else if non_alnum1 || non_alnum2 {
        1
    } else {
        0
    }
}

/// Slides single edits surrounded by equalities left or right to the position
/// with the best boundary score.
fn cleanup_semantic_lossless(fragments: &mut Vec<Fragment>) {
    let mut i = 1;
    while i + 1 < fragments.len() {
        if fragments[i - 1].op == Op::Equal && fragments[i + 1].op == Op::Equal {
            let mut eq1: Vec<char> = fragments[i - 1].text.chars().collect();
            let mut edit: Vec<char> = fragments[i].text.chars().collect();
            let mut eq2: Vec<char> = fragments[i + 1].text.chars().collect();

            // Shift the edit as far left as possible first.
            let common = eq1
                .iter()
                .rev()
                .zip(edit.iter().rev())
                .take_while(|(a, b)| a == b)
                .count();
            if common > 0 {
                let shared = edit.split_off(edit.len() - common);
                eq1.truncate(eq1.len() - common);
                edit = shared.iter().copied().chain(edit).collect();
                eq2 = shared.into_iter().chain(eq2).collect();
            }

            let mut best = (eq1.clone(), edit.clone(), eq2.clone());
            let mut best_score = boundary_score(&eq1, &edit) + boundary_score(&edit, &eq2);
            while !edit.is_empty() && !eq2.is_empty() && edit[0] == eq2[0] {
                let c = edit.remove(0);
                eq1.push(c);
                edit.push(eq2.remove(0));
                let score = boundary_score(&eq1, &edit) + boundary_score(&edit, &eq2);
                // `>=` favours trailing whitespace on the left equality.
                if score >= best_score {
                    best_score = score;
                    best = (eq1.clone(), edit.clone(), eq2.clone());
                }
            }

            let best_eq1: String = best.0.into_iter().collect();
            if fragments[i - 1].text != best_eq1 {
                fragments[i].text = best.1.into_iter().collect();
                let best_eq2: String = best.2.into_iter().collect();
                if best_eq2.is_empty() {
                    fragments.remove(i + 1);
                } else {
                    fragments[i + 1].text = best_eq2;
                }
                if best_eq1.is_empty() {
                    fragments.remove(i - 1);
                    i -= 1;
                } else {
                    fragments[i - 1].text = best_eq1;
                }
            }
        }
        i += 1;
    }
}

/// Length in chars of the longest suffix of `a` that is also a prefix of `b`.
fn common_overlap(a: &[char], b: &[char]) -> usize {
    let len = a.len().min(b.len());
    if len == 0 {
        return 0;
    }
    let a = &a[a.len() - len..];
    let b = &b[..len];
    if a == b {
        return len;
    }

    let mut best = 0;
    let mut width = 1;
    loop {
        let pattern = &a[len - width..];
        let Some(found) = b.windows(pattern.len()).position(|w| w == pattern) else {
            return best;
        };
        width += found;
        if found == 0 || a[len - width..] == b[..width] {
            best = width;
            width += 1;
        }
        if width > len {
            return best;
        }
    }
}

/// Splits `<del>abcxxx</del><ins>xxxdef</ins>` into
/// `<del>abc</del>xxx<ins>def</ins>` when the overlap is at least half of
/// either edit.
fn extract_overlaps(fragments: &mut Vec<Fragment>) {
    let mut i = 1;
    while i < fragments.len() {
        if fragments[i - 1].op == Op::Delete && fragments[i].op == Op::Insert {
            let deletion: Vec<char> = fragments[i - 1].text.chars().collect();
            let insertion: Vec<char> = fragments[i].text.chars().collect();
            let forward = common_overlap(&deletion, &insertion);
            let backward = common_overlap(&insertion, &deletion);

            let significant =
                |overlap: usize| 2 * overlap >= deletion.len() || 2 * overlap >= insertion.len();

            if forward >= backward {
                if forward > 0 && significant(forward) {
                    let shared: String = insertion[..forward].iter().collect();
                    fragments[i - 1].text = deletion[..deletion.len() - forward].iter().collect();
                    fragments[i].text = insertion[forward..].iter().collect();
                    fragments.insert(i, Fragment::new(Op::Equal, shared));
                    i += 1;
                }
            } else if backward > 0 && significant(backward) {
                let shared: String = deletion[..backward].iter().collect();
                fragments[i - 1] = Fragment::new(
                    Op::Insert,
                    insertion[..insertion.len() - backward].iter().collect::<String>(),
                );
                fragments[i] = Fragment::new(
                    Op::Delete,
                    deletion[backward..].iter().collect::<String>(),
                );
                fragments.insert(i, Fragment::new(Op::Equal, shared));
                i += 1;
            }
            i += 1;
        }
        i += 1;
    }
    fragments.retain(|f| !f.text.is_empty());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(op: Op, text: &str) -> Fragment {
        Fragment::new(op, text)
    }

    fn text_of(fragments: &[Fragment], keep: Op) -> String {
        fragments
            .iter()
            .filter(|f| f.op == Op::Equal || f.op == keep)
            .map(|f| f.text.as_str())
            .collect()
    }

    #[test]
    fn test_identical_text_renders_empty() {
        let renderer = DiffRenderer::default();
        assert_eq!(renderer.render("same text\n", "same text\n"), "");
        assert_eq!(renderer.render("", ""), "");
    }

    #[test]
    fn test_disjoint_text_is_one_delete_insert_pair() {
        let renderer = DiffRenderer::default();
        let fragments = renderer.diff("abc", "xyz");
        assert_eq!(fragments, vec![frag(Op::Delete, "abc"), frag(Op::Insert, "xyz")]);
        assert_eq!(renderer.render("abc", "xyz"), "[-abc-]{+xyz+}");
    }

    #[test]
    fn test_word_replacement_renders_markers() {
        let renderer = DiffRenderer::new(DiffStyle::Plain);
        assert_eq!(renderer.render("foo bar", "FOO bar"), "[-foo-]{+FOO+} bar");
    }

    #[test]
    fn test_diff_reconstructs_both_sides() {
        let renderer = DiffRenderer::default();
        let original = "fn old_name() {}\nlet x = old_name();\n";
        let replaced = "fn new_name() {}\nlet x = new_name();\n";
        let fragments = renderer.diff(original, replaced);

        assert_eq!(text_of(&fragments, Op::Delete), original);
        assert_eq!(text_of(&fragments, Op::Insert), replaced);
    }

    #[test]
    fn test_ansi_style_wraps_edits() {
        colored::control::set_override(true);
        let rendered = DiffRenderer::new(DiffStyle::Ansi).render("a", "b");
        colored::control::unset_override();
        assert!(rendered.contains("\u{1b}[31ma"));
        assert!(rendered.contains("\u{1b}[32mb"));
    }

    #[test]
    fn test_merge_combines_runs_and_factors_affixes() {
        let mut fragments = vec![
            frag(Op::Equal, "a"),
            frag(Op::Delete, "bc"),
            frag(Op::Insert, "bd"),
            frag(Op::Equal, "e"),
        ];
        cleanup_merge(&mut fragments);
        assert_eq!(
            fragments,
            vec![
                frag(Op::Equal, "ab"),
                frag(Op::Delete, "c"),
                frag(Op::Insert, "d"),
                frag(Op::Equal, "e"),
            ]
        );
    }

    #[test]
    fn test_merge_slides_edit_left() {
        let mut fragments = vec![
            frag(Op::Equal, "a"),
            frag(Op::Insert, "ba"),
            frag(Op::Equal, "c"),
        ];
        cleanup_merge(&mut fragments);
        assert_eq!(fragments, vec![frag(Op::Insert, "ab"), frag(Op::Equal, "ac")]);
    }

    #[test]
    fn test_efficiency_folds_short_equality_between_edits() {
        let mut fragments = vec![
            frag(Op::Delete, "ab"),
            frag(Op::Insert, "12"),
            frag(Op::Equal, "xyz"),
            frag(Op::Delete, "cd"),
            frag(Op::Insert, "34"),
        ];
        cleanup_efficiency(&mut fragments);
        assert_eq!(
            fragments,
            vec![frag(Op::Delete, "abxyzcd"), frag(Op::Insert, "12xyz34")]
        );
    }

    #[test]
    fn test_efficiency_keeps_long_equality() {
        let original = vec![
            frag(Op::Delete, "ab"),
            frag(Op::Insert, "12"),
            frag(Op::Equal, "wxyz"),
            frag(Op::Delete, "cd"),
            frag(Op::Insert, "34"),
        ];
        let mut fragments = original.clone();
        cleanup_efficiency(&mut fragments);
        assert_eq!(fragments, original);
    }

    #[test]
    fn test_semantic_eliminates_dominated_equality() {
        let mut fragments = vec![
            frag(Op::Delete, "a"),
            frag(Op::Equal, "b"),
            frag(Op::Delete, "c"),
        ];
        cleanup_semantic(&mut fragments);
        assert_eq!(fragments, vec![frag(Op::Delete, "abc"), frag(Op::Insert, "b")]);
    }

    #[test]
    fn test_semantic_aligns_to_word_boundary() {
        let mut fragments = vec![
            frag(Op::Equal, "The c"),
            frag(Op::Insert, "ow and the c"),
            frag(Op::Equal, "at."),
        ];
        cleanup_semantic(&mut fragments);
        assert_eq!(
            fragments,
            vec![
                frag(Op::Equal, "The "),
                frag(Op::Insert, "cow and the "),
                frag(Op::Equal, "cat."),
            ]
        );
    }

    #[test]
    fn test_semantic_extracts_overlap() {
        let mut fragments = vec![frag(Op::Delete, "abcxxx"), frag(Op::Insert, "xxxdef")];
        cleanup_semantic(&mut fragments);
        assert_eq!(
            fragments,
            vec![
                frag(Op::Delete, "abc"),
                frag(Op::Equal, "xxx"),
                frag(Op::Insert, "def"),
            ]
        );
    }

    #[test]
    fn test_common_overlap() {
        let chars = |s: &str| s.chars().collect::<Vec<_>>();
        assert_eq!(common_overlap(&chars(""), &chars("abcd")), 0);
        assert_eq!(common_overlap(&chars("abc"), &chars("abcd")), 3);
        assert_eq!(common_overlap(&chars("123456"), &chars("abcd")), 0);
        assert_eq!(common_overlap(&chars("123456xxx"), &chars("xxxabcd")), 3);
    }

    #[test]
    fn test_unicode_is_split_on_char_boundaries() {
        let renderer = DiffRenderer::default();
        let rendered = renderer.render("naïve café", "naïve cafe");
        assert!(rendered.contains("naïve caf"));
        assert!(rendered.contains("[-é-]{+e+}"));
    }
}
