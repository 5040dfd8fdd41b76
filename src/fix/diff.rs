//! Line-based unified diffs for fix records.

use std::fmt::Write;

const CONTEXT: usize = 3;
/// Above this many cells the middle section is emitted as one replacement.
const LCS_LIMIT: usize = 4_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Equal(usize, usize),
    Delete(usize),
    Insert(usize),
}

/// Unified diff of `before` -> `after` with `a/` and `b/` headers. Empty when equal.
#[must_use]
pub fn unified_diff(path: &str, before: &str, after: &str) -> String {
    if before == after {
        return String::new();
    }
    let a: Vec<&str> = before.lines().collect();
    let b: Vec<&str> = after.lines().collect();
    let ops = edit_script(&a, &b);

    let mut out = format!("--- a/{path}\n+++ b/{path}\n");
    for hunk in hunks(&ops) {
        write_hunk(&mut out, &ops[hunk.0..hunk.1], &a, &b);
    }
    out
}

fn edit_script(a: &[&str], b: &[&str]) -> Vec<Op> {
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let mut ops: Vec<Op> = (0..prefix).map(|i| Op::Equal(i, i)).collect();
    let (a_mid, b_mid) = (&a[prefix..a.len() - suffix], &b[prefix..b.len() - suffix]);
    ops.extend(
        middle(a_mid, b_mid).into_iter().map(|op| match op {
            Op::Equal(i, j) => Op::Equal(i + prefix, j + prefix),
            Op::Delete(i) => Op::Delete(i + prefix),
            Op::Insert(j) => Op::Insert(j + prefix),
        }),
    );
    let (a_tail, b_tail) = (a.len() - suffix, b.len() - suffix);
    ops.extend((0..suffix).map(|k| Op::Equal(a_tail + k, b_tail + k)));
    ops
}

fn middle(a: &[&str], b: &[&str]) -> Vec<Op> {
    if a.len().saturating_mul(b.len()) > LCS_LIMIT {
        let mut ops: Vec<Op> = (0..a.len()).map(Op::Delete).collect();
        ops.extend((0..b.len()).map(Op::Insert));
        return ops;
    }
    let (n, m) = (a.len(), b.len());
    let mut table = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if a[i] == b[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }
    let mut ops = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            ops.push(Op::Equal(i, j));
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            ops.push(Op::Delete(i));
            i += 1;
        } else {
            ops.push(Op::Insert(j));
            j += 1;
        }
    }
    ops.extend((i..n).map(Op::Delete));
    ops.extend((j..m).map(Op::Insert));
    ops
}

/// `[start, end)` op ranges, each a change run padded with context.
fn hunks(ops: &[Op]) -> Vec<(usize, usize)> {
    let mut out: Vec<(usize, usize)> = Vec::new();
    for (idx, op) in ops.iter().enumerate() {
        if matches!(op, Op::Equal(..)) {
            continue;
        }
        let start = idx.saturating_sub(CONTEXT);
        let end = (idx + CONTEXT + 1).min(ops.len());
        match out.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => out.push((start, end)),
        }
    }
    out
}

fn write_hunk(out: &mut String, ops: &[Op], a: &[&str], b: &[&str]) {
    let a_lines: Vec<usize> = ops
        .iter()
        .filter_map(|op| match op {
            Op::Equal(i, _) | Op::Delete(i) => Some(*i),
            Op::Insert(_) => None,
        })
        .collect();
    let b_lines: Vec<usize> = ops
        .iter()
        .filter_map(|op| match op {
            Op::Equal(_, j) | Op::Insert(j) => Some(*j),
            Op::Delete(_) => None,
        })
        .collect();
    let a_start = range_start(&a_lines);
    let b_start = range_start(&b_lines);
    let _ = writeln!(
        out,
        "@@ -{a_start},{} +{b_start},{} @@",
        a_lines.len(),
        b_lines.len()
    );
    for op in ops {
        let _ = match op {
            Op::Equal(i, _) => writeln!(out, " {}", a[*i]),
            Op::Delete(i) => writeln!(out, "-{}", a[*i]),
            Op::Insert(j) => writeln!(out, "+{}", b[*j]),
        };
    }
}

/// 1-based first line of a range. A side with no lines in the hunk is
/// an empty file, so it starts at 0.
fn range_start(lines: &[usize]) -> usize {
    lines.first().map_or(0, |first| first + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_is_empty() {
        assert!(unified_diff("a.ts", "x\ny\n", "x\ny\n").is_empty());
    }

    #[test]
    fn test_single_line_change_with_context() {
        let before = "1\n2\n3\n4\n5\n6\n7\n8\n9\n";
        let after = "1\n2\n3\n4\nFIVE\n6\n7\n8\n9\n";
        let diff = unified_diff("src/x.ts", before, after);
        let expected = "--- a/src/x.ts\n+++ b/src/x.ts\n@@ -2,7 +2,7 @@\n 2\n 3\n 4\n-5\n+FIVE\n 6\n 7\n 8\n";
        assert_eq!(diff, expected);
    }

    #[test]
    fn test_created_file() {
        let diff = unified_diff("p/New.tsx", "", "a\nb\n");
        assert!(diff.contains("@@ -0,0 +1,2 @@"));
        assert!(diff.ends_with("+a\n+b\n"));
    }

    #[test]
    fn test_distant_changes_split_hunks() {
        let before: String = (1..=20).map(|i| format!("{i}\n")).collect();
        let after: String = (1..=20)
            .map(|i| match i {
                2 => "two\n".to_string(),
                19 => "nineteen\n".to_string(),
                _ => format!("{i}\n"),
            })
            .collect();
        let diff = unified_diff("f", &before, &after);
        assert_eq!(diff.matches("@@ -").count(), 2);
    }
}
