use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffOp {
    Equal,
    Delete,
    Insert,
}

/// One run of a bytecode diff. `Delete` text exists only in the expected
/// bytecode, `Insert` only in the compiled one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diff {
    pub op: DiffOp,
    pub text: String,
}

/// Three-run diff over two strings: shared prefix, differing middles,
/// shared suffix. Hex bytecode diverges in contiguous regions (metadata
/// hash, immutables), so this stays readable without a full LCS.
pub(crate) fn diff_strings(expected: &str, actual: &str) -> Vec<Diff> {
    let prefix = common_prefix(expected, actual);
    let suffix = common_suffix(&expected[prefix..], &actual[prefix..]);

    let expected_mid = &expected[prefix..expected.len() - suffix];
    let actual_mid = &actual[prefix..actual.len() - suffix];

    let mut diffs = Vec::new();
    if prefix > 0 {
        diffs.push(Diff {
            op: DiffOp::Equal,
            text: expected[..prefix].to_string(),
        });
    }
    if !expected_mid.is_empty() {
        diffs.push(Diff {
            op: DiffOp::Delete,
            text: expected_mid.to_string(),
        });
    }
    if !actual_mid.is_empty() {
        diffs.push(Diff {
            op: DiffOp::Insert,
            text: actual_mid.to_string(),
        });
    }
    if suffix > 0 {
        diffs.push(Diff {
            op: DiffOp::Equal,
            text: expected[expected.len() - suffix..].to_string(),
        });
    }
    diffs
}

pub fn pretty(diffs: &[Diff]) -> String {
    let mut out = String::new();
    for diff in diffs {
        match diff.op {
            DiffOp::Equal => out.push_str(&diff.text),
            DiffOp::Delete => {
                out.push_str("[-");
                out.push_str(&diff.text);
                out.push(']');
            }
            DiffOp::Insert => {
                out.push_str("[+");
                out.push_str(&diff.text);
                out.push(']');
            }
        }
    }
    out
}

fn common_prefix(a: &str, b: &str) -> usize {
    a.bytes().zip(b.bytes()).take_while(|(x, y)| x == y).count()
}

fn common_suffix(a: &str, b: &str) -> usize {
    a.bytes()
        .rev()
        .zip(b.bytes().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_yield_single_equal_run() {
        let diffs = diff_strings("6001", "6001");
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].op, DiffOp::Equal);
    }

    #[test]
    fn middle_change_is_isolated() {
        let diffs = diff_strings("aabbcc", "aaddcc");
        assert_eq!(
            diffs,
            vec![
                Diff {
                    op: DiffOp::Equal,
                    text: "aa".to_string()
                },
                Diff {
                    op: DiffOp::Delete,
                    text: "bb".to_string()
                },
                Diff {
                    op: DiffOp::Insert,
                    text: "dd".to_string()
                },
                Diff {
                    op: DiffOp::Equal,
                    text: "cc".to_string()
                },
            ]
        );
        assert_eq!(pretty(&diffs), "aa[-bb][+dd]cc");
    }

    #[test]
    fn pure_append_has_no_delete() {
        let diffs = diff_strings("aa", "aabb");
        assert!(diffs.iter().all(|d| d.op != DiffOp::Delete));
        assert_eq!(pretty(&diffs), "aa[+bb]");
    }
}
