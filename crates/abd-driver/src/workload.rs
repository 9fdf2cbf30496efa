//! Workload command stream parsing (spec.md §6 "Workload surface"):
//! `PUT <key> <value…>` or `GET <key>`, verb case-insensitive, `#`
//! comments and blank lines skipped. Value may contain spaces —
//! everything after the first whitespace following the key, trimmed.

use anyhow::{bail, Context, Result};

/// One parsed workload command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Put { key: String, value: String },
    Get { key: String },
}

/// Parses a full workload file's contents into an ordered command list.
pub fn parse_workload(contents: &str) -> Result<Vec<Command>> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Result<Command> {
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(verb, rest)| (verb, rest));
    let rest = rest.trim_start();

    match verb.to_ascii_uppercase().as_str() {
        "PUT" => {
            let (key, value) = rest
                .split_once(char::is_whitespace)
                .map_or((rest, ""), |(key, value)| (key, value));
            let key = key.trim();
            if key.is_empty() {
                bail!("PUT command missing key: {line:?}");
            }
            Ok(Command::Put {
                key: key.to_string(),
                value: value.trim().to_string(),
            })
        }
        "GET" => {
            // Matches the original's `iss >> key`: a single whitespace-
            // delimited token, not the rest of the line.
            let key = rest.split_whitespace().next().unwrap_or("");
            if key.is_empty() {
                bail!("GET command missing key: {line:?}");
            }
            Ok(Command::Get {
                key: key.to_string(),
            })
        }
        other => bail!("unrecognized workload command {other:?} in line: {line:?}"),
    }
}

/// Reads and parses a workload file from disk.
pub fn load_workload(path: &std::path::Path) -> Result<Vec<Command>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read workload file {}", path.display()))?;
    parse_workload(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_put_with_single_word_value() {
        let cmds = parse_workload("PUT k v\n").unwrap();
        assert_eq!(
            cmds,
            vec![Command::Put {
                key: "k".to_string(),
                value: "v".to_string()
            }]
        );
    }

    #[test]
    fn parses_put_with_multi_word_value() {
        let cmds = parse_workload("PUT k hello world\n").unwrap();
        assert_eq!(
            cmds,
            vec![Command::Put {
                key: "k".to_string(),
                value: "hello world".to_string()
            }]
        );
    }

    #[test]
    fn verb_is_case_insensitive() {
        let cmds = parse_workload("put k v\nGet k\n").unwrap();
        assert_eq!(
            cmds,
            vec![
                Command::Put {
                    key: "k".to_string(),
                    value: "v".to_string()
                },
                Command::Get {
                    key: "k".to_string()
                },
            ]
        );
    }

    #[test]
    fn skips_blank_lines_and_comments() {
        let cmds = parse_workload("# a comment\n\nPUT k v\n   \nGET k\n").unwrap();
        assert_eq!(cmds.len(), 2);
    }

    #[test]
    fn get_key_is_a_single_whitespace_delimited_token() {
        // Matches the original's `iss >> key` parsing for GET: trailing
        // tokens on the line are ignored, unlike PUT's value.
        let cmds = parse_workload("GET k trailing ignored\n").unwrap();
        assert_eq!(
            cmds,
            vec![Command::Get {
                key: "k".to_string()
            }]
        );
    }

    #[test]
    fn rejects_unknown_verb() {
        let err = parse_workload("DELETE k\n").unwrap_err();
        assert!(err.to_string().contains("unrecognized workload command"));
    }

    #[test]
    fn rejects_put_missing_key() {
        let err = parse_workload("PUT\n").unwrap_err();
        assert!(err.to_string().contains("missing key"));
    }
}
