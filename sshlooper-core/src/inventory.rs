//! Host list loading from CSV
//!
//! The file needs a header with `hostname`, `ip` and `port` columns; other
//! columns are ignored. Rows that cannot be dispatched (empty ip, bad port)
//! are reported as [`SkippedRow`]s instead of failing the whole load.

use std::path::Path;

use crate::error::{LoadError, LoadResult};
use crate::models::HostEntry;
use crate::tracing::span_names;

/// Columns every host list must have
pub const REQUIRED_COLUMNS: [&str; 3] = ["hostname", "ip", "port"];

/// Contents written by [`write_sample`]
pub const SAMPLE_HOSTS_CSV: &str = "\
hostname,ip,port
web01,192.0.2.10,22
web02,192.0.2.11,22
db01,192.0.2.20,2222
";

/// A row that was not turned into a host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number where the row starts
    pub line: usize,
    /// Why the row was skipped
    pub reason: String,
}

/// Result of loading a host list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostList {
    /// Dispatchable hosts in file order
    pub hosts: Vec<HostEntry>,
    /// Rows that were dropped
    pub skipped: Vec<SkippedRow>,
}

impl HostList {
    /// Number of usable hosts
    #[must_use]
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Returns true if no usable host was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

/// Reads and parses a host list file
///
/// # Errors
///
/// Returns an error if the file cannot be read, has no header or lacks a
/// required column.
pub fn load_hosts_csv(path: &Path) -> LoadResult<HostList> {
    let _span = tracing::info_span!(span_names::INVENTORY_LOAD, path = %path.display()).entered();

    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let list = parse_hosts_csv(&text, path)?;

    for row in &list.skipped {
        tracing::warn!(line = row.line, reason = %row.reason, "Host row skipped");
    }
    tracing::debug!(hosts = list.len(), skipped = list.skipped.len(), "Host list loaded");

    Ok(list)
}

/// Parses host list text; `origin` is only used in error messages
///
/// # Errors
///
/// Returns `Empty` when there is no header and `MissingColumns` when a
/// required column is absent.
pub fn parse_hosts_csv(text: &str, origin: &Path) -> LoadResult<HostList> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = split_records(text).into_iter();

    let Some((_, header)) = records.next() else {
        return Err(LoadError::Empty(origin.to_path_buf()));
    };
    let header: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
    let column = |name: &str| header.iter().position(|h| h == name);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| column(name).is_none())
        .map(|name| (*name).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }

    let (Some(hostname_col), Some(ip_col), Some(port_col)) =
        (column("hostname"), column("ip"), column("port"))
    else {
        return Err(LoadError::MissingColumns(
            REQUIRED_COLUMNS.iter().map(|c| (*c).to_string()).collect(),
        ));
    };

    let mut list = HostList::default();
    for (line, fields) in records {
        if fields.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let field = |idx: usize| fields.get(idx).map_or("", |f| f.trim());

        let ip = field(ip_col);
        if ip.is_empty() {
            list.skipped.push(SkippedRow {
                line,
                reason: "empty ip".to_string(),
            });
            continue;
        }

        let port_text = field(port_col);
        let port = match port_text.parse::<u16>() {
            Ok(port) if port != 0 => port,
            _ => {
                list.skipped.push(SkippedRow {
                    line,
                    reason: format!("invalid port '{port_text}'"),
                });
                continue;
            }
        };

        list.hosts
            .push(HostEntry::new(field(hostname_col), ip, port));
    }

    Ok(list)
}

/// Writes [`SAMPLE_HOSTS_CSV`] to `path`, creating parent directories
///
/// # Errors
///
/// Returns `AlreadyExists` rather than overwriting, or an IO error.
pub fn write_sample(path: &Path) -> LoadResult<()> {
    if path.exists() {
        return Err(LoadError::AlreadyExists(path.to_path_buf()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| LoadError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, SAMPLE_HOSTS_CSV).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Splits CSV text into records, honouring quotes and `""` escapes
///
/// Each record carries the line number it starts on. Quoted fields may span
/// lines.
fn split_records(text: &str) -> Vec<(usize, Vec<String>)> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
                records.push((record_line, std::mem::take(&mut fields)));
                line += 1;
                record_line = line;
            }
            '\n' => {
                line += 1;
                field.push(c);
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        records.push((record_line, fields));
    }

    records
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn parse(text: &str) -> LoadResult<HostList> {
        parse_hosts_csv(text, Path::new("hosts.csv"))
    }

    #[test]
    fn test_basic_rows() {
        let list = parse("hostname,ip,port\nweb01,10.0.0.1,22\ndb01,10.0.0.2,2222\n").unwrap();
        assert_eq!(
            list.hosts,
            vec![
                HostEntry::new("web01", "10.0.0.1", 22),
                HostEntry::new("db01", "10.0.0.2", 2222),
            ]
        );
        assert!(list.skipped.is_empty());
    }

    #[test]
    fn test_column_order_and_extra_columns() {
        let list = parse("site,port,ip,hostname\nams,22,10.1.1.1,edge1\r\n").unwrap();
        assert_eq!(list.hosts, vec![HostEntry::new("edge1", "10.1.1.1", 22)]);
    }

    #[test]
    fn test_quoted_fields() {
        let list = parse("hostname,ip,port\n\"core, rack \"\"A\"\"\",10.0.0.9,22\n").unwrap();
        assert_eq!(list.hosts[0].hostname, "core, rack \"A\"");
    }

    #[test]
    fn test_bad_rows_are_skipped_with_line_numbers() {
        let list = parse("hostname,ip,port\na,,22\nb,10.0.0.2,ssh\nc,10.0.0.3,0\nd,10.0.0.4,22\n")
            .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(
            list.skipped,
            vec![
                SkippedRow {
                    line: 2,
                    reason: "empty ip".into()
                },
                SkippedRow {
                    line: 3,
                    reason: "invalid port 'ssh'".into()
                },
                SkippedRow {
                    line: 4,
                    reason: "invalid port '0'".into()
                },
            ]
        );
    }

    #[test]
    fn test_blank_lines_ignored() {
        let list = parse("hostname,ip,port\n\nweb,10.0.0.1,22\n\n").unwrap();
        assert_eq!(list.len(), 1);
        assert!(list.skipped.is_empty());
    }

    #[test]
    fn test_missing_columns() {
        let err = parse("name,address,port\nx,10.0.0.1,22\n").unwrap_err();
        assert!(matches!(err, LoadError::MissingColumns(ref cols) if cols == &["hostname", "ip"]));
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(parse(""), Err(LoadError::Empty(_))));
    }

    #[test]
    fn test_bom_is_stripped() {
        let list = parse("\u{feff}hostname,ip,port\nweb,10.0.0.1,22").unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_sample_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("assets").join("hosts.csv");

        write_sample(&path).unwrap();
        let list = load_hosts_csv(&path).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.hosts[2].port, 2222);

        assert!(matches!(write_sample(&path), Err(LoadError::AlreadyExists(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load_hosts_csv(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
