use crate::engine::{Collection, Container};
use crate::error::{BuildError, LoadError};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Parses an array of string slices into a `Collection`.
///
/// Each string slice is one container, listed bottom to top, one character per
/// item. Every container gets the same `capacity`.
///
/// The character `.` is padding: it may only appear after the items, so
/// `"RG.."` is a container holding `R` under `G`, and `"."` (or `""`) is an
/// empty container. Whitespace is not allowed inside a row.
///
/// # Returns
/// * `Ok(Collection)` if parsing is successful.
/// * `Err(BuildError)` if the capacity is 0, or a row has whitespace or an item
///   following padding. The error names the offending container.
///
/// # Examples
/// ```
/// use bottle_sort_solver::utils::collection_from_str_array;
/// use bottle_sort_solver::engine::Item;
///
/// let collection = collection_from_str_array(&["RGG", "G..", "..."], 3).unwrap();
/// assert_eq!(collection.len(), 3);
/// assert_eq!(collection.get(0).unwrap().head(), Some(&Item::new("G")));
/// assert!(collection.get(2).unwrap().is_empty());
///
/// assert!(collection_from_str_array(&["R.G"], 3).is_err());
/// ```
pub fn collection_from_str_array(rows: &[&str], capacity: usize) -> Result<Collection, BuildError> {
    if capacity == 0 {
        return Err(BuildError::ZeroCapacity);
    }
    let mut containers = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let labels = parse_row(row).map_err(|reason| BuildError::MalformedContainer {
            container: index,
            reason,
        })?;
        let container = Container::from_labels(labels.as_slice(), capacity)
            .map_err(|e| e.in_container(index))?;
        containers.push(container);
    }
    Ok(Collection::new(containers))
}

fn parse_row(row: &str) -> Result<Vec<String>, String> {
    let mut labels = Vec::new();
    let mut in_padding = false;
    for (col, ch) in row.chars().enumerate() {
        match ch {
            '.' => in_padding = true,
            c if c.is_whitespace() => {
                return Err(format!("unexpected whitespace at column {}", col));
            }
            c if in_padding => {
                return Err(format!("item '{}' at column {} follows padding", c, col));
            }
            c => labels.push(c.to_string()),
        }
    }
    Ok(labels)
}

/// Parses the text puzzle format.
///
/// One container per line in the `collection_from_str_array` row syntax. Blank
/// lines and lines starting with `#` are ignored. A `capacity = N` (or
/// `capacity: N`) line before the first container overrides `default_capacity`.
pub fn parse_text_puzzle(content: &str, default_capacity: usize) -> Result<Collection, LoadError> {
    let mut capacity = default_capacity;
    let mut rows: Vec<Vec<String>> = Vec::new();

    for (idx, raw_line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let directive = line
            .strip_prefix("capacity")
            .map(str::trim_start)
            .filter(|rest| rest.starts_with([':', '=']));
        if let Some(rest) = directive {
            if !rows.is_empty() {
                return Err(LoadError::Format {
                    line: line_no,
                    reason: "capacity must be set before the first container".to_string(),
                });
            }
            let value = rest[1..].trim();
            capacity = value.parse().map_err(|_| LoadError::Format {
                line: line_no,
                reason: format!("invalid capacity '{}'", value),
            })?;
            continue;
        }
        let labels = parse_row(line).map_err(|reason| LoadError::Format {
            line: line_no,
            reason,
        })?;
        rows.push(labels);
    }

    Ok(Collection::from_labels(rows.as_slice(), capacity)?)
}

/// Shape of a JSON puzzle: either a bare list of containers or an object
/// that also carries the capacity.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PuzzleFile {
    Containers(Vec<Vec<String>>),
    Described {
        capacity: Option<usize>,
        containers: Vec<Vec<String>>,
    },
}

/// Parses a JSON puzzle, e.g. `[["red", "blue"], ["blue", "red"], []]` or
/// `{"capacity": 2, "containers": [["red", "blue"], ["blue", "red"], []]}`.
pub fn parse_json_puzzle(content: &str, default_capacity: usize) -> Result<Collection, LoadError> {
    let (capacity, containers) = match serde_json::from_str::<PuzzleFile>(content)? {
        PuzzleFile::Containers(containers) => (default_capacity, containers),
        PuzzleFile::Described {
            capacity,
            containers,
        } => (capacity.unwrap_or(default_capacity), containers),
    };
    Ok(Collection::from_labels(containers.as_slice(), capacity)?)
}

/// Loads a puzzle file, choosing the parser from the file extension
/// (`.json` or `.txt`).
///
/// # Errors
/// Returns `LoadError::UnsupportedExtension` for any other extension,
/// `LoadError::Read` if the file cannot be read, and a parse error if the
/// content is malformed.
pub fn load_collection(path: &Path, default_capacity: usize) -> Result<Collection, LoadError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let parse: fn(&str, usize) -> Result<Collection, LoadError> = match extension.as_deref() {
        Some("json") => parse_json_puzzle,
        Some("txt") => parse_text_puzzle,
        _ => return Err(LoadError::UnsupportedExtension(path.to_path_buf())),
    };
    let content = fs::read_to_string(path).map_err(|e| LoadError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let collection = parse(&content, default_capacity)?;
    log::debug!(
        "loaded {} containers from {}",
        collection.len(),
        path.display()
    );
    Ok(collection)
}
