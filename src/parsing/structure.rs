use std::collections::HashMap;
use std::path::Path;

use crate::parsing::ParseError;
use crate::utils::validation::delimiter_for;

/// Parse a CSV/TSV file of secondary-structure annotations keyed by reference name.
///
/// The delimiter follows the extension (`,` for `.csv`, tab otherwise).
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_structure_file(path: &Path) -> Result<HashMap<String, String>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_structure_text(&content, delimiter_for(path))
}

/// Parse structure annotations from text with a header row naming a `name` and a
/// `structure` column. Other columns are ignored.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if the header lacks either column, a row is
/// too short, or a name appears twice.
pub fn parse_structure_text(
    text: &str,
    delimiter: char,
) -> Result<HashMap<String, String>, ParseError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

    let Some((_, header)) = lines.next() else {
        return Err(ParseError::InvalidFormat(
            "Structure file is empty".to_string(),
        ));
    };

    let columns: Vec<String> = header
        .split(delimiter)
        .map(|c| c.trim().to_lowercase())
        .collect();
    let column = |name: &str| {
        columns.iter().position(|c| c == name).ok_or_else(|| {
            ParseError::InvalidFormat(format!("Structure file header has no '{name}' column"))
        })
    };
    let name_col = column("name")?;
    let structure_col = column("structure")?;

    let mut structures = HashMap::new();
    for (line_num, line) in lines {
        let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();
        let (Some(name), Some(structure)) = (fields.get(name_col), fields.get(structure_col))
        else {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has fewer than {} fields",
                name_col.max(structure_col) + 1
            )));
        };

        if structures
            .insert((*name).to_string(), (*structure).to_string())
            .is_some()
        {
            return Err(ParseError::InvalidFormat(format!(
                "Duplicate structure for '{name}' on line {line_num}"
            )));
        }
    }

    Ok(structures)
}
