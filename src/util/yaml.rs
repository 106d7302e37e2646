use std::path::Path;
use std::fs::read_to_string;

const YAML_ERROR_SHOW_LINES:usize = 3;
const YAML_ERROR_WIDTH:usize = 180; // things will wrap in terminal anyway

// ==============================================================================================================
// PUBLIC API
// ==============================================================================================================

/// Print a YAML error from an inventory source file with the offending lines around it.
pub fn show_yaml_error_in_context(yaml_error: &serde_yaml::Error, path: &Path) {
    let contents = read_to_string(path).unwrap_or_default();
    eprintln!("{}", yaml_error_in_context(yaml_error, path, &contents));
}

pub fn yaml_error_in_context(yaml_error: &serde_yaml::Error, path: &Path, contents: &str) -> String {

    let mut yaml_error_str = format!("{}", yaml_error);
    if yaml_error_str.len() > YAML_ERROR_WIDTH {
        yaml_error_str.truncate(YAML_ERROR_WIDTH - 3);
        yaml_error_str.push_str("...");
    }

    let mut out = format!("Error reading YAML file: {}, {}\n", path.display(), yaml_error_str);

    let location = match yaml_error.location() {
        Some(x) => x,
        None => return out,
    };
    let error_line = location.line();
    let error_column = location.column();

    let show_start = error_line.saturating_sub(YAML_ERROR_SHOW_LINES);
    let show_stop = error_line + YAML_ERROR_SHOW_LINES;

    out.push('\n');
    for (idx, line) in contents.lines().enumerate() {
        let count = idx + 1;
        if count < show_start || count > show_stop {
            continue;
        }
        if count == error_line {
            out.push_str(&format!("     {count:5}:{error_column:5} | >>> | {}\n", line));
        } else {
            out.push_str(&format!("     {count:5}       |     | {}\n", line));
        }
    }
    out
}
