use crate::domain::tag::is_valid_separator;

/// Derive a module name from its workspace-relative directory path.
///
/// Lowercases, turns path separators and any character outside
/// `[a-z0-9._-]` into `separator`, collapses repeated `separator`s and trims
/// every valid separator from both ends. Applying it to its own output is a
/// no-op.
pub fn module_name_from_path(relative_path: &str, separator: char) -> String {
    let mut name = String::with_capacity(relative_path.len());

    for c in relative_path.trim().chars() {
        let mapped = match c {
            '/' | '\\' => separator,
            c if c.is_ascii_alphanumeric() => c.to_ascii_lowercase(),
            '-' | '_' | '.' => c,
            _ => separator,
        };

        if mapped == separator && name.ends_with(separator) {
            continue;
        }
        name.push(mapped);
    }

    name.trim_matches(is_valid_separator).to_string()
}
