//! Command template rendering
//!
//! Templates use a closed placeholder vocabulary. Anything that is not one
//! of the three tokens below, including unknown `{...}` spans, passes
//! through untouched.

/// Expands to `"<file_path> -o <output_file>"`
pub const FILE_OUTPUT: &str = "{file_output}";
/// Expands to the source file path
pub const FILE_PATH: &str = "{file_path}";
/// Expands to the derived artifact path
pub const OUTPUT_FILE: &str = "{output_file}";

/// Substitute the placeholder tokens in `template`.
///
/// Substitution is a single left-to-right scan; replacement text is never
/// rescanned, so paths containing brace characters stay inert.
pub fn render(template: &str, file_path: &str, output_file: &str) -> String {
    let mut rendered =
        String::with_capacity(template.len() + file_path.len() + output_file.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        rendered.push_str(&rest[..start]);
        let tail = &rest[start..];
        match leading_token(tail, file_path, output_file) {
            Some((replacement, token_len)) => {
                rendered.push_str(&replacement);
                rest = &tail[token_len..];
            }
            None => {
                rendered.push('{');
                rest = &tail[1..];
            }
        }
    }
    rendered.push_str(rest);
    rendered
}

fn leading_token(tail: &str, file_path: &str, output_file: &str) -> Option<(String, usize)> {
    if tail.starts_with(FILE_OUTPUT) {
        Some((format!("{file_path} -o {output_file}"), FILE_OUTPUT.len()))
    } else if tail.starts_with(FILE_PATH) {
        Some((file_path.to_string(), FILE_PATH.len()))
    } else if tail.starts_with(OUTPUT_FILE) {
        Some((output_file.to_string(), OUTPUT_FILE.len()))
    } else {
        None
    }
}

/// Append extra arguments after a rendered command, separated by a single
/// space. Empty or whitespace-only `args` leave the command unchanged.
pub fn append_args(command: &str, args: &str) -> String {
    if args.trim().is_empty() {
        command.to_string()
    } else {
        format!("{command} {args}")
    }
}
