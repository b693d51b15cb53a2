/*!
 * Removal of inline MTEXT formatting codes.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// One alternative per MTEXT code family; the replacement is chosen in `render_code`.
static MTEXT_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
          \\\\                             # escaped backslash
        | \\[{}]                           # escaped brace
        | \\~                              # non-breaking space
        | \\[fFcCHhWwQqAap][^;\\]*;       # property change terminated by ;
        | \\T[0-9.]+x?;                   # tracking factor
        | \\S([^;]*);                      # stacked fraction
        | \\[LlOoKk]                       # underline / overline / strike toggles
        | \\[PNnXx]                        # paragraph and column breaks
        | \\[tT]                           # bare tab escape
        | [{}]                             # grouping braces
        | %%[cCdDpP]                       # TEXT special characters
        ",
    )
    .expect("MTEXT code regex is valid")
});

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

fn render_code(caps: &Captures<'_>) -> String {
    let code = &caps[0];
    if let Some(stacked) = caps.get(1) {
        return stacked.as_str().replace(['^', '#'], "/");
    }
    match code {
        "\\\\" => "\\".to_string(),
        "\\{" => "{".to_string(),
        "\\}" => "}".to_string(),
        "{" | "}" => String::new(),
        "%%c" | "%%C" => "⌀".to_string(),
        "%%d" | "%%D" => "°".to_string(),
        "%%p" | "%%P" => "±".to_string(),
        _ if code.len() == 2 => match code.as_bytes()[1] {
            b'~' | b'P' | b'N' | b'n' | b'X' | b'x' | b'T' | b't' => " ".to_string(),
            _ => String::new(),
        },
        _ => String::new(),
    }
}

/// Collapses whitespace runs to one space and trims.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// Strips font, color, height and width changes, escape groups and break codes.
///
/// Input must already be decoded; see `TextSanitizer::decode_safely`.
pub fn clean_formatting(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let stripped = MTEXT_CODE.replace_all(text, |caps: &Captures<'_>| render_code(caps));
    collapse_whitespace(&stripped)
}
