//! Query text normalization using nom.
//!
//! Query directives carry SQL written for a named-parameter runtime. The
//! embedded-SQL toolchain wants positional placeholders, so:
//!
//! ```text
//! SELECT * FROM `user` WHERE id = :id AND name = :name;
//!                  ▼
//! SELECT * FROM user WHERE id = ? AND name = ?
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, satisfy},
    combinator::{recognize, value},
    multi::fold_many0,
    sequence::{pair, preceded},
    IResult,
};

/// Identifier-quoting character stripped from query text.
const IDENT_QUOTE: char = '`';

/// Normalize query text for the embedded-SQL toolchain.
///
/// Strips identifier quotes, rewrites every `:identifier` parameter to `?`,
/// trims surrounding whitespace and drops one trailing `;`.
///
/// # Example
///
/// ```
/// use sqforge::normalize_sql;
///
/// assert_eq!(
///     normalize_sql("SELECT * FROM t WHERE id = :id;"),
///     "SELECT * FROM t WHERE id = ?"
/// );
/// ```
pub fn normalize_sql(sql: &str) -> String {
    let unquoted = sql.replace(IDENT_QUOTE, "");
    let rewritten = rewrite_params(&unquoted)
        .map(|(_, out)| out)
        .unwrap_or_else(|_| unquoted.clone());
    let trimmed = rewritten.trim();
    trimmed.strip_suffix(';').unwrap_or(trimmed).to_string()
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Parse a named parameter `:identifier`.
fn named_param(input: &str) -> IResult<&str, &str> {
    recognize(preceded(
        char(':'),
        pair(satisfy(is_ident_start), take_while(is_ident_char)),
    ))(input)
}

/// Replace every named parameter with a positional placeholder.
fn rewrite_params(input: &str) -> IResult<&str, String> {
    fold_many0(
        alt((
            take_while1(|c: char| c != ':'),
            value("?", named_param),
            // A colon that does not start a parameter, e.g. `:1` or `::`
            tag(":"),
        )),
        String::new,
        |mut acc, piece| {
            acc.push_str(piece);
            acc
        },
    )(input)
}
