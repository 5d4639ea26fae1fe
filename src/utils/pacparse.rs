/// Parse and write pacman style package database files
use anyhow::bail;
use nom::{
    bytes::complete::take_till,
    character::complete::{alphanumeric1, char},
    IResult,
};
use std::collections::HashMap;

/// Parse the key part of a paragraph, like `%NAME%`
fn parse_key(i: &str) -> IResult<&str, &str> {
    let (i, _) = char('%')(i)?;
    let (i, key) = alphanumeric1(i)?;
    let (i, _) = char('%')(i)?;
    // There should be a newline after the key line
    let (i, _) = char('\n')(i)?;

    Ok((i, key))
}

/// Parse the value part of a paragraph that ends with an empty line or EOF
fn parse_value(mut i: &str) -> IResult<&str, Vec<String>> {
    let mut lines = Vec::new();
    loop {
        let (x, content) = take_till(|c| c == '\n')(i)?;
        let (x, _) = char('\n')(x)?;
        i = x;
        if content.is_empty() {
            break;
        }
        lines.push(content.to_owned());
        if x.is_empty() {
            break;
        }
    }
    Ok((i, lines))
}

/// Parse a key-value pair in pacman's package description syntax
fn parse_pair(i: &str) -> IResult<&str, (String, Vec<String>)> {
    let (i, key) = parse_key(i)?;
    let (i, lines) = parse_value(i)?;

    Ok((i, (key.to_owned(), lines)))
}

pub fn parse_str(mut i: &str) -> anyhow::Result<HashMap<String, Vec<String>>> {
    let mut res = HashMap::new();
    let mut counter = 0;
    loop {
        // An empty scalar leaves its terminating blank line behind
        i = i.trim_start_matches('\n');
        if i.is_empty() {
            break;
        }
        match parse_pair(i) {
            Ok((x, pair)) => {
                res.insert(pair.0, pair.1);
                counter += 1;
                i = x;
            }
            Err(e) => {
                bail!("bad pacman database on paragraph {counter}: {e}");
            }
        }
    }
    Ok(res)
}

/// Append a single value paragraph
pub fn write_string(buf: &mut String, header: &str, value: &str) {
    buf.push('%');
    buf.push_str(header);
    buf.push_str("%\n");
    buf.push_str(value);
    buf.push_str("\n\n");
}

/// Append an integer paragraph
pub fn write_int(buf: &mut String, header: &str, value: impl Into<i128>) {
    write_string(buf, header, &value.into().to_string());
}

/// Append a list paragraph, one value per line
///
/// The header is written even if the list is empty.
pub fn write_list(buf: &mut String, header: &str, values: &[String]) {
    buf.push('%');
    buf.push_str(header);
    buf.push_str("%\n");
    for value in values {
        buf.push_str(value);
        buf.push('\n');
    }
    buf.push('\n');
}
