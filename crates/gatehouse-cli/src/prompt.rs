use std::io::{self, Write};

use anyhow::Result;

/// Prompt for a visible value, offering a default when one is known.
pub fn prompt_line(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(value) => print!("{} [{}]: ", label, value),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(match default {
        Some(value) if input.is_empty() => value.to_string(),
        _ => input.to_string(),
    })
}

/// Prompt for a hidden value.
pub fn prompt_password(label: &str) -> Result<String> {
    Ok(rpassword::prompt_password(format!("{}: ", label))?)
}
