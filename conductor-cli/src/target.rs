//! Target syntax: `name` or `name[arg1,arg2]`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("empty target")]
    Empty,

    #[error("malformed target '{0}': expected name[arg,...]")]
    Malformed(String),
}

/// A task name with its positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub args: Vec<String>,
}

/// Parse `test[--extra,--quick]` into `test` + `["--extra", "--quick"]`.
///
/// Arguments are trimmed; empty arguments are kept so `build[]` passes none
/// while `build[,x]` passes `["", "x"]`.
pub fn parse_target(raw: &str) -> Result<Target, TargetError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(TargetError::Empty);
    }
    let Some(open) = raw.find('[') else {
        if raw.contains(']') {
            return Err(TargetError::Malformed(raw.to_string()));
        }
        return Ok(Target {
            name: raw.to_string(),
            args: Vec::new(),
        });
    };

    let name = &raw[..open];
    let Some(inner) = raw[open + 1..].strip_suffix(']') else {
        return Err(TargetError::Malformed(raw.to_string()));
    };
    if name.is_empty() || inner.contains('[') || inner.contains(']') {
        return Err(TargetError::Malformed(raw.to_string()));
    }

    let args = if inner.trim().is_empty() {
        Vec::new()
    } else {
        inner.split(',').map(|a| a.trim().to_string()).collect()
    };
    Ok(Target {
        name: name.to_string(),
        args,
    })
}
