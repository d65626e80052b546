//! Command argument specs and the parser that binds them.
//!
//! A command declares its flags once, at registration. The storage a flag's
//! value lands in is not part of that declaration: every invocation passes a
//! fresh set of [`ArgSlot`]s, index-aligned with the command's specs, so a
//! shared descriptor never holds a pointer into a finished call.

use simcli_types::config::FLAG_PREFIX;
use simcli_types::error::ArgError;

/// What follows a flag on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Nothing. The flag alone sets its destination.
    Flag,
    /// A base-10 signed 32-bit integer.
    Int,
    /// Any token that does not itself look like a flag.
    Str,
}

/// One declared flag of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    flag: String,
    kind: ArgKind,
}

impl ArgSpec {
    pub fn new(flag: impl Into<String>, kind: ArgKind) -> Self {
        Self {
            flag: flag.into(),
            kind,
        }
    }

    /// A flag with no value (`-o`).
    pub fn flag(flag: impl Into<String>) -> Self {
        Self::new(flag, ArgKind::Flag)
    }

    /// A flag followed by an integer (`-n 10`).
    pub fn int(flag: impl Into<String>) -> Self {
        Self::new(flag, ArgKind::Int)
    }

    /// A flag followed by a string (`-f data.txt`).
    pub fn string(flag: impl Into<String>) -> Self {
        Self::new(flag, ArgKind::Str)
    }

    pub fn name(&self) -> &str {
        &self.flag
    }

    pub fn kind(&self) -> ArgKind {
        self.kind
    }
}

/// Bounded string destination.
///
/// Values longer than `capacity` bytes are cut at the last character
/// boundary that fits.
#[derive(Debug)]
pub struct StrSlot<'a> {
    dest: &'a mut String,
    capacity: usize,
}

impl<'a> StrSlot<'a> {
    pub fn new(dest: &'a mut String, capacity: usize) -> Self {
        Self { dest, capacity }
    }

    fn store(&mut self, value: &str) {
        let mut end = value.len().min(self.capacity);
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        self.dest.clear();
        self.dest.push_str(&value[..end]);
    }
}

/// Per-call destination for one argument spec.
#[derive(Debug, Default)]
pub enum ArgSlot<'a> {
    /// The value is validated and consumed, then dropped.
    #[default]
    None,
    Flag(&'a mut bool),
    Int(&'a mut i32),
    Str(StrSlot<'a>),
}

impl<'a> ArgSlot<'a> {
    /// Shorthand for a bounded string destination.
    pub fn string(dest: &'a mut String, capacity: usize) -> Self {
        ArgSlot::Str(StrSlot::new(dest, capacity))
    }

    fn accepts(&self, kind: ArgKind) -> bool {
        matches!(
            (self, kind),
            (ArgSlot::None, _)
                | (ArgSlot::Flag(_), ArgKind::Flag)
                | (ArgSlot::Int(_), ArgKind::Int)
                | (ArgSlot::Str(_), ArgKind::Str)
        )
    }
}

/// Bind `tokens` against `specs`, writing values into the matching `slots`.
///
/// `slots[i]` receives the value of `specs[i]`; missing slots behave like
/// [`ArgSlot::None`]. Each token in flag position must equal a declared flag
/// exactly, first match in spec order wins. Parsing stops at the first
/// failure, and slots written before it keep their values.
pub fn parse_args(
    tokens: &[&str],
    specs: &[ArgSpec],
    slots: &mut [ArgSlot<'_>],
) -> Result<(), ArgError> {
    let mut pos = 0;
    while pos < tokens.len() {
        let token = tokens[pos];
        let Some(idx) = specs.iter().position(|s| s.flag == token) else {
            log::debug!("Unknown argument '{token}'");
            return Err(ArgError::Unknown(token.to_string()));
        };
        let spec = &specs[idx];
        let mut slot = slots.get_mut(idx);
        if slot.as_ref().is_some_and(|s| !s.accepts(spec.kind)) {
            return Err(ArgError::BindingMismatch(spec.flag.clone()));
        }

        match spec.kind {
            ArgKind::Flag => {
                if let Some(ArgSlot::Flag(dest)) = slot.as_deref_mut() {
                    **dest = true;
                }
                pos += 1;
            },
            ArgKind::Int => {
                let raw = tokens.get(pos + 1).copied();
                let value = raw
                    .and_then(|r| r.parse::<i32>().ok())
                    .ok_or_else(|| ArgError::BadValue {
                        flag: spec.flag.clone(),
                        value: raw.map(str::to_string),
                    })?;
                if let Some(ArgSlot::Int(dest)) = slot.as_deref_mut() {
                    **dest = value;
                }
                pos += 2;
            },
            ArgKind::Str => {
                let value = match tokens.get(pos + 1) {
                    Some(raw) if !raw.starts_with(FLAG_PREFIX) => *raw,
                    _ => return Err(ArgError::MissingValue(spec.flag.clone())),
                };
                if let Some(ArgSlot::Str(dest)) = slot.as_deref_mut() {
                    dest.store(value);
                }
                pos += 2;
            },
        }
    }
    Ok(())
}
