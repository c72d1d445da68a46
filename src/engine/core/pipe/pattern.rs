use crate::engine::errors::QueryError;

/// One step of a format pattern: a literal prefix followed by an optional
/// field reference, e.g. the pattern `ip=<ip> msg=<q:msg>` yields steps
/// `{"ip=", ip, ""}`, `{" msg=", msg, "q"}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternStep {
    pub prefix: String,
    pub field: String,
    pub field_opt: String,
}

/// Splits a pattern string into steps. Field references are `<name>` or
/// `<opt:name>`; an unclosed `<` is a user error.
pub fn parse_pattern_steps(pattern: &str) -> Result<Vec<PatternStep>, QueryError> {
    let mut steps = Vec::new();
    let mut rest = pattern;
    loop {
        let Some(open) = rest.find('<') else {
            if !rest.is_empty() || steps.is_empty() {
                steps.push(PatternStep {
                    prefix: rest.to_string(),
                    field: String::new(),
                    field_opt: String::new(),
                });
            }
            return Ok(steps);
        };
        let Some(close) = rest[open..].find('>') else {
            return Err(QueryError::UnclosedPatternField(pattern.to_string()));
        };
        let close = open + close;
        let reference = &rest[open + 1..close];
        let (field_opt, field) = match reference.split_once(':') {
            Some((opt, name)) => (opt.to_string(), name.trim().to_string()),
            None => (String::new(), reference.trim().to_string()),
        };
        steps.push(PatternStep {
            prefix: rest[..open].to_string(),
            field,
            field_opt,
        });
        rest = &rest[close + 1..];
        if rest.is_empty() {
            return Ok(steps);
        }
    }
}
