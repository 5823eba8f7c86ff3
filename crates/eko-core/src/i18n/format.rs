//! Named-placeholder substitution for catalog templates.

/// Replace every `{name}` in `template` with the matching param value.
///
/// `{{` and `}}` produce literal braces. Returns `None` when a placeholder
/// has no matching param or a brace is unbalanced; unused params are ignored.
pub fn interpolate(template: &str, params: &[(&str, &str)]) -> Option<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next()? {
                        '}' => break,
                        ch => name.push(ch),
                    }
                }
                let (_, value) = params.iter().find(|(key, _)| *key == name)?;
                out.push_str(value);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return None,
            other => out.push(other),
        }
    }

    Some(out)
}
