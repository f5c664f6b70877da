//! HTML escaping helpers shared by the renderers.

pub use hcb_highlight::html_escape;

/// Escape a value for use inside a double-quoted attribute.
pub fn escape_attr(value: &str) -> String {
    html_escape(value)
}

/// Decode the character references that can appear in saved post content.
///
/// Handles the named references HTML serializers emit for code (`&lt;`,
/// `&gt;`, `&amp;`, `&quot;`, `&apos;`, `&nbsp;`) and all numeric ones.
/// Unknown or malformed references are kept verbatim.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').filter(|&semi| semi <= 12).and_then(|semi| {
            let c = decode_reference(&rest[1..semi])?;
            Some((c, semi))
        });
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
