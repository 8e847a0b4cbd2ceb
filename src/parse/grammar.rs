use serde_json::{Map, Number, Value};
use winnow::ascii::till_line_ending;
use winnow::combinator::{alt, cut_err, opt, repeat};
use winnow::error::{ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_until, take_while};

// -- Whitespace & comments --------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    let _: () = repeat(
        0..,
        alt((
            take_while(1.., |c: char| c.is_whitespace()).void(),
            ("//", till_line_ending).void(),
            ("/*", take_until(0.., "*/"), "*/").void(),
        )),
    )
    .parse_next(input)?;
    Ok(())
}

// -- Strings & keys ---------------------------------------------------------

fn unicode_escape(input: &mut &str) -> ModalResult<char> {
    take_while(4, |c: char| c.is_ascii_hexdigit())
        .verify_map(|hex: &str| u32::from_str_radix(hex, 16).ok().and_then(char::from_u32))
        .parse_next(input)
}

fn quoted(input: &mut &str) -> ModalResult<String> {
    let quote = one_of(['"', '\'']).parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = any.parse_next(input)?;
        match ch {
            c if c == quote => return Ok(s),
            '\\' => {
                let esc = any.parse_next(input)?;
                match esc {
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    'r' => s.push('\r'),
                    'b' => s.push('\u{8}'),
                    'f' => s.push('\u{c}'),
                    'v' => s.push('\u{b}'),
                    '0' => s.push('\0'),
                    'u' => {
                        let c = cut_err(unicode_escape).parse_next(input)?;
                        s.push(c);
                    }
                    // escaped line break continues the string
                    '\r' => {
                        let _ = opt('\n').parse_next(input)?;
                    }
                    '\n' | '\u{2028}' | '\u{2029}' => {}
                    other => s.push(other),
                }
            }
            '\n' | '\r' => return Err(ErrMode::from_input(input).cut()),
            c => s.push(c),
        }
    }
}

fn identifier<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1, |c: char| c.is_alphabetic() || c == '_' || c == '$'),
        take_while(0.., |c: char| c.is_alphanumeric() || c == '_' || c == '$'),
    )
        .take()
        .parse_next(input)
}

fn key(input: &mut &str) -> ModalResult<String> {
    alt((quoted, identifier.map(String::from)))
        .context(StrContext::Expected(StrContextValue::Description("key")))
        .parse_next(input)
}

// -- Numbers ----------------------------------------------------------------

fn number_value(text: &str) -> Option<Value> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        let n = i64::from_str_radix(hex, 16).ok()?;
        return Some(Value::from(if negative { -n } else { n }));
    }
    if !digits
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
    {
        return None;
    }
    if let Ok(n) = digits.parse::<i64>() {
        return Some(Value::from(if negative { -n } else { n }));
    }
    let f: f64 = digits.parse().ok()?;
    Number::from_f64(if negative { -f } else { f }).map(Value::Number)
}

fn number(input: &mut &str) -> ModalResult<Value> {
    (
        opt(one_of(['+', '-'])),
        one_of(|c: char| c.is_ascii_digit() || c == '.'),
        take_while(0.., |c: char| {
            c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-')
        }),
    )
        .take()
        .verify_map(number_value)
        .context(StrContext::Expected(StrContextValue::Description(
            "finite number",
        )))
        .parse_next(input)
}

// -- Containers -------------------------------------------------------------

fn object(input: &mut &str) -> ModalResult<Value> {
    '{'.parse_next(input)?;
    let mut map = Map::new();
    loop {
        ws.parse_next(input)?;
        if opt('}').parse_next(input)?.is_some() {
            return Ok(Value::Object(map));
        }
        let name = cut_err(key).parse_next(input)?;
        ws.parse_next(input)?;
        cut_err(':')
            .context(StrContext::Expected(StrContextValue::CharLiteral(':')))
            .parse_next(input)?;
        let entry = cut_err(value).parse_next(input)?;
        map.insert(name, entry);
        ws.parse_next(input)?;
        if opt(',').parse_next(input)?.is_none() {
            cut_err('}')
                .context(StrContext::Expected(StrContextValue::CharLiteral('}')))
                .parse_next(input)?;
            return Ok(Value::Object(map));
        }
    }
}

fn array(input: &mut &str) -> ModalResult<Value> {
    '['.parse_next(input)?;
    let mut items = Vec::new();
    loop {
        ws.parse_next(input)?;
        if opt(']').parse_next(input)?.is_some() {
            return Ok(Value::Array(items));
        }
        items.push(cut_err(value).parse_next(input)?);
        ws.parse_next(input)?;
        if opt(',').parse_next(input)?.is_none() {
            cut_err(']')
                .context(StrContext::Expected(StrContextValue::CharLiteral(']')))
                .parse_next(input)?;
            return Ok(Value::Array(items));
        }
    }
}

fn value(input: &mut &str) -> ModalResult<Value> {
    ws.parse_next(input)?;
    alt((
        object,
        array,
        quoted.map(Value::String),
        "true".value(Value::Bool(true)),
        "false".value(Value::Bool(false)),
        "null".value(Value::Null),
        number,
    ))
    .context(StrContext::Expected(StrContextValue::Description("value")))
    .parse_next(input)
}

// -- Top-level parser -------------------------------------------------------

pub fn document(input: &mut &str) -> ModalResult<Value> {
    let root = value(input)?;
    ws.parse_next(input)?;
    Ok(root)
}
