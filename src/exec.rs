use crate::error::ParseError;
use log::{debug, info, warn};

pub fn parse_exec(raw: &str) -> Result<Vec<String>, ParseError> {
    let mut args = Vec::new();
    let mut word = Word::default();
    let mut quote: Option<char> = None;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '%' {
            match chars.peek().copied() {
                Some('%') => {
                    chars.next();
                    word.text.push('%');
                }
                // Not a field code; the whitespace still separates words.
                Some(next) if next.is_whitespace() => {
                    warn!("Lone '%' in Exec value {:?}, ignoring", raw);
                }
                Some(code) => {
                    chars.next();
                    elide_field_code(code, raw);
                    word.elided = true;
                }
                None => warn!("Trailing '%' in Exec value {:?}, ignoring", raw),
            }
            continue;
        }

        match quote {
            Some('\'') => {
                if c == '\'' {
                    quote = None;
                } else {
                    word.text.push(c);
                }
            }
            Some(_) => match c {
                '"' => quote = None,
                '\\' => match chars.next() {
                    Some(n @ ('$' | '`' | '"' | '\\')) => word.text.push(n),
                    Some('\n') => {}
                    Some(n) => {
                        word.text.push('\\');
                        word.text.push(n);
                    }
                    None => return Err(ParseError::UnterminatedQuote(raw.to_string())),
                },
                _ => word.text.push(c),
            },
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    word.quoted = true;
                }
                '\\' => match chars.next() {
                    Some('\n') => {}
                    Some(n) => word.text.push(n),
                    None => return Err(ParseError::DanglingEscape(raw.to_string())),
                },
                c if c.is_whitespace() => word.finish(&mut args),
                _ => word.text.push(c),
            },
        }
    }

    if quote.is_some() {
        return Err(ParseError::UnterminatedQuote(raw.to_string()));
    }
    word.finish(&mut args);

    if args.is_empty() {
        return Err(ParseError::EmptyCommand);
    }
    Ok(args)
}

#[derive(Default)]
struct Word {
    text: String,
    quoted: bool,
    elided: bool,
}

impl Word {
    // A quoted empty word survives (`''`), one emptied by an elided code does not.
    fn finish(&mut self, args: &mut Vec<String>) {
        if !self.text.is_empty() || (self.quoted && !self.elided) {
            args.push(std::mem::take(&mut self.text));
        }
        self.text.clear();
        self.quoted = false;
        self.elided = false;
    }
}

fn elide_field_code(code: char, raw: &str) {
    match code {
        'f' | 'F' | 'u' | 'U' => debug!("Dropping file/url field code %{}", code),
        'd' | 'D' | 'n' | 'N' | 'v' | 'm' => debug!("Dropping deprecated field code %{}", code),
        'i' | 'c' | 'k' => info!("Field code %{} is not supported, dropping it from {:?}", code, raw),
        _ => warn!("Unknown field code %{} in Exec value {:?}, dropping it", code, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(raw: &str) -> Vec<String> {
        parse_exec(raw).unwrap()
    }

    #[test]
    fn plain_and_field_codes() {
        assert_eq!(argv("a"), vec!["a"]);
        assert_eq!(argv("blender %f"), vec!["blender"]);
        assert_eq!(argv("%%"), vec!["%"]);
        assert_eq!(argv("firefox %u --new-window"), vec!["firefox", "--new-window"]);
        assert_eq!(argv("app --progress=50%%"), vec!["app", "--progress=50%"]);
    }

    #[test]
    fn icon_code_is_elided_not_inserted() {
        assert_eq!(argv("vlc %i --started-from-file %U"), vec!["vlc", "--started-from-file"]);
        assert_eq!(argv("app --icon=%i"), vec!["app", "--icon="]);
    }

    #[test]
    fn shell_escapes() {
        assert_eq!(argv("\\\\"), vec!["\\"]);
        assert_eq!(argv("\\$"), vec!["$"]);
        assert_eq!(argv("\\&"), vec!["&"]);
        assert_eq!(argv(r"echo a\ b"), vec!["echo", "a b"]);
    }

    #[test]
    fn quoting_groups_words() {
        assert_eq!(
            argv(r#"sh -c "echo \"hi there\"" 'single $x'"#),
            vec!["sh", "-c", "echo \"hi there\"", "single $x"]
        );
        assert_eq!(argv(r#""/opt/My App/run" --x=1"#), vec!["/opt/My App/run", "--x=1"]);
        assert_eq!(argv(r#"a "b\q""#), vec!["a", "b\\q"]);
        assert_eq!(argv("a '' b"), vec!["a", "", "b"]);
    }

    #[test]
    fn quoted_field_code_leaves_no_empty_argument() {
        assert_eq!(argv(r#"foo "%f""#), vec!["foo"]);
    }

    #[test]
    fn trailing_percent_is_tolerated() {
        assert_eq!(argv("app %"), vec!["app"]);
    }

    #[test]
    fn lone_percent_keeps_words_apart() {
        assert_eq!(argv("app 50% off"), vec!["app", "50", "off"]);
        assert_eq!(argv("notify-send \"50% done\""), vec!["notify-send", "50 done"]);
    }

    #[test]
    fn malformed_values() {
        assert_eq!(parse_exec(""), Err(ParseError::EmptyCommand));
        assert_eq!(parse_exec("   %U  "), Err(ParseError::EmptyCommand));
        assert!(matches!(parse_exec("\"open"), Err(ParseError::UnterminatedQuote(_))));
        assert!(matches!(parse_exec("app \\"), Err(ParseError::DanglingEscape(_))));
    }
}
