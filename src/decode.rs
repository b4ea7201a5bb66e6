//! Text-decoder collaborator: raw file bytes → plain text.
//!
//! Import hands this module raw bytes; it detects the character set
//! (best-effort, lossy fallback) and, for RTF payloads, strips the control
//! layer down to the document text. Failures never propagate: callers get
//! `None` and record the content as absent.

use chardetng::EncodingDetector;

/// Control words that open groups carrying no document text.
const DESTINATIONS: &[&str] = &[
    "fonttbl",
    "colortbl",
    "stylesheet",
    "info",
    "pict",
    "header",
    "footer",
    "generator",
];

/// Decodes raw file bytes into plain text.
///
/// Character-set detection is best-effort: undecodable sequences are
/// replaced, never fatal. RTF payloads are recognized by their magic
/// prefix and stripped to their text content.
pub fn decode_text(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    let (text, _, _) = encoding.decode(bytes);

    if text.trim_start().starts_with("{\\rtf") {
        Some(strip_rtf(&text))
    } else {
        Some(text.into_owned())
    }
}

/// Strips RTF control words and groups, keeping the document text.
///
/// Handles the constructs that show up in word-processor output: nested
/// groups, destination groups (font/color tables etc.), `\'hh` hex escapes
/// (decoded as windows-1252), escaped braces, and the paragraph/line/tab
/// control words.
pub fn strip_rtf(input: &str) -> String {
    let mut out = String::new();
    let mut chars = input.chars().peekable();
    let mut depth: usize = 0;
    // Depth of the innermost group being skipped, if any.
    let mut skip_above: Option<usize> = None;
    // True directly after `{`, where a `\*` marks an ignorable destination.
    let mut group_start = false;

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                depth += 1;
                group_start = true;
            }
            '}' => {
                if let Some(skip_depth) = skip_above {
                    if depth <= skip_depth {
                        skip_above = None;
                    }
                }
                depth = depth.saturating_sub(1);
                group_start = false;
            }
            '\\' => {
                match chars.peek() {
                    Some('\\') | Some('{') | Some('}') => {
                        if let Some(lit) = chars.next() {
                            if skip_above.is_none() {
                                out.push(lit);
                            }
                        }
                    }
                    Some('\'') => {
                        chars.next();
                        let hi = chars.next();
                        let lo = chars.next();
                        if skip_above.is_none() {
                            if let Some(ch) = decode_hex_escape(hi, lo) {
                                out.push(ch);
                            }
                        }
                    }
                    Some('~') => {
                        chars.next();
                        if skip_above.is_none() {
                            out.push(' ');
                        }
                    }
                    Some('*') => {
                        chars.next();
                        if group_start && skip_above.is_none() {
                            skip_above = Some(depth);
                        }
                    }
                    Some(ch) if ch.is_ascii_alphabetic() => {
                        let word = read_control_word(&mut chars);
                        if skip_above.is_none() {
                            if group_start && DESTINATIONS.contains(&word.as_str()) {
                                skip_above = Some(depth);
                            } else if word == "par" || word == "line" {
                                out.push('\n');
                            } else if word == "tab" {
                                out.push('\t');
                            }
                        }
                    }
                    _ => {
                        // Lone backslash or unknown control symbol: drop it.
                        chars.next();
                    }
                }
                group_start = false;
            }
            '\r' | '\n' => {
                // Raw newlines in RTF are not document text.
                group_start = false;
            }
            _ => {
                if skip_above.is_none() {
                    out.push(c);
                }
                group_start = false;
            }
        }
    }

    out
}

/// Reads the letters and optional signed numeric parameter of a control
/// word, consuming the single space delimiter if present. Returns the
/// word's letters only.
fn read_control_word(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut word = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphabetic() {
            word.push(c);
            chars.next();
        } else {
            break;
        }
    }
    if chars.peek() == Some(&'-') {
        chars.next();
    }
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            chars.next();
        } else {
            break;
        }
    }
    if chars.peek() == Some(&' ') {
        chars.next();
    }
    word
}

/// Decodes a `\'hh` escape as a windows-1252 byte.
fn decode_hex_escape(hi: Option<char>, lo: Option<char>) -> Option<char> {
    let hi = hi?.to_digit(16)?;
    let lo = lo?.to_digit(16)?;
    let byte = [(hi * 16 + lo) as u8];
    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(&byte);
    text.chars().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_utf8() {
        let text = decode_text("Grüße aus dem Wald".as_bytes()).unwrap();
        assert_eq!(text, "Grüße aus dem Wald");
    }

    #[test]
    fn decodes_latin1_with_fallback() {
        // "Grüße" in ISO-8859-1
        let bytes = [0x47, 0x72, 0xfc, 0xdf, 0x65];
        let text = decode_text(&bytes).unwrap();
        assert_eq!(text, "Grüße");
    }

    #[test]
    fn empty_input_is_a_decode_failure() {
        assert!(decode_text(b"").is_none());
    }

    #[test]
    fn strips_basic_rtf() {
        let text = decode_text(br"{\rtf1\ansi Hello World\par}").unwrap();
        assert_eq!(text.trim(), "Hello World");
    }

    #[test]
    fn strips_font_table_destination() {
        let rtf = r"{\rtf1\ansi{\fonttbl{\f0 Helvetica;}}\f0 Visible text\par}";
        let text = strip_rtf(rtf);
        assert!(!text.contains("Helvetica"));
        assert!(text.contains("Visible text"));
    }

    #[test]
    fn strips_starred_destination() {
        let rtf = r"{\rtf1{\*\generator Writer 7;}Body}";
        let text = strip_rtf(rtf);
        assert!(!text.contains("Writer"));
        assert!(text.contains("Body"));
    }

    #[test]
    fn decodes_hex_escapes() {
        // \'e4 is 'ä' in windows-1252
        let text = strip_rtf(r"{\rtf1 B\'e4ume\par}");
        assert_eq!(text.trim(), "Bäume");

        // consecutive escapes, including the upper range
        let text = strip_rtf(r"{\rtf1 Gr\'fc\'dfe}");
        assert_eq!(text.trim(), "Grüße");
    }

    #[test]
    fn truncated_hex_escape_is_dropped() {
        let text = strip_rtf(r"{\rtf1 end\'e");
        assert_eq!(text.trim(), "end");
    }

    #[test]
    fn keeps_escaped_braces() {
        let text = strip_rtf(r"{\rtf1 a \{b\} c}");
        assert_eq!(text.trim(), "a {b} c");
    }

    #[test]
    fn par_and_tab_become_whitespace() {
        let text = strip_rtf(r"{\rtf1 one\par two\tab three}");
        assert_eq!(text, "one\ntwo\tthree");
    }
}
