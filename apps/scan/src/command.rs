use fruitscan::InputSource;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Submit { path: PathBuf, source: InputSource },
    Show,
    Retry,
    Clear,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  upload <path>   classify a JPEG or PNG file
  camera <path>   classify a frame captured by a camera tool
  show            show the result for the current image again
  retry           reload the model after a failure and classify again
  clear           forget the current image
  help            print this help
  quit            exit";

/// Parses one line of input. `Ok(None)` for blank lines.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let submit = |source: InputSource| {
        if rest.is_empty() {
            Err(format!("usage: {verb} <path>"))
        } else {
            Ok(Command::Submit {
                path: PathBuf::from(unquote(rest)),
                source,
            })
        }
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "upload" | "u" => submit(InputSource::Upload)?,
        "camera" | "c" => submit(InputSource::Camera)?,
        "show" | "s" => Command::Show,
        "retry" => Command::Retry,
        "clear" => Command::Clear,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command `{other}`, type `help`")),
    };
    Ok(Some(command))
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_submissions() {
        assert_eq!(
            parse("upload ./apple.jpg").unwrap(),
            Some(Command::Submit {
                path: PathBuf::from("./apple.jpg"),
                source: InputSource::Upload
            })
        );
        assert_eq!(
            parse("  camera \"/tmp/frame one.png\" ").unwrap(),
            Some(Command::Submit {
                path: PathBuf::from("/tmp/frame one.png"),
                source: InputSource::Camera
            })
        );
    }

    #[test]
    fn parses_plain_commands() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("SHOW").unwrap(), Some(Command::Show));
        assert_eq!(parse("clear").unwrap(), Some(Command::Clear));
        assert_eq!(parse("retry").unwrap(), Some(Command::Retry));
        assert_eq!(parse("q").unwrap(), Some(Command::Quit));
        assert_eq!(parse("?").unwrap(), Some(Command::Help));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse("upload").is_err());
        assert!(parse("eat banana").is_err());
    }
}
