use super::{CfgLevel, CfgValue};
use crate::error::{Error, Result};
use crate::fmt::unquote;
use error_stack::{IntoReport, Report, ResultExt};
use std::fs;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Parsed INI-style config
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CfgParser {
    root: CfgLevel,
}

impl CfgParser {
    /// Parse config text
    pub fn parse(text: &str) -> Result<Self> {
        let mut root = CfgLevel::new("", 0);
        let mut current: Vec<String> = vec![];

        for (index, raw_line) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                current = parse_section_header(header)
                    .attach_printable_lazy(|| format!("line {line_no}: `{raw_line}`"))?;
                root.section_mut_or_insert(&current);
                continue;
            }

            let (key, value) = match line.find(|c| c == '=' || c == ':') {
                Some(i) => (line[..i].trim(), line[i + 1..].trim()),
                None => {
                    return Err(Report::new(Error::runtime("malformed config line"))
                        .attach_printable(format!("line {line_no}: `{raw_line}`"))
                        .attach_printable("expected `[section]` or `key = value`"));
                }
            };
            if key.is_empty() {
                return Err(Report::new(Error::runtime("empty key in config"))
                    .attach_printable(format!("line {line_no}: `{raw_line}`")));
            }
            let section = root.section_mut_or_insert(&current);
            if !section.insert_value(key, CfgValue::new(unquote(value))) {
                return Err(Report::new(Error::runtime("duplicate key in config"))
                    .attach_printable(format!(
                        "line {line_no}: key `{key}` already defined in section `{}`",
                        current.join(".")
                    )));
            }
        }

        Ok(Self { root })
    }

    /// Read everything from `reader` and parse it
    pub fn from_reader<R>(mut reader: R) -> Result<Self>
    where
        R: Read,
    {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .into_report()
            .change_context_lazy(|| Error::io("cannot read config"))?;
        Self::parse(&text)
    }

    /// Read and parse a config file
    pub fn from_file<P>(path: &P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .into_report()
            .change_context_lazy(|| Error::io("cannot read config file"))
            .attach_printable_lazy(|| format!("`{}`", path.display()))?;
        Self::parse(&text).attach_printable_lazy(|| format!("in `{}`", path.display()))
    }

    #[inline]
    pub fn root(&self) -> &CfgLevel {
        &self.root
    }

    #[inline]
    pub fn into_root(self) -> CfgLevel {
        self.root
    }
}

impl FromStr for CfgParser {
    type Err = Report<Error>;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Parse what follows `[` into section path segments
fn parse_section_header(header: &str) -> Result<Vec<String>> {
    let inner = match header.strip_suffix(']') {
        Some(inner) => inner,
        None => return Err(Report::new(Error::runtime("unterminated section header"))),
    };
    let segments = inner
        .split('.')
        .map(str::trim)
        .map(str::to_string)
        .collect::<Vec<_>>();
    if segments.iter().any(String::is_empty) {
        return Err(Report::new(Error::runtime("empty section name")));
    }
    Ok(segments)
}

#[cfg(test)]
mod ut {
    use super::*;
    use crate::error::ErrorKind;

    const SAMPLE: &str = "
# top comment
name = root value
[global]
levels = INFO WARN
format: '[%level] %msg'

[sinks]
[sinks.f]
type=simplefile
 ; indented comment
filename = \"out.log\"
[ loggers . app ]
sink_list = f, stdout
";

    #[test]
    fn test_parse_sample() {
        let cfg = CfgParser::parse(SAMPLE).unwrap();
        let root = cfg.root();
        assert_eq!("root value", root.value("name").unwrap().as_str());
        assert_eq!("INFO WARN", root.get("global.levels").unwrap().as_str());
        assert_eq!("[%level] %msg", root.get("global.format").unwrap().as_str());
        assert_eq!("out.log", root.get("sinks.f.filename").unwrap().as_str());
        assert_eq!(
            vec!["f", "stdout"],
            root.get("loggers.app.sink_list").unwrap().split()
        );
        let app = root.get_section("loggers.app").unwrap();
        assert_eq!("app", app.name());
        assert_eq!(2, app.depth());
    }

    #[test]
    fn test_sections_iter() {
        let cfg = CfgParser::parse("[a.x]\nk=1\n[a.y]\n[b]\n").unwrap();
        let a = cfg.root().section("a").unwrap();
        let names = a.sections().map(|(n, _)| n).collect::<Vec<_>>();
        assert_eq!(vec!["x", "y"], names);
        assert!(a.section("y").unwrap().is_empty());
    }

    #[test]
    fn test_reopen_section() {
        let cfg = CfgParser::parse("[a]\nk=1\n[b]\n[a]\nj=2\n").unwrap();
        assert_eq!(1, cfg.root().get("a.k").unwrap().load::<i32>().unwrap());
        assert_eq!(2, cfg.root().get("a.j").unwrap().load::<i32>().unwrap());
    }

    #[test]
    fn test_first_separator_wins() {
        let cfg = CfgParser::parse("format = %H:%M\n").unwrap();
        assert_eq!("%H:%M", cfg.root().value("format").unwrap().as_str());
    }

    #[test]
    fn test_duplicate_key() {
        let err = CfgParser::parse("[a]\nk=1\nk=2\n").unwrap_err();
        assert_eq!(ErrorKind::Runtime, err.current_context().kind);
    }

    #[test]
    fn test_malformed() {
        assert!(CfgParser::parse("[a\n").is_err());
        assert!(CfgParser::parse("[a..b]\n").is_err());
        assert!(CfgParser::parse("just words\n").is_err());
        assert!(CfgParser::parse("= value\n").is_err());
    }

    #[test]
    fn test_load_errors() {
        let v = CfgValue::new("abc");
        let err = v.load::<u64>().unwrap_err();
        assert_eq!(ErrorKind::Cast, err.current_context().kind);
        assert!(v.as_bool().is_err());
        assert!(CfgValue::new("on").as_bool().unwrap());
    }

    #[test]
    fn test_from_str() {
        let cfg: CfgParser = "[x]\ny = z".parse().unwrap();
        assert_eq!("z", cfg.root().get("x.y").unwrap().as_str());
    }
}
