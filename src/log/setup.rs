//! Building loggers and sinks from a config file
//!
//! ```text
//! [global]
//! levels = INFO WARN ERROR FATAL
//! sink_list = console
//!
//! [sinks.console]
//! type = stdout
//! format = "%lvl %msg"
//!
//! [sinks.file]
//! type = rotatefile
//! filename = logs/app.log
//! max_bytes = 1048576
//! backup = true
//!
//! [loggers.app]
//! levels = ALL
//! sink_list = console, file
//! ```
//!
//! `[global]` is applied first so sinks built from the same file pick up
//! its templates, then `[sinks.*]`, then `[loggers.*]`. Sink lists name
//! either the alias of a `[sinks.*]` section or the real name of a sink
//! already registered in the context.

use super::sink::{SinkPtr, DEFAULT_ROTATE_BYTES};
use super::{level_mask_from_string, LogContext};
use crate::cfg::{CfgLevel, CfgParser, CfgValue};
use crate::error::{Error, Result};
use error_stack::{Report, ResultExt};
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

const GLOBAL_SECTION: &str = "global";
const SINKS_SECTION: &str = "sinks";
const LOGGERS_SECTION: &str = "loggers";

const GLOBAL_KEYS: &[&str] = &["format", "datetime_format", "levels", "sink_list"];
const SINK_KEYS: &[&str] = &[
    "type",
    "filename",
    "format",
    "datetime_format",
    "levels",
    "max_bytes",
    "backup",
    "truncate",
];
const LOGGER_KEYS: &[&str] = &["levels", "sink_list"];

impl LogContext {
    /// Configure from a config file.
    ///
    /// Relative sink file names are resolved against the directory of the
    /// config file.
    pub fn config_from_file<P>(&self, path: &P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let parser = CfgParser::from_file(&path)?;
        let base = path.parent().map(Path::to_path_buf);
        self.apply_config(parser.root(), base.as_deref())
            .attach_printable_lazy(|| format!("in `{}`", path.display()))
    }

    /// Configure from config text. Relative sink file names are resolved
    /// against the current directory.
    pub fn config_from_str(&self, text: &str) -> Result<()> {
        let parser = CfgParser::parse(text)?;
        self.apply_config(parser.root(), None)
    }

    pub fn config_from_reader<R>(&self, reader: R) -> Result<()>
    where
        R: Read,
    {
        let parser = CfgParser::from_reader(reader)?;
        self.apply_config(parser.root(), None)
    }

    fn apply_config(&self, root: &CfgLevel, base: Option<&Path>) -> Result<()> {
        for (name, _) in root.sections() {
            if ![GLOBAL_SECTION, SINKS_SECTION, LOGGERS_SECTION].contains(&name) {
                log::warn!("ignoring unknown config section `{name}`");
            }
        }

        let global = root.section(GLOBAL_SECTION);
        if let Some(global) = global {
            warn_unknown_keys(global, GLOBAL_KEYS);
            // the console sinks exist before any config is read, so they
            // follow the global templates unless a sink section overrides them
            let consoles = [self.stdout_sink(), self.stderr_sink()];
            if let Some(format) = global.value("format") {
                self.config().set_format(format.as_str());
                consoles.iter().for_each(|s| s.set_format(format.as_str()));
            }
            if let Some(datetime_format) = global.value("datetime_format") {
                self.config().set_datetime_format(datetime_format.as_str());
                consoles
                    .iter()
                    .for_each(|s| s.set_datetime_format(datetime_format.as_str()));
            }
            if let Some(levels) = global.value("levels") {
                self.config().set_level_mask(load_levels(levels)?);
            }
        }

        let mut aliases = HashMap::new();
        if let Some(sinks) = root.section(SINKS_SECTION) {
            for (alias, section) in sinks.sections() {
                let sink = self
                    .sink_from_section(section, base)
                    .attach_printable_lazy(|| format!("in sink `{alias}`"))?;
                log::debug!("config sink `{alias}` is `{}`", sink.name());
                aliases.insert(alias.to_string(), sink.name());
            }
        }

        if let Some(sink_list) = global.and_then(|g| g.value("sink_list")) {
            let names = sink_list
                .split()
                .into_iter()
                .map(|name| aliases.get(&name).cloned().unwrap_or(name))
                .collect();
            self.config().set_sink_list(names);
        }

        if let Some(loggers) = root.section(LOGGERS_SECTION) {
            for (name, section) in loggers.sections() {
                self.logger_from_section(name, section, &aliases)
                    .attach_printable_lazy(|| format!("in logger `{name}`"))?;
            }
        }
        Ok(())
    }

    fn sink_from_section(&self, section: &CfgLevel, base: Option<&Path>) -> Result<SinkPtr> {
        warn_unknown_keys(section, SINK_KEYS);
        let kind = section
            .value("type")
            .ok_or_else(|| Report::new(Error::runtime("missing sink type")))?;
        let sink = match kind.as_str().to_ascii_lowercase().as_str() {
            "stdout" => self.stdout_sink(),
            "stderr" => self.stderr_sink(),
            "simplefile" => {
                let path = file_name(section, base)?;
                let truncate = match section.value("truncate") {
                    Some(v) => v.as_bool()?,
                    None => false,
                };
                self.new_simple_file_sink(&path, truncate)?
            }
            "rotatefile" => {
                let path = file_name(section, base)?;
                let max_bytes = match section.value("max_bytes") {
                    Some(v) => v.load::<u64>()?,
                    None => DEFAULT_ROTATE_BYTES,
                };
                let backup = match section.value("backup") {
                    Some(v) => v.as_bool()?,
                    None => false,
                };
                self.new_rotate_file_sink(&path, max_bytes, backup)?
            }
            other => {
                return Err(Report::new(Error::runtime("unknown sink type"))
                    .attach_printable(format!("`{other}`")))
            }
        };
        if let Some(format) = section.value("format") {
            sink.set_format(format.as_str());
        }
        if let Some(datetime_format) = section.value("datetime_format") {
            sink.set_datetime_format(datetime_format.as_str());
        }
        if let Some(levels) = section.value("levels") {
            sink.set_level_mask(load_levels(levels)?);
        }
        Ok(sink)
    }

    fn logger_from_section(
        &self,
        name: &str,
        section: &CfgLevel,
        aliases: &HashMap<String, String>,
    ) -> Result<()> {
        warn_unknown_keys(section, LOGGER_KEYS);
        // resolve everything before touching the logger
        let mask = section.value("levels").map(load_levels).transpose()?;
        let sinks = match section.value("sink_list") {
            Some(list) => Some(
                list.split()
                    .iter()
                    .map(|sink_name| self.resolve_sink(sink_name, aliases))
                    .collect::<Result<Vec<_>>>()?,
            ),
            None => None,
        };

        let logger = self.get_logger(name)?;
        if let Some(mask) = mask {
            logger.set_level_mask(mask);
        }
        if let Some(sinks) = sinks {
            logger.detach_all_sinks();
            for sink in sinks {
                if logger.get_sink(&sink.name()).is_none() {
                    logger.attach_sink(sink)?;
                }
            }
        }
        Ok(())
    }

    fn resolve_sink(&self, name: &str, aliases: &HashMap<String, String>) -> Result<SinkPtr> {
        let real_name = aliases.get(name).map(String::as_str).unwrap_or(name);
        self.get_sink(real_name).ok_or_else(|| {
            Report::new(Error::runtime("unknown sink")).attach_printable(format!("`{name}`"))
        })
    }
}

fn load_levels(value: &CfgValue) -> Result<i32> {
    level_mask_from_string(value.as_str())
}

fn file_name(section: &CfgLevel, base: Option<&Path>) -> Result<PathBuf> {
    let filename = section
        .value("filename")
        .map(CfgValue::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| Report::new(Error::runtime("missing file name for file sink")))?;
    let path = Path::new(filename.trim());
    Ok(match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    })
}

fn warn_unknown_keys(section: &CfgLevel, known: &[&str]) {
    for (key, _) in section.values() {
        if !known.contains(&key) {
            log::warn!("ignoring unknown key `{key}` in section `{}`", section.name());
        }
    }
}

#[cfg(test)]
mod ut {
    use super::*;
    use crate::error::ErrorKind;
    use crate::log::{LogLevel, LEVEL_SENTINEL};

    fn out_dir(name: &str) -> PathBuf {
        let dir = Path::new("target").join("test_out").join("setup").join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn kind_of(result: Result<()>) -> ErrorKind {
        result.unwrap_err().current_context().kind
    }

    #[test]
    fn test_global_section() {
        let ctx = LogContext::new();
        ctx.config_from_str(
            "[global]\nformat = '%lvl %msg'\ndatetime_format = %H\nlevels = warn error\n",
        )
        .unwrap();
        assert_eq!("%lvl %msg", ctx.config().format());
        assert_eq!("%H", ctx.config().datetime_format());
        assert_eq!(
            LogLevel::Warn.bit() | LogLevel::Error.bit(),
            ctx.config().level_mask()
        );
        let logger = ctx.get_logger("after").unwrap();
        assert!(!logger.should_log(LogLevel::Info));
        assert!(logger.should_log(LogLevel::Warn));
    }

    #[test]
    fn test_global_templates_reach_console_sinks() {
        let ctx = LogContext::new();
        ctx.config_from_str("[global]\nformat = %lvl %msg\ndatetime_format = %H:%M\n")
            .unwrap();
        for sink in [ctx.stdout_sink(), ctx.stderr_sink()] {
            assert_eq!("%lvl %msg", sink.format());
            assert_eq!("%H:%M", sink.datetime_format());
        }

        // a sink section still has the last word
        let ctx = LogContext::new();
        ctx.config_from_str(
            "[global]\nformat = %lvl %msg\n[sinks.err]\ntype = stderr\nformat = '!! %msg'\n",
        )
        .unwrap();
        assert_eq!("%lvl %msg", ctx.stdout_sink().format());
        assert_eq!("!! %msg", ctx.stderr_sink().format());
    }

    #[test]
    fn test_sinks_and_loggers() {
        let dir = out_dir("sinks_and_loggers");
        let path = dir.join("app.log");
        let ctx = LogContext::new();
        let text = format!(
            "[sinks.file]\ntype = simplefile\nfilename = '{}'\nformat = '%msg'\nlevels = INFO\n\
             [loggers.app]\nlevels = all\nsink_list = file stderr\n",
            path.display()
        );
        ctx.config_from_str(&text).unwrap();
        let logger = ctx.get_logger("app").unwrap();
        assert_eq!(LEVEL_SENTINEL, logger.level_mask());
        let file_sink = ctx.new_simple_file_sink(&path, false).unwrap();
        let mut names = vec![file_sink.name(), "stderr".to_string()];
        names.sort();
        assert_eq!(names, logger.sink_names());
        assert_eq!(LogLevel::Info.bit(), file_sink.level_mask());

        ctx.get_logger("app").unwrap().detach_sink("stderr");
        logger.info_value("kept");
        logger.debug_value("filtered by sink");
        logger.flush().unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(format!("kept{}", crate::fs::OS_LINE_ENDING), written);
    }

    #[test]
    fn test_global_sink_list_through_alias() {
        let ctx = LogContext::new();
        ctx.config_from_str("[global]\nsink_list = err\n[sinks.err]\ntype = stderr\n")
            .unwrap();
        assert_eq!(vec!["stderr"], ctx.config().sink_list());
        assert_eq!(vec!["stderr"], ctx.get_logger("x").unwrap().sink_names());
    }

    #[test]
    fn test_relative_file_name_from_file() {
        let dir = out_dir("relative");
        let cfg_path = dir.join("log.cfg");
        std::fs::write(
            &cfg_path,
            "[sinks.f]\ntype = rotatefile\nfilename = nested/r.log\nmax_bytes = 64\n[loggers.r]\nsink_list = f\n",
        )
        .unwrap();
        let ctx = LogContext::new();
        ctx.config_from_file(&cfg_path).unwrap();
        assert!(dir.join("nested").join("r.log").exists());
        let logger = ctx.get_logger("r").unwrap();
        assert_eq!(1, logger.sink_names().len());
        assert!(logger.sink_names()[0].ends_with("r.log"));
    }

    #[test]
    fn test_errors() {
        let ctx = LogContext::new();
        assert_eq!(
            ErrorKind::Runtime,
            kind_of(ctx.config_from_str("[sinks.a]\ntype = carrier_pigeon\n"))
        );
        assert_eq!(
            ErrorKind::Runtime,
            kind_of(ctx.config_from_str("[sinks.a]\nformat = x\n"))
        );
        assert_eq!(
            ErrorKind::Runtime,
            kind_of(ctx.config_from_str("[sinks.a]\ntype = simplefile\n"))
        );
        assert_eq!(
            ErrorKind::Runtime,
            kind_of(ctx.config_from_str("[loggers.a]\nsink_list = nowhere\n"))
        );
        assert_eq!(
            ErrorKind::Argument,
            kind_of(ctx.config_from_str("[global]\nlevels = loud\n"))
        );
        assert_eq!(
            ErrorKind::Cast,
            kind_of(ctx.config_from_str(
                "[sinks.a]\ntype = rotatefile\nfilename = x.log\nmax_bytes = lots\n"
            ))
        );
        assert_eq!(
            ErrorKind::Runtime,
            kind_of(ctx.config_from_str("[global]\nlevels = info\nlevels = warn\n"))
        );
        // nothing was created for the broken logger section
        assert!(!ctx.registry().contains("a"));
    }

    #[test]
    fn test_locked_registry_rejects_new_logger() {
        let ctx = LogContext::new();
        ctx.registry().lock();
        assert_eq!(
            ErrorKind::Logic,
            kind_of(ctx.config_from_str("[loggers.late]\nlevels = info\n"))
        );
    }
}
