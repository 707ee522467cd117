//! INI file configuration adapter.
//!
//! Section and key names are case-insensitive (configparser lowercases them).

use crate::domain::error::TradesimError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;
use tracing::debug;

#[derive(Debug)]
pub struct FileConfigAdapter {
    ini: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TradesimError> {
        let path = path.as_ref();
        let mut ini = Ini::new();
        ini.load(path).map_err(|reason| TradesimError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        debug!(path = %path.display(), sections = ini.sections().len(), "loaded config");
        Ok(Self { ini })
    }

    pub fn from_string(content: &str) -> Result<Self, TradesimError> {
        let mut ini = Ini::new();
        ini.read(content.to_string())
            .map_err(|reason| TradesimError::ConfigParse {
                file: "<inline>".to_string(),
                reason,
            })?;
        Ok(Self { ini })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.ini.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, TradesimError> {
        self.ini
            .getint(section, key)
            .map_err(|e| malformed(section, key, "an integer", e))
    }

    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, TradesimError> {
        self.ini
            .getfloat(section, key)
            .map_err(|e| malformed(section, key, "a number", e))
    }

    /// Accepts `true/yes/on/1` and `false/no/off/0` in any case.
    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, TradesimError> {
        self.ini
            .getboolcoerce(section, key)
            .map_err(|e| malformed(section, key, "true or false", e))
    }
}

fn malformed(section: &str, key: &str, expected: &str, cause: String) -> TradesimError {
    debug!(section, key, %cause, "malformed config value");
    TradesimError::invalid_config(key, format!("[{}] expected {}: {}", section, expected, cause))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[backtest]
initial_capital = 100000.0
liquidate_at_end = false

[strategy]
kind = bollinger
num_std = 2.5
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("strategy", "kind"),
            Some("bollinger".to_string())
        );
        assert_eq!(adapter.get_double("strategy", "num_std").unwrap(), Some(2.5));
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ninitial_capital = 100\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn keys_are_case_insensitive() {
        let adapter = FileConfigAdapter::from_string("[Strategy]\nKind = MA\n").unwrap();
        assert_eq!(adapter.get_string("strategy", "kind"), Some("MA".to_string()));
    }

    fn invalid_key(err: TradesimError) -> String {
        match err {
            TradesimError::InvalidConfig { parameter, .. } => parameter,
            other => panic!("Expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn get_int_parses_or_reports_key() {
        let adapter =
            FileConfigAdapter::from_string("[strategy]
window = 5
slow = -3
fast = abc
")
                .unwrap();
        assert_eq!(adapter.get_int("strategy", "window").unwrap(), Some(5));
        assert_eq!(adapter.get_int("strategy", "slow").unwrap(), Some(-3));
        assert_eq!(adapter.get_int("strategy", "signal").unwrap(), None);
        assert_eq!(invalid_key(adapter.get_int("strategy", "fast").unwrap_err()), "fast");
    }

    #[test]
    fn get_double_parses_or_reports_key() {
        let adapter = FileConfigAdapter::from_string(
            "[backtest]
initial_capital = 100000.5
periods_per_year = often
",
        )
        .unwrap();
        assert_eq!(
            adapter.get_double("backtest", "initial_capital").unwrap(),
            Some(100000.5)
        );
        assert_eq!(adapter.get_double("backtest", "missing").unwrap(), None);
        assert_eq!(
            invalid_key(adapter.get_double("backtest", "periods_per_year").unwrap_err()),
            "periods_per_year"
        );
    }

    #[test]
    fn get_bool_accepts_common_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[backtest]
a = true
b = yes
c = 1
d = false
e = no
f = 0
g = maybe
",
        )
        .unwrap();
        for key in ["a", "b", "c"] {
            assert_eq!(adapter.get_bool("backtest", key).unwrap(), Some(true));
        }
        for key in ["d", "e", "f"] {
            assert_eq!(adapter.get_bool("backtest", key).unwrap(), Some(false));
        }
        assert_eq!(adapter.get_bool("backtest", "missing").unwrap(), None);
        assert_eq!(invalid_key(adapter.get_bool("backtest", "g").unwrap_err()), "g");
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[strategy]\nkind = macd\nfast = 8\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_string("strategy", "kind"), Some("macd".to_string()));
        assert_eq!(adapter.get_int("strategy", "fast").unwrap(), Some(8));
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/config.ini").unwrap_err();
        assert!(matches!(err, TradesimError::ConfigParse { ref file, .. } if file.contains("config.ini")));
        assert_eq!(err.kind(), crate::domain::error::ErrorKind::Config);
    }
}
