//! Configuration access port trait.
//!
//! Values are looked up by INI `section` and `key`. An absent key reads as
//! `Ok(None)`. A present value that does not parse as the requested type is
//! an [`TradesimError::InvalidConfig`] naming the key, never a silent default.

use crate::domain::error::TradesimError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, TradesimError>;
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, TradesimError>;
    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, TradesimError>;
}
