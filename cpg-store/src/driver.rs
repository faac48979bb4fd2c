//! The driver dependency (spec §4.5): the translator and the facade never
//! depend on a particular query language. Queries are templated strings
//! bound by parameters; rows come back as string-keyed scalar maps.

use std::collections::HashMap;

use cpg_core::CpgError;

#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Null,
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl Scalar {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }
}

pub type Row = HashMap<String, Scalar>;

pub trait GraphDriver {
    fn execute_write(&mut self, query: &str, params: &[(&str, Scalar)]) -> Result<Vec<Row>, CpgError>;

    fn execute_read(&self, query: &str, params: &[(&str, Scalar)]) -> Result<Vec<Row>, CpgError>;

    fn execute_read_single(
        &self,
        query: &str,
        params: &[(&str, Scalar)],
    ) -> Result<Option<Row>, CpgError> {
        Ok(self.execute_read(query, params)?.into_iter().next())
    }
}
