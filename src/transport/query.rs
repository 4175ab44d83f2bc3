//! Lazy OData query assembly and execution.

use super::client::Client;
use super::error::{Error, Result};

/// A filter operand, rendered into an OData literal when the query is built.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl FilterValue {
    /// OData literal form: strings single-quoted with `''` escaping, numbers
    /// and booleans bare.
    pub fn to_literal(&self) -> String {
        match self {
            FilterValue::Int(n) => n.to_string(),
            FilterValue::Float(f) => f.to_string(),
            FilterValue::Bool(b) => b.to_string(),
            FilterValue::Str(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }
}

/// Sort direction for `$orderby`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// `desc` (any case) sorts descending; every other token sorts ascending.
    pub fn parse(token: &str) -> Self {
        if token.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// One page of records plus the continuation link, when the server sent one.
#[derive(Debug)]
pub struct Page {
    pub records: Vec<serde_json::Value>,
    pub next_link: Option<String>,
}

/// Lazily assembled OData query over one resource URL.
///
/// Builder calls only collect state; `results()` and `count()` perform the
/// actual request.
pub struct Query<'c> {
    client: &'c Client,
    url: String,
    clauses: Vec<String>,
    raw_filter: Option<String>,
    top: Option<i64>,
    skip: Option<i64>,
    select: Vec<String>,
    expand: Vec<String>,
    orderby: Option<String>,
}

impl<'c> Query<'c> {
    pub(crate) fn new(client: &'c Client, url: String) -> Self {
        Self {
            client,
            url,
            clauses: Vec::new(),
            raw_filter: None,
            top: None,
            skip: None,
            select: Vec::new(),
            expand: Vec::new(),
            orderby: None,
        }
    }

    fn compare(mut self, field: &str, op: &str, value: &FilterValue) -> Self {
        self.clauses
            .push(format!("{} {} {}", field, op, value.to_literal()));
        self
    }

    pub fn eq(self, field: &str, value: &FilterValue) -> Self {
        self.compare(field, "eq", value)
    }

    pub fn ne(self, field: &str, value: &FilterValue) -> Self {
        self.compare(field, "ne", value)
    }

    pub fn gt(self, field: &str, value: &FilterValue) -> Self {
        self.compare(field, "gt", value)
    }

    pub fn ge(self, field: &str, value: &FilterValue) -> Self {
        self.compare(field, "ge", value)
    }

    pub fn lt(self, field: &str, value: &FilterValue) -> Self {
        self.compare(field, "lt", value)
    }

    pub fn le(self, field: &str, value: &FilterValue) -> Self {
        self.compare(field, "le", value)
    }

    /// Verbatim `$filter` expression; wins over any structured clauses.
    pub fn filter_raw(mut self, expression: &str) -> Self {
        self.raw_filter = Some(expression.to_string());
        self
    }

    pub fn top(mut self, n: i64) -> Self {
        self.top = Some(n);
        self
    }

    pub fn skip(mut self, n: i64) -> Self {
        self.skip = Some(n);
        self
    }

    pub fn select<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.select = fields.iter().map(|f| f.as_ref().to_string()).collect();
        self
    }

    pub fn expand<S: AsRef<str>>(mut self, associations: &[S]) -> Self {
        self.expand = associations
            .iter()
            .map(|a| a.as_ref().to_string())
            .collect();
        self
    }

    pub fn order(mut self, field: &str, direction: Option<SortDirection>) -> Self {
        self.orderby = Some(match direction {
            Some(direction) => format!("{} {}", field, direction.as_str()),
            None => field.to_string(),
        });
        self
    }

    /// Assembled `$`-prefixed query parameters, in a stable order.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        let filter = match &self.raw_filter {
            Some(raw) => Some(raw.clone()),
            None if self.clauses.is_empty() => None,
            None => Some(self.clauses.join(" and ")),
        };
        if let Some(filter) = filter {
            params.push(("$filter".to_string(), filter));
        }
        if let Some(top) = self.top {
            params.push(("$top".to_string(), top.to_string()));
        }
        if let Some(skip) = self.skip {
            params.push(("$skip".to_string(), skip.to_string()));
        }
        if !self.select.is_empty() {
            params.push(("$select".to_string(), self.select.join(",")));
        }
        if !self.expand.is_empty() {
            params.push(("$expand".to_string(), self.expand.join(",")));
        }
        if let Some(orderby) = &self.orderby {
            params.push(("$orderby".to_string(), orderby.clone()));
        }

        params
    }

    fn execution_url(&self) -> String {
        if self.client.use_replication_endpoint() {
            format!("{}/replication", self.url)
        } else {
            self.url.clone()
        }
    }

    /// Execute and return the first page of records.
    pub fn results(&self) -> Result<Page> {
        let body = self.client.get_json(&self.execution_url(), &self.to_params())?;

        let records = match body.get("value") {
            Some(serde_json::Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        let next_link = body
            .get("@odata.nextLink")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Ok(Page { records, next_link })
    }

    /// Execute a count-only variant (`$count=true`, `$top=0`).
    pub fn count(&self) -> Result<u64> {
        let mut params = self.to_params();
        params.retain(|(name, _)| name != "$top");
        params.push(("$count".to_string(), "true".to_string()));
        params.push(("$top".to_string(), "0".to_string()));

        let body = self.client.get_json(&self.execution_url(), &params)?;
        body.get("@odata.count")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| {
                Error::UnexpectedResponse("response missing @odata.count".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::client::test_support::test_client;

    fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_literal_rendering() {
        assert_eq!(FilterValue::Int(42).to_literal(), "42");
        assert_eq!(FilterValue::Float(4.5).to_literal(), "4.5");
        assert_eq!(FilterValue::Bool(true).to_literal(), "true");
        assert_eq!(
            FilterValue::Str("Austin".to_string()).to_literal(),
            "'Austin'"
        );
        assert_eq!(
            FilterValue::Str("O'Brien".to_string()).to_literal(),
            "'O''Brien'"
        );
    }

    #[test]
    fn test_clauses_join_with_and() {
        let client = test_client();
        let query = Query::new(&client, "https://mls.test/odata/Property".to_string())
            .eq("City", &FilterValue::Str("Austin".to_string()))
            .ge("ListPrice", &FilterValue::Int(500000));

        let params = query.to_params();
        assert_eq!(
            param(&params, "$filter"),
            Some("City eq 'Austin' and ListPrice ge 500000")
        );
    }

    #[test]
    fn test_raw_filter_wins() {
        let client = test_client();
        let query = Query::new(&client, "https://mls.test/odata/Property".to_string())
            .eq("City", &FilterValue::Str("Austin".to_string()))
            .filter_raw("ListPrice gt 100000");

        let params = query.to_params();
        assert_eq!(param(&params, "$filter"), Some("ListPrice gt 100000"));
    }

    #[test]
    fn test_param_assembly_order() {
        let client = test_client();
        let query = Query::new(&client, "https://mls.test/odata/Property".to_string())
            .eq("City", &FilterValue::Str("Austin".to_string()))
            .top(10)
            .skip(5)
            .select(&["ListingKey", "City"])
            .expand(&["Media"])
            .order("ListPrice", Some(SortDirection::Desc));

        let params = query.to_params();
        let names: Vec<&str> = params.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec!["$filter", "$top", "$skip", "$select", "$expand", "$orderby"]
        );
    }

    #[test]
    fn test_orderby_rendering() {
        let client = test_client();
        let url = "https://mls.test/odata/Property".to_string();

        let query = Query::new(&client, url.clone()).order("ListPrice", Some(SortDirection::Desc));
        assert_eq!(
            param(&query.to_params(), "$orderby"),
            Some("ListPrice desc")
        );

        let query = Query::new(&client, url).order("ListPrice", None);
        assert_eq!(param(&query.to_params(), "$orderby"), Some("ListPrice"));
    }

    #[test]
    fn test_empty_query_has_no_params() {
        let client = test_client();
        let query = Query::new(&client, "https://mls.test/odata/Property".to_string());
        assert!(query.to_params().is_empty());
    }
}
