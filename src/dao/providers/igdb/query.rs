//! Builder for Apicalypse query bodies (`fields ...; search "..."; where ...; limit ...;`).

/// Apicalypse query sent as the body of an IGDB POST request.
#[derive(Debug, Clone, Default)]
pub struct Query {
    fields: String,
    search: Option<String>,
    filter: Option<String>,
    sort: Option<String>,
    limit: Option<u32>,
}

impl Query {
    /// Start a query selecting the comma-separated `fields`.
    pub fn fields(fields: &str) -> Self {
        Self {
            fields: fields.to_owned(),
            ..Self::default()
        }
    }

    /// Full-text search; IGDB rejects `sort` alongside it, so any sort is dropped.
    pub fn search(mut self, term: &str) -> Self {
        self.search = Some(escape(term));
        self.sort = None;
        self
    }

    pub fn filter(mut self, clause: impl Into<String>) -> Self {
        self.filter = Some(clause.into());
        self
    }

    pub fn sort(mut self, clause: &str) -> Self {
        if self.search.is_none() {
            self.sort = Some(clause.to_owned());
        }
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render the query body.
    pub fn build(&self) -> String {
        let mut parts = vec![format!("fields {};", self.fields)];
        if let Some(term) = &self.search {
            parts.push(format!("search \"{term}\";"));
        }
        if let Some(clause) = &self.filter {
            parts.push(format!("where {clause};"));
        }
        if let Some(clause) = &self.sort {
            parts.push(format!("sort {clause};"));
        }
        if let Some(limit) = self.limit {
            parts.push(format!("limit {limit};"));
        }
        parts.join(" ")
    }
}

/// Escape a user-provided term for use inside a double-quoted Apicalypse string.
fn escape(term: &str) -> String {
    term.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_query_quotes_and_escapes_term() {
        let body = Query::fields("name, cover.url")
            .search(r#"The "Legend" of Zelda"#)
            .limit(20)
            .build();
        assert_eq!(
            body,
            r#"fields name, cover.url; search "The \"Legend\" of Zelda"; limit 20;"#
        );
    }

    #[test]
    fn sort_is_ignored_when_searching() {
        let body = Query::fields("name")
            .sort("name asc")
            .search("mario")
            .sort("name desc")
            .build();
        assert_eq!(body, r#"fields name; search "mario";"#);
    }

    #[test]
    fn filter_and_sort_render_in_order() {
        let body = Query::fields("*")
            .filter("id = 1020")
            .sort("name asc")
            .limit(1)
            .build();
        assert_eq!(body, "fields *; where id = 1020; sort name asc; limit 1;");
    }
}
